//! Parallel world runs: invariants after shutdown, warp round trips.
//!
//! Each test starts real worker threads against a generated or hand-built
//! board, lets them run briefly, then stops the world and checks the board
//! at the quiescent point.

use std::thread;
use std::time::{Duration, Instant};

use breakout_core::{BallStatus, Pos};
use breakout_engine::{
    start, BallConfig, BoardConfig, ConfigError, LayoutSpec, ParallelWorld, RunConfig,
    SchedulerMode,
};
use breakout_test_utils::assert_occupancy_consistent;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn classic_layout_stays_consistent_after_shutdown() {
    init_logging();
    let layout = LayoutSpec {
        warps: 4,
        paddle: true,
        ..LayoutSpec::default()
    };
    let setup = layout.generate(2024).unwrap().build().unwrap();
    let run = RunConfig {
        move_delay: Duration::from_micros(100),
        warp_delay: Duration::from_millis(2),
        ..RunConfig::default()
    };
    let mut world = ParallelWorld::start(setup, &run).unwrap();
    thread::sleep(Duration::from_millis(200));
    let report = world.shutdown();

    assert_eq!(report.balls_joined, 24);
    assert_eq!(report.warps_joined, 4);
    assert!(report.paddle_joined);
    assert_eq!(report.panicked, 0);
    assert_occupancy_consistent(world.board());

    let stats = world.stats();
    let snap = world.snapshot();
    assert_eq!(
        snap.occupied_cells(),
        stats.active_balls - stats.in_transit
    );
    assert!(snap.render_plain().starts_with(&format!(
        "{} balls, {} collisions\n",
        stats.active_balls, stats.collisions
    )));
}

#[test]
fn ball_round_trips_through_a_warp() {
    init_logging();
    // A ball bouncing along row 1 of a 3-row strip: it reaches the warp at
    // (4,0) and reappears at (1,2).
    let mut cfg = BoardConfig::new(8, 3);
    cfg.warps = vec![(Pos::new(4, 0), Pos::new(1, 2))];
    cfg.balls = vec![BallConfig::new(2, 2, 1, -1)];
    let run = RunConfig {
        move_delay: Duration::from_millis(1),
        warp_delay: Duration::from_millis(1),
        ..RunConfig::default()
    };
    let world = ParallelWorld::start(cfg.build().unwrap(), &run).unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    let mut seen_in_transit = false;
    let mut seen_exit = false;
    while !(seen_in_transit && seen_exit) {
        assert!(Instant::now() < deadline, "ball never completed a round trip");
        let ball = world.board().ball(breakout_core::BallId(0));
        seen_in_transit |= ball.status == BallStatus::InTransit;
        seen_exit |= seen_in_transit && ball.status == BallStatus::Active;
        thread::sleep(Duration::from_micros(200));
    }
    drop(world);
}

#[test]
fn start_dispatches_on_mode() {
    init_logging();
    let mut cfg = BoardConfig::new(8, 8);
    cfg.balls = vec![BallConfig::new(1, 1, 1, 1)];
    cfg.warps = vec![(Pos::new(5, 5), Pos::new(2, 6))];

    let cooperative = RunConfig {
        mode: SchedulerMode::Cooperative,
        ..RunConfig::default()
    };
    let err = start(cfg.build().unwrap(), &cooperative).unwrap_err();
    assert_eq!(err, ConfigError::WarpsUnsupported { warps: 2 });

    let mut world = start(cfg.build().unwrap(), &RunConfig::default()).unwrap();
    assert!(!world.is_stopped());
    world.shutdown();
    assert_occupancy_consistent(world.board());
}
