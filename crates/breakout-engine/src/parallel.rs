//! Thread-per-entity scheduling and its shutdown sequence.
//!
//! # Architecture
//!
//! ```text
//! Ball workers (N)            Warp workers (2 per tunnel)    Paddle worker
//!     |                           |                              |
//!     | board.move_ball()         | board.next_in_tunnel()       | paddle.tick()
//!     |   Moved  -> sleep delay   |   sleep warp_delay           |   lock_row()
//!     |   Idle   -> park on ball  |   emerge_within() when free  |   sleep delay / 2
//!     |   Transferred ----------> |   wake ball ---------------> |
//!     |   Destroyed -> exit       |                              |
//! ```
//!
//! Every worker polls one shared shutdown flag. Warp workers blocked on
//! their queue notice it within
//! [`QUEUE_POLL`](breakout_board::warp::QUEUE_POLL); parked ball workers are
//! woken directly by [`ParallelWorld::shutdown`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use breakout_board::{Board, BoardSnapshot, Paddle};
use breakout_core::{BallId, MoveOutcome, WarpId};
use log::{debug, info, warn};

use crate::config::{BoardSetup, ConfigError, RunConfig};
use crate::metrics::WorldStats;

/// How long a ball worker parks on a stopped or in-transit ball before
/// re-checking the shutdown flag.
pub const BALL_PARK: Duration = Duration::from_millis(50);

// ── ShutdownReport ───────────────────────────────────────────────

/// Report from [`ParallelWorld::shutdown`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Total time spent in the shutdown sequence.
    pub total_ms: u64,
    /// Ball worker threads joined.
    pub balls_joined: usize,
    /// Warp worker threads joined.
    pub warps_joined: usize,
    /// Whether this call joined a paddle worker. `false` when the board
    /// has no paddle.
    pub paddle_joined: bool,
    /// Workers that had panicked.
    pub panicked: usize,
}

// ── ShutdownState ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShutdownState {
    Running,
    Stopping,
    Stopped,
}

// ── ParallelWorld ────────────────────────────────────────────────

/// A board driven by one thread per ball, per warp endpoint, and for the
/// paddle.
///
/// [`start`](Self::start) returns as soon as every worker is spawned. The
/// simulation never ends by itself; call [`shutdown`](Self::shutdown) or
/// drop the world to stop it.
pub struct ParallelWorld {
    board: Arc<Board>,
    shutdown_flag: Arc<AtomicBool>,
    ball_threads: Vec<JoinHandle<()>>,
    warp_threads: Vec<JoinHandle<()>>,
    paddle_thread: Option<JoinHandle<Paddle>>,
    paddle: Option<Paddle>,
    state: ShutdownState,
}

// Compile-time assertion: ParallelWorld must be Send + Sync.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<ParallelWorld>();
};

impl ParallelWorld {
    /// Spawn every worker and return immediately.
    ///
    /// If a thread cannot be spawned, the workers already running are
    /// stopped and joined before the error is returned.
    pub fn start(setup: BoardSetup, run: &RunConfig) -> Result<Self, ConfigError> {
        let BoardSetup { board, paddle } = setup;
        let mut world = Self {
            board: Arc::new(board),
            shutdown_flag: Arc::new(AtomicBool::new(false)),
            ball_threads: Vec::new(),
            warp_threads: Vec::new(),
            paddle_thread: None,
            paddle: None,
            state: ShutdownState::Running,
        };
        if let Err(e) = world.spawn_all(paddle, run) {
            warn!("aborting start: {e}");
            world.shutdown();
            return Err(e);
        }
        info!(
            "parallel world started: {} balls, {} warp endpoints, paddle: {}",
            world.ball_threads.len(),
            world.warp_threads.len(),
            world.paddle_thread.is_some()
        );
        Ok(world)
    }

    fn spawn_all(&mut self, paddle: Option<Paddle>, run: &RunConfig) -> Result<(), ConfigError> {
        let ids: Vec<BallId> = self.board.ball_ids().collect();
        for id in ids {
            let board = Arc::clone(&self.board);
            let shutdown = Arc::clone(&self.shutdown_flag);
            let delay = run.move_delay;
            let handle = thread::Builder::new()
                .name(format!("breakout-ball-{}", id.0))
                .spawn(move || ball_loop(&board, id, delay, &shutdown))
                .map_err(|e| ConfigError::ThreadSpawnFailed {
                    reason: format!("ball worker for {id}: {e}"),
                })?;
            self.ball_threads.push(handle);
        }

        let warps: Vec<WarpId> = self.board.warp_ids().collect();
        for warp in warps {
            let board = Arc::clone(&self.board);
            let shutdown = Arc::clone(&self.shutdown_flag);
            let delay = run.warp_delay;
            let handle = thread::Builder::new()
                .name(format!("breakout-warp-{}", warp.0))
                .spawn(move || board.run_warp(warp, delay, &shutdown))
                .map_err(|e| ConfigError::ThreadSpawnFailed {
                    reason: format!("warp worker for {warp}: {e}"),
                })?;
            self.warp_threads.push(handle);
        }

        if let Some(mut paddle) = paddle {
            let board = Arc::clone(&self.board);
            let shutdown = Arc::clone(&self.shutdown_flag);
            let delay = run.paddle_delay();
            let handle = thread::Builder::new()
                .name("breakout-paddle".into())
                .spawn(move || {
                    paddle.run(&board, delay, &shutdown);
                    paddle
                })
                .map_err(|e| ConfigError::ThreadSpawnFailed {
                    reason: format!("paddle worker: {e}"),
                })?;
            self.paddle_thread = Some(handle);
        }
        Ok(())
    }

    /// The shared board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Balls not yet destroyed.
    pub fn active_balls(&self) -> usize {
        self.board.active_balls()
    }

    /// Collisions so far.
    pub fn collisions(&self) -> u64 {
        self.board.collisions()
    }

    /// Current counters.
    pub fn stats(&self) -> WorldStats {
        WorldStats::collect(&self.board)
    }

    /// A cell-by-cell copy of the board. Not globally consistent while
    /// workers are running.
    pub fn snapshot(&self) -> BoardSnapshot {
        self.board.snapshot()
    }

    /// The paddle as it was when its worker stopped. `None` while running
    /// or when the board has no paddle.
    pub fn paddle(&self) -> Option<&Paddle> {
        self.paddle.as_ref()
    }

    /// Whether the workers have been stopped.
    pub fn is_stopped(&self) -> bool {
        self.state == ShutdownState::Stopped
    }

    /// Stop every worker and join its thread.
    ///
    /// 1. **Running → Stopping:** set the shutdown flag and wake every
    ///    ball worker parked on a stopped or in-transit ball.
    /// 2. **Stopping → Stopped:** join the ball, warp and paddle threads.
    ///
    /// A ball dequeued by a warp worker but not yet placed stays in
    /// transit. Calling this again joins nothing and returns
    /// [`ShutdownReport::default()`].
    pub fn shutdown(&mut self) -> ShutdownReport {
        if self.state == ShutdownState::Stopped {
            return ShutdownReport::default();
        }
        let start = Instant::now();

        // Phase 1: Running → Stopping
        self.state = ShutdownState::Stopping;
        self.shutdown_flag.store(true, Ordering::Release);
        self.board.wake_all();

        // Phase 2: Stopping → Stopped
        let mut report = ShutdownReport::default();
        for handle in self.ball_threads.drain(..) {
            match handle.join() {
                Ok(()) => report.balls_joined += 1,
                Err(_) => report.panicked += 1,
            }
        }
        for handle in self.warp_threads.drain(..) {
            match handle.join() {
                Ok(()) => report.warps_joined += 1,
                Err(_) => report.panicked += 1,
            }
        }
        report.paddle_joined = match self.paddle_thread.take() {
            Some(handle) => match handle.join() {
                Ok(paddle) => {
                    self.paddle = Some(paddle);
                    true
                }
                Err(_) => {
                    report.panicked += 1;
                    false
                }
            },
            None => false,
        };
        self.state = ShutdownState::Stopped;

        report.total_ms = start.elapsed().as_millis() as u64;
        if report.panicked > 0 {
            warn!("{} workers panicked before shutdown", report.panicked);
        }
        info!(
            "parallel world stopped in {} ms: {} collisions, {} balls left",
            report.total_ms,
            self.board.collisions(),
            self.board.active_balls()
        );
        report
    }
}

impl Drop for ParallelWorld {
    fn drop(&mut self) {
        if self.state != ShutdownState::Stopped {
            self.shutdown();
        }
    }
}

impl std::fmt::Debug for ParallelWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParallelWorld")
            .field("state", &self.state)
            .field("balls", &self.ball_threads.len())
            .field("warps", &self.warp_threads.len())
            .field("collisions", &self.board.collisions())
            .finish()
    }
}

/// Drive one ball until it is destroyed or shutdown is requested.
fn ball_loop(board: &Board, id: BallId, delay: Duration, shutdown: &AtomicBool) {
    debug!("{id} worker started");
    while !shutdown.load(Ordering::Acquire) {
        let outcome = board.move_ball(id);
        match outcome {
            MoveOutcome::Idle => {
                board.wait_until_active(id, BALL_PARK);
            }
            MoveOutcome::Destroyed => {
                debug!("{id} destroyed, worker exiting");
                return;
            }
            MoveOutcome::Moved | MoveOutcome::Blocked | MoveOutcome::Transferred => {}
        }
        if outcome.should_pace() && !delay.is_zero() {
            thread::sleep(delay);
        }
    }
    debug!("{id} worker stopped");
}
