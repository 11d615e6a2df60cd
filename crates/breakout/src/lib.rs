//! Breakout: a concurrent board simulation of balls, bricks, warp tunnels
//! and a paddle sharing one grid.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the breakout sub-crates.
//!
//! # Quick start
//!
//! ```rust
//! use breakout::prelude::*;
//!
//! // Two balls on a converging course under a row of bricks.
//! let mut config = BoardConfig::new(10, 10);
//! config.obstacle_rows = vec![ObstacleRow { row: 0, strength: 2 }];
//! config.balls = vec![BallConfig::new(1, 5, 1, 0), BallConfig::new(2, 5, -1, 0)];
//!
//! let mut world = CooperativeWorld::new(config.build().unwrap(), &RunConfig::default()).unwrap();
//! let pass = world.step();
//! assert_eq!(pass.blocked, 1);
//! assert_eq!(world.collisions(), 1);
//! assert_eq!(world.active_balls(), 2);
//!
//! // Random layouts are reproducible per seed.
//! let layout = LayoutSpec { warps: 2, ..LayoutSpec::default() };
//! assert_eq!(layout.generate(7).unwrap(), layout.generate(7).unwrap());
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `breakout-core` | Handles, positions, cell kinds, move outcomes |
//! | [`board`] | `breakout-board` | The shared grid, ball movement, warps, paddle |
//! | [`engine`] | `breakout-engine` | Configuration, random layouts, schedulers |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types (`breakout-core`).
pub use breakout_core as types;

/// The shared board and everything that mutates it (`breakout-board`).
///
/// [`board::Board::move_ball`] is the ball state machine;
/// [`board::Paddle`] and the warp worker loop
/// ([`board::Board::run_warp`]) are the other writers.
pub use breakout_board as board;

/// Configuration and scheduling (`breakout-engine`).
///
/// [`engine::ParallelWorld`] runs a thread per entity,
/// [`engine::CooperativeWorld`] runs everything on the calling thread.
pub use breakout_engine as engine;

/// Common imports for typical breakout usage.
///
/// ```rust
/// use breakout::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use breakout_core::{BallId, BallStatus, CellKind, MoveOutcome, Pos, Velocity, WarpId};

    // Board
    pub use breakout_board::{Board, BoardSnapshot, Cell, Paddle, PlacementError};

    // Engine
    pub use breakout_engine::{
        start, BallConfig, BoardConfig, BoardSetup, ConfigError, CooperativeWorld, LayoutSpec,
        ObstacleRow, PaddleConfig, ParallelWorld, RunConfig, SchedulerMode, ShutdownReport,
        WorldStats,
    };
}
