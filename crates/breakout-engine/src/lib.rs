//! Scheduling engine for the breakout simulation.
//!
//! Turns a [`BoardConfig`] (or a random [`LayoutSpec`]) into a laid-out
//! board and drives it in one of two modes: [`ParallelWorld`] runs every
//! ball, warp endpoint and the paddle on its own thread, while
//! [`CooperativeWorld`] moves every ball in turn on the calling thread.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod cooperative;
pub mod layout;
pub mod metrics;
pub mod parallel;

pub use config::{
    BallConfig, BoardConfig, BoardSetup, ConfigError, ObstacleRow, PaddleConfig, RunConfig,
    SchedulerMode,
};
pub use cooperative::{CooperativeWorld, PassSummary};
pub use layout::LayoutSpec;
pub use metrics::WorldStats;
pub use parallel::{ParallelWorld, ShutdownReport};

/// Launch the workers for `setup` in the mode `run` selects.
///
/// In [`SchedulerMode::Parallel`] this returns as soon as every worker is
/// running. In [`SchedulerMode::Cooperative`] it drives the board on the
/// calling thread and only returns if construction fails.
pub fn start(setup: BoardSetup, run: &RunConfig) -> Result<ParallelWorld, ConfigError> {
    match run.mode {
        SchedulerMode::Parallel => ParallelWorld::start(setup, run),
        SchedulerMode::Cooperative => CooperativeWorld::new(setup, run)?.run(),
    }
}
