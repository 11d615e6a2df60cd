//! Single-threaded round-robin scheduling.
//!
//! [`CooperativeWorld`] moves every ball once per [`step()`](CooperativeWorld::step),
//! in ball-handle order, then ticks the paddle. Runs are reproducible:
//! the same board and the same number of passes always end in the same
//! state. Warp tunnels need a concurrent worker to release balls, so a
//! board with warps is rejected at construction.
//!
//! The paddle, if any, moves one cell per pass. This departs from the
//! classic single-threaded handout, where the paddle never moves.
//!
//! # Ownership model
//!
//! `CooperativeWorld` owns its board outright; all mutating methods take
//! `&mut self`. No background threads are involved.

use std::thread;

use breakout_board::{Board, BoardSnapshot, Paddle};
use breakout_core::MoveOutcome;
use log::{debug, info, warn};

use crate::config::{BoardSetup, ConfigError, RunConfig};
use crate::metrics::WorldStats;

// Compile-time assertion: CooperativeWorld is Send.
const _: fn() = || {
    fn assert<T: Send>() {}
    assert::<CooperativeWorld>();
};

// ── PassSummary ─────────────────────────────────────────────────

/// Outcome counts for one full pass over the balls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PassSummary {
    /// Balls that moved to a new cell.
    pub moved: usize,
    /// Balls that bounced or collided in place.
    pub blocked: usize,
    /// Balls resting on sticky cells.
    pub idle: usize,
    /// Balls already destroyed or destroyed during this pass.
    pub destroyed: usize,
}

impl PassSummary {
    fn record(&mut self, outcome: MoveOutcome) {
        match outcome {
            MoveOutcome::Moved => self.moved += 1,
            MoveOutcome::Blocked => self.blocked += 1,
            // Cannot happen without warps; counted as resting.
            MoveOutcome::Idle | MoveOutcome::Transferred => self.idle += 1,
            MoveOutcome::Destroyed => self.destroyed += 1,
        }
    }
}

// ── CooperativeWorld ────────────────────────────────────────────

/// A board driven by a single thread, one ball at a time.
#[derive(Debug)]
pub struct CooperativeWorld {
    board: Board,
    paddle: Option<Paddle>,
    run: RunConfig,
    passes: u64,
}

impl CooperativeWorld {
    /// Take ownership of a laid-out board.
    ///
    /// # Errors
    ///
    /// [`ConfigError::WarpsUnsupported`] if the board has warp tunnels.
    pub fn new(setup: BoardSetup, run: &RunConfig) -> Result<Self, ConfigError> {
        let BoardSetup { board, paddle } = setup;
        let warps = board.warp_count();
        if warps > 0 {
            warn!("cooperative mode rejected a board with {warps} warp endpoints");
            return Err(ConfigError::WarpsUnsupported { warps });
        }
        debug!(
            "cooperative world ready: {} balls, paddle: {}",
            board.ball_count(),
            paddle.is_some()
        );
        Ok(Self {
            board,
            paddle,
            run: run.clone(),
            passes: 0,
        })
    }

    /// Move every ball once in handle order, then tick the paddle once.
    pub fn step(&mut self) -> PassSummary {
        let mut summary = PassSummary::default();
        for id in self.board.ball_ids() {
            summary.record(self.board.move_ball(id));
        }
        if let Some(paddle) = &mut self.paddle {
            paddle.tick(&self.board);
        }
        self.passes += 1;
        summary
    }

    /// Run `passes` passes back to back, without pacing.
    pub fn run_for(&mut self, passes: u64) -> WorldStats {
        for _ in 0..passes {
            self.step();
        }
        self.stats()
    }

    /// Run forever, sleeping the move delay after each pass.
    pub fn run(mut self) -> ! {
        info!(
            "cooperative world running {} balls",
            self.board.ball_count()
        );
        loop {
            self.step();
            if !self.run.move_delay.is_zero() {
                thread::sleep(self.run.move_delay);
            }
        }
    }

    /// Passes completed so far.
    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// The board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The paddle, if the board has one.
    pub fn paddle(&self) -> Option<&Paddle> {
        self.paddle.as_ref()
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

    /// A cell-by-cell copy of the board.
    pub fn snapshot(&self) -> BoardSnapshot {
        self.board.snapshot()
    }
}
