//! Point-in-time counters for a running world.

use breakout_board::Board;
use breakout_core::BallStatus;

/// Summary counters read from a board.
///
/// Each field is read independently, so under a running parallel world the
/// values may straddle concurrent moves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorldStats {
    /// Balls not yet destroyed.
    pub active_balls: usize,
    /// Collisions since the board was built.
    pub collisions: u64,
    /// Balls resting on sticky cells.
    pub stopped: usize,
    /// Balls inside warp tunnels.
    pub in_transit: usize,
}

impl WorldStats {
    /// Read the counters from `board`.
    pub fn collect(board: &Board) -> Self {
        let mut stats = Self {
            active_balls: board.active_balls(),
            collisions: board.collisions(),
            ..Self::default()
        };
        for id in board.ball_ids() {
            match board.ball(id).status {
                BallStatus::Stopped => stats.stopped += 1,
                BallStatus::InTransit => stats.in_transit += 1,
                BallStatus::Active | BallStatus::Destroyed => {}
            }
        }
        stats
    }
}
