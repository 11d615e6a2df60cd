//! Ball lifecycle states and the result of a single move.

use std::fmt;

/// Lifecycle state of a ball.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BallStatus {
    /// On the board and moving.
    #[default]
    Active,
    /// On the board, resting on a sticky cell with zero velocity.
    Stopped,
    /// Off the board, queued inside a warp tunnel.
    InTransit,
    /// Fell into a trash cell. Terminal.
    Destroyed,
}

impl BallStatus {
    /// Whether the ball currently claims a board cell.
    pub fn on_board(self) -> bool {
        matches!(self, BallStatus::Active | BallStatus::Stopped)
    }
}

impl fmt::Display for BallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Active => "active",
            Self::Stopped => "stopped",
            Self::InTransit => "in transit",
            Self::Destroyed => "destroyed",
        };
        f.write_str(name)
    }
}

/// Result of one invocation of the ball movement state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MoveOutcome {
    /// The ball is stopped or in transit; nothing happened. Callers should
    /// not pace after this result.
    Idle,
    /// The ball hit another ball or an obstacle and stayed put.
    Blocked,
    /// The ball moved one cell diagonally.
    Moved,
    /// The ball entered a warp tunnel.
    Transferred,
    /// The ball fell into a trash cell and has left the simulation.
    Destroyed,
}

impl MoveOutcome {
    /// Whether the ball worker should sleep before the next move.
    pub fn should_pace(self) -> bool {
        self == MoveOutcome::Moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_moved_paces() {
        assert!(MoveOutcome::Moved.should_pace());
        assert!(!MoveOutcome::Blocked.should_pace());
        assert!(!MoveOutcome::Idle.should_pace());
        assert!(!MoveOutcome::Transferred.should_pace());
        assert!(!MoveOutcome::Destroyed.should_pace());
    }

    #[test]
    fn on_board_states() {
        assert!(BallStatus::Active.on_board());
        assert!(BallStatus::Stopped.on_board());
        assert!(!BallStatus::InTransit.on_board());
        assert!(!BallStatus::Destroyed.on_board());
    }
}
