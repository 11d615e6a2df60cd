//! Errors arising while laying out a board.
//!
//! Once a board is built, nothing in this crate fails: out-of-bounds reads
//! resolve to the sentinel cell and every move has a defined outcome.

use breakout_core::{CellKind, Pos, Velocity};
use std::fmt;

/// Errors from board construction and object placement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlacementError {
    /// Width or height is zero, or the cell count overflows.
    InvalidDimensions {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
    /// A position lies outside the board.
    OutOfBounds {
        /// The offending position.
        pos: Pos,
    },
    /// The target cell already holds something incompatible.
    Occupied {
        /// The contested position.
        pos: Pos,
        /// What the cell currently is.
        kind: CellKind,
        /// Whether a ball is already resting there.
        has_ball: bool,
    },
    /// Warp cells can only be created in linked pairs.
    UnpairedWarp {
        /// The position that was requested.
        pos: Pos,
    },
    /// Both mouths of a warp tunnel were placed on the same cell.
    DegenerateWarp {
        /// The shared position.
        pos: Pos,
    },
    /// A ball velocity has a component outside `{-1, 0, 1}` or is zero.
    InvalidVelocity {
        /// The rejected velocity.
        vel: Velocity,
    },
    /// More balls or warp endpoints than a `u32` handle can address.
    ArenaFull,
}

impl fmt::Display for PlacementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDimensions { width, height } => {
                write!(f, "invalid board dimensions {width}x{height}")
            }
            Self::OutOfBounds { pos } => write!(f, "position {pos} is off the board"),
            Self::Occupied {
                pos,
                kind,
                has_ball,
            } => {
                write!(f, "cell {pos} is already {kind}")?;
                if *has_ball {
                    write!(f, " and holds a ball")?;
                }
                Ok(())
            }
            Self::UnpairedWarp { pos } => {
                write!(f, "warp cell at {pos} must be created as part of a pair")
            }
            Self::DegenerateWarp { pos } => {
                write!(f, "both warp endpoints placed at {pos}")
            }
            Self::InvalidVelocity { vel } => {
                write!(f, "velocity {vel} must be nonzero with unit components")
            }
            Self::ArenaFull => write!(f, "entity arena exhausted"),
        }
    }
}

impl std::error::Error for PlacementError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn occupied_display_mentions_ball() {
        let err = PlacementError::Occupied {
            pos: Pos::new(1, 2),
            kind: CellKind::Sticky,
            has_ball: true,
        };
        let msg = err.to_string();
        assert!(msg.contains("(1, 2)"));
        assert!(msg.contains("sticky"));
        assert!(msg.contains("holds a ball"));
    }
}
