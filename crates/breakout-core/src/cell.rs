//! Cell kinds.

use std::fmt;

/// What occupies a board cell, independent of any ball resting on it.
///
/// The declaration order matters: everything from [`Obstacle`](Self::Obstacle)
/// onwards is *obstacle-class* and deflects balls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CellKind {
    /// Free space.
    #[default]
    Empty,
    /// Halts any ball that enters until a collision sets it moving again.
    Sticky,
    /// One mouth of a warp tunnel.
    Warp,
    /// Destroys any ball that enters.
    Trash,
    /// A brick. Loses one point of strength per hit and becomes empty at zero.
    Obstacle,
    /// Part of the moving paddle. Deflects like an obstacle but never wears.
    Paddle,
}

impl CellKind {
    /// Whether a ball bounces off this cell instead of entering it.
    pub fn is_obstacle_class(self) -> bool {
        self >= CellKind::Obstacle
    }

    /// Whether a ball may be placed on this cell at setup time.
    pub fn accepts_ball(self) -> bool {
        matches!(self, CellKind::Empty | CellKind::Sticky)
    }
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Empty => "empty",
            Self::Sticky => "sticky",
            Self::Warp => "warp",
            Self::Trash => "trash",
            Self::Obstacle => "obstacle",
            Self::Paddle => "paddle",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn obstacle_class_is_obstacle_and_paddle() {
        let deflecting: Vec<_> = [
            CellKind::Empty,
            CellKind::Sticky,
            CellKind::Warp,
            CellKind::Trash,
            CellKind::Obstacle,
            CellKind::Paddle,
        ]
        .into_iter()
        .filter(|k| k.is_obstacle_class())
        .collect();
        assert_eq!(deflecting, vec![CellKind::Obstacle, CellKind::Paddle]);
    }

    #[test]
    fn only_empty_and_sticky_accept_balls() {
        assert!(CellKind::Empty.accepts_ball());
        assert!(CellKind::Sticky.accepts_ball());
        assert!(!CellKind::Warp.accepts_ball());
        assert!(!CellKind::Paddle.accepts_ball());
    }
}
