//! A single grid slot.

use breakout_core::{BallId, CellKind, WarpId};

/// One board position's state.
///
/// `kind` and `occupant` are independent: the paddle may sweep over a
/// ball, turning its cell into [`CellKind::Paddle`] without evicting it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cell {
    /// What the cell is.
    pub kind: CellKind,
    /// The ball resting here, if any.
    pub occupant: Option<BallId>,
    /// Remaining hits before an obstacle crumbles. Zero on an obstacle
    /// means indestructible; ignored for every other kind.
    pub strength: u32,
    /// For warp cells: the endpoint that receives balls entering here.
    pub warp: Option<WarpId>,
}

impl Cell {
    /// The cell reported for every off-board coordinate: an indestructible
    /// obstacle.
    pub const SENTINEL: Cell = Cell {
        kind: CellKind::Obstacle,
        occupant: None,
        strength: 0,
        warp: None,
    };

    /// A fresh cell of the given kind.
    pub const fn of_kind(kind: CellKind) -> Self {
        Self {
            kind,
            occupant: None,
            strength: 0,
            warp: None,
        }
    }

    /// A brick with the given strength (`0` = indestructible).
    pub const fn obstacle(strength: u32) -> Self {
        Self {
            kind: CellKind::Obstacle,
            occupant: None,
            strength,
            warp: None,
        }
    }

    /// Register one ball impact.
    ///
    /// Breakable obstacles lose a point of strength and turn empty at zero.
    /// Paddles and indestructible obstacles are unaffected.
    pub fn hit_obstacle(&mut self) {
        if self.kind == CellKind::Obstacle && self.strength != 0 {
            self.strength -= 1;
            if self.strength == 0 {
                self.kind = CellKind::Empty;
            }
        }
    }

    /// Whether a ball entering this cell would bounce.
    pub fn is_obstacle_class(&self) -> bool {
        self.kind.is_obstacle_class()
    }
}
