//! Board coordinates and ball velocities.

use std::fmt;

/// A board coordinate. `x` is the column, `y` the row; `(0, 0)` is the
/// top-left cell.
///
/// Coordinates are signed because ball movement routinely probes one step
/// past the edge; such positions resolve to the board's sentinel cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pos {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl Pos {
    /// Create a position.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// This position shifted by `(dx, dy)`.
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for Pos {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// Per-move displacement of a ball. Each component is one of `-1`, `0`, `1`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Velocity {
    /// Horizontal component.
    pub dx: i32,
    /// Vertical component.
    pub dy: i32,
}

impl Velocity {
    /// The velocity of a ball resting on a sticky cell.
    pub const ZERO: Velocity = Velocity { dx: 0, dy: 0 };

    /// Create a velocity. Components are not checked; see
    /// [`is_unit`](Self::is_unit).
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    /// Whether both components lie in `{-1, 0, 1}`.
    pub fn is_unit(self) -> bool {
        (-1..=1).contains(&self.dx) && (-1..=1).contains(&self.dy)
    }

    /// Whether the ball would not move at all.
    pub fn is_zero(self) -> bool {
        self.dx == 0 && self.dy == 0
    }

    /// Both components negated.
    pub fn reversed(self) -> Self {
        Self {
            dx: -self.dx,
            dy: -self.dy,
        }
    }
}

impl fmt::Display for Velocity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}, {}>", self.dx, self.dy)
    }
}

impl From<(i32, i32)> for Velocity {
    fn from((dx, dy): (i32, i32)) -> Self {
        Self { dx, dy }
    }
}
