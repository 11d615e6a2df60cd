//! Strongly-typed handles for board-owned entities.
//!
//! Cells never hold references to balls or warp endpoints. They hold these
//! indices into the board's arenas instead, so an entity's lifetime is the
//! board's lifetime and nothing can dangle.

use std::fmt;

/// Identifies a ball within a board's ball arena.
///
/// `BallId(n)` is the n-th ball placed on the board. Ids are never reused,
/// even after the ball is destroyed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BallId(pub u32);

impl BallId {
    /// Position in the owning arena.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for BallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ball#{}", self.0)
    }
}

impl From<u32> for BallId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Identifies one end of a warp tunnel within a board's warp arena.
///
/// Endpoints are created in pairs: `WarpId(2k)` and `WarpId(2k + 1)` are
/// the two mouths of the k-th tunnel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WarpId(pub u32);

impl WarpId {
    /// Position in the owning arena.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// The other mouth of the same tunnel.
    pub fn partner(self) -> WarpId {
        WarpId(self.0 ^ 1)
    }
}

impl fmt::Display for WarpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "warp#{}", self.0)
    }
}

impl From<u32> for WarpId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}
