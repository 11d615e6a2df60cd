//! The grid, its entity arenas, and bounds-checked cell lookup.

use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use breakout_core::{BallId, BallStatus, CellKind, Pos, Velocity, WarpId};
use smallvec::SmallVec;

use crate::ball::{BallSlot, BallState};
use crate::cell::Cell;
use crate::error::PlacementError;
use crate::lock::CellLocks;
use crate::sync::lock;
use crate::warp::WarpEndpoint;

/// Largest supported side length.
pub const MAX_SIDE: u32 = 1 << 15;

/// A handle to one cell, as returned by [`Board::cell`].
#[derive(Clone, Copy, Debug)]
pub enum CellRef<'a> {
    /// An on-board cell and its row-major index.
    Grid {
        /// Row-major index.
        index: usize,
        /// The cell's lock.
        slot: &'a Mutex<Cell>,
    },
    /// The shared, read-only stand-in for every off-board position.
    Sentinel,
}

impl<'a> CellRef<'a> {
    /// A point-in-time copy of the cell.
    pub fn read(&self) -> Cell {
        match self {
            Self::Grid { slot, .. } => *lock(slot),
            Self::Sentinel => Cell::SENTINEL,
        }
    }

    /// Lock the cell for mutation. `None` for the sentinel, which is never
    /// writable.
    pub fn lock(&self) -> Option<MutexGuard<'a, Cell>> {
        match self {
            Self::Grid { slot, .. } => Some(lock(slot)),
            Self::Sentinel => None,
        }
    }

    /// Row-major index, or `None` for the sentinel.
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::Grid { index, .. } => Some(*index),
            Self::Sentinel => None,
        }
    }

    /// Whether this is the off-board sentinel.
    pub fn is_sentinel(&self) -> bool {
        matches!(self, Self::Sentinel)
    }

    /// Whether both handles denote the same cell.
    pub fn same_cell(&self, other: &CellRef<'_>) -> bool {
        match (self, other) {
            (Self::Grid { slot: a, .. }, CellRef::Grid { slot: b, .. }) => std::ptr::eq(*a, *b),
            (Self::Sentinel, CellRef::Sentinel) => true,
            _ => false,
        }
    }
}

/// The shared simulation board.
///
/// Built single-threaded through the `&mut self` placement methods, then
/// shared (typically behind an `Arc`) with every worker. After setup all
/// access goes through per-cell locks and atomics.
pub struct Board {
    pub(crate) width: i32,
    pub(crate) height: i32,
    pub(crate) cells: Vec<Mutex<Cell>>,
    pub(crate) balls: Vec<BallSlot>,
    pub(crate) warps: Vec<WarpEndpoint>,
    collisions: AtomicU64,
    pub(crate) live_balls: AtomicUsize,
}

// Compile-time assertion: Board must be Send + Sync to be shared by workers.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<Board>();
};

impl Board {
    /// Create an all-empty `width x height` board.
    pub fn new(width: u32, height: u32) -> Result<Self, PlacementError> {
        if width == 0 || height == 0 || width > MAX_SIDE || height > MAX_SIDE {
            return Err(PlacementError::InvalidDimensions { width, height });
        }
        let n = (width as usize) * (height as usize);
        Ok(Self {
            width: width as i32,
            height: height as i32,
            cells: (0..n).map(|_| Mutex::new(Cell::default())).collect(),
            balls: Vec::new(),
            warps: Vec::new(),
            collisions: AtomicU64::new(0),
            live_balls: AtomicUsize::new(0),
        })
    }

    /// Board width in cells.
    pub fn width(&self) -> u32 {
        self.width as u32
    }

    /// Board height in cells.
    pub fn height(&self) -> u32 {
        self.height as u32
    }

    /// Whether `pos` lies on the board.
    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    /// Row-major index of `pos`, or `None` when off the board.
    pub fn index_of(&self, pos: Pos) -> Option<usize> {
        self.in_bounds(pos)
            .then(|| (pos.y as usize) * (self.width as usize) + pos.x as usize)
    }

    /// Position of a row-major index.
    pub fn pos_of(&self, index: usize) -> Pos {
        let w = self.width as usize;
        Pos::new((index % w) as i32, (index / w) as i32)
    }

    /// Look up the cell at `(x, y)`.
    ///
    /// Off-board coordinates all resolve to the same [`CellRef::Sentinel`],
    /// which reads as an indestructible obstacle and cannot be written.
    pub fn cell(&self, x: i32, y: i32) -> CellRef<'_> {
        match self.index_of(Pos::new(x, y)) {
            Some(index) => CellRef::Grid {
                index,
                slot: &self.cells[index],
            },
            None => CellRef::Sentinel,
        }
    }

    /// [`cell`](Self::cell) taking a [`Pos`].
    pub fn cell_at(&self, pos: Pos) -> CellRef<'_> {
        self.cell(pos.x, pos.y)
    }

    /// Count one ball-to-ball collision.
    pub fn record_collision(&self) {
        self.collisions.fetch_add(1, Ordering::Relaxed);
    }

    /// Total collisions recorded so far.
    pub fn collisions(&self) -> u64 {
        self.collisions.load(Ordering::Relaxed)
    }

    /// Number of balls that have not been destroyed.
    pub fn active_balls(&self) -> usize {
        self.live_balls.load(Ordering::Acquire)
    }

    /// Lock every on-board cell among `positions`, in ascending row-major
    /// order, skipping duplicates. Off-board positions take no lock.
    ///
    /// Every multi-cell operation goes through this so that two workers
    /// converging on each other's cells can never deadlock.
    pub fn lock_cells(&self, positions: &[Pos]) -> CellLocks<'_> {
        let mut indices: SmallVec<[usize; 8]> =
            positions.iter().filter_map(|&p| self.index_of(p)).collect();
        indices.sort_unstable();
        indices.dedup();
        let guards = indices
            .into_iter()
            .map(|i| (i, lock(&self.cells[i])))
            .collect();
        CellLocks::new(self, guards)
    }

    /// Lock an entire row, left to right.
    pub fn lock_row(&self, y: i32) -> CellLocks<'_> {
        let guards = if (0..self.height).contains(&y) {
            let start = (y as usize) * (self.width as usize);
            (start..start + self.width as usize)
                .map(|i| (i, lock(&self.cells[i])))
                .collect()
        } else {
            SmallVec::new()
        };
        CellLocks::new(self, guards)
    }

    // ── Setup ────────────────────────────────────────────────────

    fn setup_cell(&mut self, pos: Pos) -> Result<&mut Cell, PlacementError> {
        let index = self
            .index_of(pos)
            .ok_or(PlacementError::OutOfBounds { pos })?;
        Ok(self.cells[index]
            .get_mut()
            .unwrap_or_else(std::sync::PoisonError::into_inner))
    }

    /// Set the kind of an empty, unoccupied cell.
    ///
    /// Warp cells must be created with [`add_warp_pair`](Self::add_warp_pair).
    /// Use [`set_obstacle`](Self::set_obstacle) for bricks with strength.
    pub fn set_kind(&mut self, pos: Pos, kind: CellKind) -> Result<(), PlacementError> {
        if kind == CellKind::Warp {
            return Err(PlacementError::UnpairedWarp { pos });
        }
        let cell = self.setup_cell(pos)?;
        if cell.kind != CellKind::Empty || (cell.occupant.is_some() && !kind.accepts_ball()) {
            return Err(PlacementError::Occupied {
                pos,
                kind: cell.kind,
                has_ball: cell.occupant.is_some(),
            });
        }
        cell.kind = kind;
        Ok(())
    }

    /// Place a brick of the given strength on an empty, unoccupied cell.
    pub fn set_obstacle(&mut self, pos: Pos, strength: u32) -> Result<(), PlacementError> {
        self.set_kind(pos, CellKind::Obstacle)?;
        self.setup_cell(pos)?.strength = strength;
        Ok(())
    }

    /// Create a warp tunnel between two empty cells.
    ///
    /// Returns the endpoints located at `a` and `b`. A ball entering the
    /// cell at `a` is queued on the endpoint at `b` and reappears there, and
    /// vice versa.
    pub fn add_warp_pair(&mut self, a: Pos, b: Pos) -> Result<(WarpId, WarpId), PlacementError> {
        if a == b {
            return Err(PlacementError::DegenerateWarp { pos: a });
        }
        let next = u32::try_from(self.warps.len()).map_err(|_| PlacementError::ArenaFull)?;
        let wa = WarpId(next);
        let wb = WarpId(next.checked_add(1).ok_or(PlacementError::ArenaFull)?);
        for pos in [a, b] {
            let cell = self.setup_cell(pos)?;
            if cell.kind != CellKind::Empty || cell.occupant.is_some() {
                return Err(PlacementError::Occupied {
                    pos,
                    kind: cell.kind,
                    has_ball: cell.occupant.is_some(),
                });
            }
        }
        for (pos, receiver) in [(a, wb), (b, wa)] {
            let cell = self.setup_cell(pos)?;
            cell.kind = CellKind::Warp;
            cell.warp = Some(receiver);
        }
        self.warps.push(WarpEndpoint::new(a));
        self.warps.push(WarpEndpoint::new(b));
        Ok((wa, wb))
    }

    /// Place a new ball on an empty or sticky cell.
    ///
    /// The ball starts [`Active`](BallStatus::Active) even on a sticky
    /// cell; it only stops when it *enters* one.
    pub fn place_ball(&mut self, pos: Pos, vel: Velocity) -> Result<BallId, PlacementError> {
        if !vel.is_unit() || vel.is_zero() {
            return Err(PlacementError::InvalidVelocity { vel });
        }
        let id = BallId(u32::try_from(self.balls.len()).map_err(|_| PlacementError::ArenaFull)?);
        let cell = self.setup_cell(pos)?;
        if !cell.kind.accepts_ball() || cell.occupant.is_some() {
            return Err(PlacementError::Occupied {
                pos,
                kind: cell.kind,
                has_ball: cell.occupant.is_some(),
            });
        }
        cell.occupant = Some(id);
        self.balls.push(BallSlot::new(BallState {
            pos,
            vel,
            status: BallStatus::Active,
        }));
        *self.live_balls.get_mut() += 1;
        Ok(id)
    }

    // ── Entity access ────────────────────────────────────────────

    /// Number of balls ever placed, including destroyed ones.
    pub fn ball_count(&self) -> usize {
        self.balls.len()
    }

    /// Handles of every ball ever placed, in placement order.
    pub fn ball_ids(&self) -> impl Iterator<Item = BallId> + '_ {
        (0..self.balls.len() as u32).map(BallId)
    }

    /// A point-in-time copy of a ball's record.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this board.
    pub fn ball(&self, id: BallId) -> BallState {
        *lock(&self.balls[id.index()].state)
    }

    /// Number of warp endpoints (twice the number of tunnels).
    pub fn warp_count(&self) -> usize {
        self.warps.len()
    }

    /// Handles of every warp endpoint.
    pub fn warp_ids(&self) -> impl Iterator<Item = WarpId> + '_ {
        (0..self.warps.len() as u32).map(WarpId)
    }

    /// Access a warp endpoint.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this board.
    pub fn warp(&self, id: WarpId) -> &WarpEndpoint {
        &self.warps[id.index()]
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Board")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("balls", &self.balls.len())
            .field("active_balls", &self.active_balls())
            .field("warps", &self.warps.len())
            .field("collisions", &self.collisions())
            .finish()
    }
}
