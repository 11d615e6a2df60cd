//! A set of held cell locks, acquired in ascending row-major order.

use std::sync::MutexGuard;

use breakout_core::Pos;
use smallvec::SmallVec;

use crate::board::Board;
use crate::cell::Cell;

/// Sentinel storage for off-board reads through a lock set.
static SENTINEL: Cell = Cell::SENTINEL;

/// Guards for a neighbourhood of cells, created by [`Board::lock_cells`]
/// or [`Board::lock_row`].
///
/// Reads of off-board positions yield the sentinel; writes to them are
/// silently dropped, so an edge bounce can never wear the board's border
/// down. Touching an on-board cell that is not part of the set is a bug in
/// the caller and panics.
pub struct CellLocks<'a> {
    board: &'a Board,
    guards: SmallVec<[(usize, MutexGuard<'a, Cell>); 8]>,
}

impl<'a> CellLocks<'a> {
    pub(crate) fn new(board: &'a Board, guards: SmallVec<[(usize, MutexGuard<'a, Cell>); 8]>) -> Self {
        debug_assert!(guards.windows(2).all(|w| w[0].0 < w[1].0));
        Self { board, guards }
    }

    /// Row-major indices held, ascending.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.guards.iter().map(|(i, _)| *i)
    }

    fn slot(&self, pos: Pos) -> Option<usize> {
        let index = self.board.index_of(pos)?;
        let slot = self
            .guards
            .binary_search_by_key(&index, |(i, _)| *i)
            .unwrap_or_else(|_| panic!("cell {pos} is not in the locked neighbourhood"));
        Some(slot)
    }

    /// The cell at `pos`, or the sentinel when off the board.
    pub fn get(&self, pos: Pos) -> &Cell {
        match self.slot(pos) {
            Some(slot) => &self.guards[slot].1,
            None => &SENTINEL,
        }
    }

    /// Mutable access to the cell at `pos`; `None` when off the board.
    pub fn get_mut(&mut self, pos: Pos) -> Option<&mut Cell> {
        let slot = self.slot(pos)?;
        Some(&mut *self.guards[slot].1)
    }

    /// Register a ball impact on the cell at `pos`. A no-op off the board.
    pub fn hit_obstacle(&mut self, pos: Pos) {
        if let Some(cell) = self.get_mut(pos) {
            cell.hit_obstacle();
        }
    }

    /// Iterate the held cells mutably, with their positions, in index order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Pos, &mut Cell)> + '_ + use<'_, 'a> {
        let board = self.board;
        self.guards
            .iter_mut()
            .map(move |(i, guard)| (board.pos_of(*i), &mut **guard))
    }
}
