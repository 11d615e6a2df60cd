//! The paddle controller.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use breakout_core::{CellKind, Pos};
use log::debug;

use crate::board::Board;
use crate::error::PlacementError;

/// A horizontal paddle sliding back and forth along one row.
///
/// Each [`tick`](Paddle::tick) shifts the paddle one cell in its current
/// direction, or reverses direction when the shift would push it past an
/// edge, then repaints the whole row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Paddle {
    left: i32,
    width: i32,
    row: i32,
    dir: i32,
}

impl Paddle {
    /// A paddle covering `[left, left + width)` on `row`, initially moving
    /// right.
    pub fn new(board: &Board, left: i32, row: i32, width: u32) -> Result<Self, PlacementError> {
        let width_i = i32::try_from(width).unwrap_or(i32::MAX);
        let pos = Pos::new(left, row);
        if width == 0
            || !board.in_bounds(pos)
            || !board.in_bounds(Pos::new(left.saturating_add(width_i - 1), row))
        {
            return Err(PlacementError::OutOfBounds { pos });
        }
        Ok(Self {
            left,
            width: width_i,
            row,
            dir: 1,
        })
    }

    /// Leftmost paddle column.
    pub fn left(&self) -> i32 {
        self.left
    }

    /// Paddle width in cells.
    pub fn width(&self) -> u32 {
        self.width as u32
    }

    /// The row the paddle occupies.
    pub fn row(&self) -> i32 {
        self.row
    }

    /// Current direction, `-1` or `+1`.
    pub fn direction(&self) -> i32 {
        self.dir
    }

    /// Advance one step and repaint the row.
    pub fn tick(&mut self, board: &Board) {
        let next = self.left + self.dir;
        if next >= 0 && next + self.width <= board.width() as i32 {
            self.left = next;
        } else {
            self.dir = -self.dir;
        }
        self.paint(board);
    }

    /// Rewrite the paddle row: paddle cells inside `[left, left + width)`,
    /// empty cells elsewhere. Ball occupants are left in place.
    pub fn paint(&self, board: &Board) {
        let span = self.left..self.left + self.width;
        let mut row = board.lock_row(self.row);
        for (pos, cell) in row.iter_mut() {
            cell.kind = if span.contains(&pos.x) {
                CellKind::Paddle
            } else {
                CellKind::Empty
            };
        }
    }

    /// Worker loop: tick every `delay` until `shutdown` is set.
    pub fn run(&mut self, board: &Board, delay: Duration, shutdown: &AtomicBool) {
        debug!(
            "paddle worker started on row {} (width {})",
            self.row, self.width
        );
        while !shutdown.load(Ordering::Acquire) {
            self.tick(board);
            if delay.is_zero() {
                thread::yield_now();
            } else {
                thread::sleep(delay);
            }
        }
        debug!("paddle worker stopped at column {}", self.left);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use breakout_core::Velocity;

    fn row_kinds(board: &Board, y: i32) -> String {
        (0..board.width() as i32)
            .map(|x| match board.cell(x, y).read().kind {
                CellKind::Paddle => '=',
                CellKind::Empty => '.',
                _ => '?',
            })
            .collect()
    }

    #[test]
    fn rejects_paddle_hanging_off_the_board() {
        let board = Board::new(6, 4).unwrap();
        assert!(Paddle::new(&board, 3, 2, 4).is_err());
        assert!(Paddle::new(&board, 0, 4, 2).is_err());
        assert!(Paddle::new(&board, 0, 2, 0).is_err());
        assert!(Paddle::new(&board, 2, 2, 4).is_ok());
    }

    #[test]
    fn sweeps_and_reverses_at_edges() {
        let board = Board::new(6, 4).unwrap();
        let mut p = Paddle::new(&board, 0, 2, 3).unwrap();
        p.paint(&board);
        assert_eq!(row_kinds(&board, 2), "===...");

        let mut lefts = Vec::new();
        for _ in 0..8 {
            p.tick(&board);
            lefts.push(p.left());
        }
        // Right to the edge, one tick spent reversing, then back left.
        assert_eq!(lefts, vec![1, 2, 3, 3, 2, 1, 0, 0]);
        assert_eq!(p.direction(), 1);
        assert_eq!(row_kinds(&board, 2), "===...");
        p.tick(&board);
        assert_eq!(row_kinds(&board, 2), ".===..");
    }

    #[test]
    fn full_width_paddle_only_reverses() {
        let board = Board::new(4, 3).unwrap();
        let mut p = Paddle::new(&board, 0, 1, 4).unwrap();
        for _ in 0..5 {
            p.tick(&board);
            assert_eq!(p.left(), 0);
            assert_eq!(row_kinds(&board, 1), "====");
        }
    }

    #[test]
    fn repaint_keeps_ball_occupants() {
        let mut board = Board::new(6, 4).unwrap();
        let id = board.place_ball(Pos::new(1, 2), Velocity::new(1, 1)).unwrap();
        let mut p = Paddle::new(&board, 0, 2, 3).unwrap();
        p.tick(&board);
        let c = board.cell(1, 2).read();
        assert_eq!(c.kind, CellKind::Paddle);
        assert_eq!(c.occupant, Some(id));
    }

    #[test]
    fn ball_bounces_off_paddle() {
        let mut board = Board::new(8, 6).unwrap();
        let id = board.place_ball(Pos::new(3, 3), Velocity::new(1, 1)).unwrap();
        let p = Paddle::new(&board, 2, 4, 4).unwrap();
        p.paint(&board);
        assert_eq!(board.move_ball(id), breakout_core::MoveOutcome::Moved);
        let s = board.ball(id);
        assert_eq!(s.vel, Velocity::new(1, -1));
        assert_eq!(s.pos, Pos::new(4, 2));
        assert_eq!(board.cell(3, 4).read().kind, CellKind::Paddle);
    }
}
