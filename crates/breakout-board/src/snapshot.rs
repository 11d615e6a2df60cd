//! Point-in-time copies of board state for reporting.

use std::fmt::Write as _;

use breakout_core::CellKind;

use crate::board::Board;
use crate::cell::Cell;
use crate::sync::lock;

/// A cell-by-cell copy of a board.
///
/// Each cell is copied under its own lock, one at a time, so every cell is
/// internally consistent but the grid as a whole may mix states from
/// before and after concurrent moves. That is good enough for display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoardSnapshot {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
    collisions: u64,
    active_balls: usize,
}

impl BoardSnapshot {
    /// Board width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Board height.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The copied cell at `(x, y)`, or `None` off the board.
    pub fn cell(&self, x: i32, y: i32) -> Option<&Cell> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        self.cells.get((y as usize) * (self.width as usize) + x as usize)
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Collision count when the snapshot was taken.
    pub fn collisions(&self) -> u64 {
        self.collisions
    }

    /// Live ball count when the snapshot was taken.
    pub fn active_balls(&self) -> usize {
        self.active_balls
    }

    /// Number of cells holding a ball.
    pub fn occupied_cells(&self) -> usize {
        self.cells.iter().filter(|c| c.occupant.is_some()).count()
    }

    /// Plain-text rendering, one line per row.
    ///
    /// `O` ball, `.` empty, `_` sticky, `W` warp, `=` paddle, `X` trash or
    /// indestructible obstacle, digits for obstacle strength (`%` above 9).
    pub fn render_plain(&self) -> String {
        let mut out = String::with_capacity(self.cells.len() + self.height as usize + 32);
        let _ = writeln!(
            out,
            "{} balls, {} collisions",
            self.active_balls, self.collisions
        );
        for row in self.cells.chunks(self.width as usize) {
            out.extend(row.iter().map(glyph));
            out.push('\n');
        }
        out
    }
}

fn glyph(cell: &Cell) -> char {
    if cell.occupant.is_some() {
        return 'O';
    }
    match cell.kind {
        CellKind::Empty => '.',
        CellKind::Sticky => '_',
        CellKind::Warp => 'W',
        CellKind::Trash => 'X',
        CellKind::Paddle => '=',
        CellKind::Obstacle => match cell.strength {
            0 => 'X',
            s @ 1..=9 => char::from(b'0' + s as u8),
            _ => '%',
        },
    }
}

impl Board {
    /// Copy every cell, one lock at a time.
    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            width: self.width(),
            height: self.height(),
            cells: self.cells.iter().map(|c| *lock(c)).collect(),
            collisions: self.collisions(),
            active_balls: self.active_balls(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use breakout_core::{Pos, Velocity};

    #[test]
    fn renders_every_kind() {
        let mut b = Board::new(8, 2).unwrap();
        b.set_obstacle(Pos::new(0, 0), 3).unwrap();
        b.set_obstacle(Pos::new(1, 0), 12).unwrap();
        b.set_obstacle(Pos::new(2, 0), 0).unwrap();
        b.set_kind(Pos::new(3, 0), CellKind::Sticky).unwrap();
        b.set_kind(Pos::new(4, 0), CellKind::Trash).unwrap();
        b.set_kind(Pos::new(5, 0), CellKind::Paddle).unwrap();
        b.add_warp_pair(Pos::new(6, 0), Pos::new(7, 1)).unwrap();
        b.place_ball(Pos::new(0, 1), Velocity::new(1, 1)).unwrap();

        let snap = b.snapshot();
        assert_eq!(
            snap.render_plain(),
            "1 balls, 0 collisions\n3%X_X=W.\nO......W\n"
        );
        assert_eq!(snap.occupied_cells(), 1);
        assert_eq!(snap.cell(8, 0), None);
        assert_eq!(snap.cell(2, 0).map(|c| c.kind), Some(CellKind::Obstacle));
    }
}
