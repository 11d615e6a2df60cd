//! Reusable board fixtures.
//!
//! - [`scenario_a`]: a ball about to graze a strength-2 obstacle.
//! - [`converging_pair`]: two balls heading straight at each other.
//! - [`arena_box`]: a walled box crowded with balls for stress runs.

use breakout_board::Board;
use breakout_core::{BallId, CellKind, Pos, Velocity};

/// A board plus the balls placed on it, in placement order.
pub struct Fixture {
    pub board: Board,
    pub balls: Vec<BallId>,
}

/// 10x10 board, obstacle of strength 2 at (5,5), ball at (4,5) moving (1,0).
pub fn scenario_a() -> Fixture {
    let mut board = Board::new(10, 10).unwrap();
    board.set_obstacle(Pos::new(5, 5), 2).unwrap();
    let ball = board.place_ball(Pos::new(4, 5), Velocity::new(1, 0)).unwrap();
    Fixture {
        board,
        balls: vec![ball],
    }
}

/// Ball A at (1,1) moving (1,0) and ball B at (2,1) moving (-1,0).
pub fn converging_pair() -> Fixture {
    let mut board = Board::new(10, 10).unwrap();
    let a = board.place_ball(Pos::new(1, 1), Velocity::new(1, 0)).unwrap();
    let b = board.place_ball(Pos::new(2, 1), Velocity::new(-1, 0)).unwrap();
    Fixture {
        board,
        balls: vec![a, b],
    }
}

/// A `side x side` board with a ring of breakable bricks one cell in from
/// the edge, a few sticky cells, and `n_balls` balls packed inside.
///
/// Balls are placed left to right, top to bottom, on every other cell of
/// the interior, with velocities cycling through the four diagonals.
pub fn arena_box(side: u32, n_balls: usize) -> Fixture {
    assert!(side >= 8, "arena_box needs side >= 8");
    let mut board = Board::new(side, side).unwrap();
    let s = side as i32;
    for i in 1..s - 1 {
        for pos in [
            Pos::new(i, 1),
            Pos::new(i, s - 2),
            Pos::new(1, i),
            Pos::new(s - 2, i),
        ] {
            if board.cell_at(pos).read().kind == CellKind::Empty {
                board.set_obstacle(pos, 3).unwrap();
            }
        }
    }
    for pos in [Pos::new(3, 3), Pos::new(s - 4, s - 4)] {
        board.set_kind(pos, CellKind::Sticky).unwrap();
    }

    let diagonals = [
        Velocity::new(1, 1),
        Velocity::new(-1, 1),
        Velocity::new(1, -1),
        Velocity::new(-1, -1),
    ];
    let mut balls = Vec::with_capacity(n_balls);
    'place: for y in 2..s - 2 {
        for x in (2..s - 2).step_by(2) {
            if balls.len() == n_balls {
                break 'place;
            }
            let pos = Pos::new(x + (y % 2), y);
            if pos.x >= s - 2 {
                continue;
            }
            let vel = diagonals[balls.len() % diagonals.len()];
            balls.push(board.place_ball(pos, vel).unwrap());
        }
    }
    assert_eq!(balls.len(), n_balls, "arena_box({side}) cannot hold {n_balls} balls");
    Fixture { board, balls }
}
