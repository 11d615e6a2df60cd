//! Test fixtures and invariant checks for breakout development.
//!
//! [`fixtures`] builds small boards for the canonical scenarios; the
//! functions here check the occupancy invariant on a quiescent board.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{arena_box, converging_pair, scenario_a, Fixture};

use breakout_board::Board;
use breakout_core::BallStatus;

/// Every way the board disagrees with its balls' own records.
///
/// Meaningful only when no worker is running. On a consistent board:
/// each on-board ball is named by exactly one cell, that cell is at the
/// ball's position, and balls in transit or destroyed are named by none.
pub fn occupancy_violations(board: &Board) -> Vec<String> {
    let snap = board.snapshot();
    let mut claims = vec![Vec::new(); board.ball_count()];
    for (index, cell) in snap.cells().iter().enumerate() {
        if let Some(id) = cell.occupant {
            match claims.get_mut(id.index()) {
                Some(list) => list.push(board.pos_of(index)),
                None => return vec![format!("cell {} names unknown {id}", board.pos_of(index))],
            }
        }
    }

    let mut problems = Vec::new();
    for id in board.ball_ids() {
        let state = board.ball(id);
        let cells = &claims[id.index()];
        if state.status.on_board() {
            if cells.as_slice() != [state.pos] {
                problems.push(format!(
                    "{id} ({}) at {} is claimed by cells {cells:?}",
                    state.status, state.pos
                ));
            }
        } else if !cells.is_empty() {
            problems.push(format!(
                "{id} ({}) still claimed by cells {cells:?}",
                state.status
            ));
        }
    }

    let live = board
        .ball_ids()
        .filter(|&id| board.ball(id).status != BallStatus::Destroyed)
        .count();
    if live != board.active_balls() {
        problems.push(format!(
            "active_balls() = {} but {live} balls are not destroyed",
            board.active_balls()
        ));
    }
    problems
}

/// Panic with a readable report if [`occupancy_violations`] finds anything.
pub fn assert_occupancy_consistent(board: &Board) {
    let problems = occupancy_violations(board);
    assert!(
        problems.is_empty(),
        "occupancy invariant violated:\n  {}\n{}",
        problems.join("\n  "),
        board.snapshot().render_plain()
    );
}
