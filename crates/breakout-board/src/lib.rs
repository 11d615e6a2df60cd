//! Shared board state for the breakout simulation.
//!
//! A [`Board`] is passive storage: a row-major grid of individually locked
//! [`Cell`]s plus arenas of balls and warp endpoints. All movement logic
//! runs through [`Board::move_ball`], which acquires every cell it will
//! touch in ascending row-major order before reading or writing any of
//! them. Warp tunnels hand balls off through per-endpoint FIFO channels,
//! and the [`Paddle`] controller rewrites its row under the same locks.
//!
//! # Locking discipline
//!
//! ```text
//! cell locks (ascending index)  ──►  ball record locks (one at a time)
//! ```
//!
//! A ball's record is only mutated while holding the lock of the cell
//! that ball occupies, or by the single warp worker that dequeued it.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod ball;
pub mod board;
pub mod cell;
pub mod error;
pub mod lock;
pub mod paddle;
pub mod snapshot;
mod sync;
pub mod warp;

pub use ball::BallState;
pub use board::{Board, CellRef};
pub use cell::Cell;
pub use error::PlacementError;
pub use lock::CellLocks;
pub use paddle::Paddle;
pub use snapshot::BoardSnapshot;
pub use warp::WarpEndpoint;
