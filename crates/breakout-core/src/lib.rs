//! Core types for the breakout board simulation.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! vocabulary shared by the board and the engine: entity handles,
//! positions and velocities, cell kinds, and per-move outcomes.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cell;
pub mod geom;
pub mod id;
pub mod outcome;

pub use cell::CellKind;
pub use geom::{Pos, Velocity};
pub use id::{BallId, WarpId};
pub use outcome::{BallStatus, MoveOutcome};
