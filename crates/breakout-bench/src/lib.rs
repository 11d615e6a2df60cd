//! Benchmark profiles for the breakout simulation.
//!
//! - [`reference_layout`]: the classic 100x31 board with 24 balls
//! - [`crowded_layout`]: a 200x60 board with 400 balls, warps and a paddle

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use breakout_engine::{BoardConfig, LayoutSpec};

/// The classic board: 100x31, 24 balls, 12 sticky cells, 10 brick rows.
pub fn reference_layout(seed: u64) -> BoardConfig {
    LayoutSpec::default()
        .generate(seed)
        .expect("reference layout fits")
}

/// A crowded board for contention measurements.
pub fn crowded_layout(seed: u64) -> BoardConfig {
    LayoutSpec {
        width: 200,
        height: 60,
        balls: 400,
        sticky: 40,
        warps: 8,
        brick_rows: Some(12),
        paddle: true,
    }
    .generate(seed)
    .expect("crowded layout fits")
}
