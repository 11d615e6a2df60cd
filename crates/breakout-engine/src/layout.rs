//! Random board layouts driven by object counts.
//!
//! [`LayoutSpec`] asks for "so many balls, so many sticky cells" rather than
//! exact positions. [`generate()`](LayoutSpec::generate) turns it into a
//! [`BoardConfig`] using a seeded [`ChaCha8Rng`], so a seed always yields
//! the same board.
//!
//! Layout, top to bottom: `brick_rows` full rows of bricks (the top rows
//! strongest), the open field where sticky cells,
//! warps and balls are scattered, then with a paddle the paddle row and a
//! trash row along the bottom edge. The bottom two rows are kept clear of
//! random placements either way.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use breakout_core::{Pos, Velocity};

use crate::config::{
    BallConfig, BoardConfig, ConfigError, ObstacleRow, PaddleConfig, MAX_WIDTH,
};

/// Widest paddle a generated layout uses.
pub const PADDLE_WIDTH: u32 = 8;

/// Object counts for a randomly generated board.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayoutSpec {
    /// Board width. Default: 100.
    pub width: u32,
    /// Board height. Default: 31.
    pub height: u32,
    /// Number of balls. Default: 24.
    pub balls: u32,
    /// Number of sticky cells. Default: 12.
    pub sticky: u32,
    /// Number of warp endpoints; must be even. Default: 0.
    pub warps: u32,
    /// Rows of bricks along the top. `None` = a third of the height.
    pub brick_rows: Option<u32>,
    /// Add a paddle above a trash row. Default: false.
    pub paddle: bool,
}

impl Default for LayoutSpec {
    fn default() -> Self {
        Self {
            width: 100,
            height: 31,
            balls: 24,
            sticky: 12,
            warps: 0,
            brick_rows: None,
            paddle: false,
        }
    }
}

impl LayoutSpec {
    /// Brick rows after applying the default.
    pub fn resolved_brick_rows(&self) -> u32 {
        self.brick_rows.unwrap_or(self.height / 3)
    }

    /// Check that the requested counts fit the open field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (width, height) = (self.width, self.height);
        if width < 2 || height < 2 {
            return Err(ConfigError::BoardTooSmall { width, height });
        }
        if width > MAX_WIDTH {
            return Err(ConfigError::BoardTooLarge { width, height });
        }
        if self.warps % 2 != 0 {
            return Err(ConfigError::OddWarpCount { warps: self.warps });
        }
        if self.balls == 0 {
            return Err(ConfigError::NoBalls);
        }
        let requested = u64::from(self.balls)
            + u64::from(self.sticky)
            + u64::from(self.warps)
            + u64::from(width) * u64::from(self.resolved_brick_rows());
        let capacity = u64::from(width) * u64::from(height - 2);
        // Strictly below capacity so random placement always finds a cell.
        if requested >= capacity {
            return Err(ConfigError::TooManyObjects {
                requested: requested as usize,
                capacity: capacity as usize,
            });
        }
        Ok(())
    }

    /// Generate a concrete board description from `seed`.
    pub fn generate(&self, seed: u64) -> Result<BoardConfig, ConfigError> {
        self.validate()?;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let (w, h) = (self.width as i32, self.height as i32);
        let mut taken = vec![false; (self.width as usize) * (self.height as usize)];
        let mut cfg = BoardConfig::new(self.width, self.height);

        let rows = self.resolved_brick_rows() as i32;
        for row in 0..rows {
            cfg.obstacle_rows.push(ObstacleRow {
                row,
                strength: ((rows - row - 1) / 2 + 1) as u32,
            });
            taken[(row * w) as usize..((row + 1) * w) as usize].fill(true);
        }

        if self.paddle {
            cfg.trash = (0..w).map(|x| Pos::new(x, h - 1)).collect();
            cfg.paddle = Some(PaddleConfig {
                left: 0,
                row: h - 2,
                width: PADDLE_WIDTH.min(self.width),
            });
        }

        let free_cell = |rng: &mut ChaCha8Rng, taken: &mut [bool]| loop {
            let pos = Pos::new(rng.random_range(0..w), rng.random_range(0..h - 2));
            let slot = &mut taken[(pos.y * w + pos.x) as usize];
            if !*slot {
                *slot = true;
                break pos;
            }
        };

        let sticky: Vec<Pos> = (0..self.sticky)
            .map(|_| free_cell(&mut rng, &mut taken))
            .collect();
        for _ in 0..self.warps / 2 {
            let a = free_cell(&mut rng, &mut taken);
            let b = free_cell(&mut rng, &mut taken);
            cfg.warps.push((a, b));
        }

        // Balls may land on sticky cells, so release those first.
        for p in &sticky {
            taken[(p.y * w + p.x) as usize] = false;
        }
        for _ in 0..self.balls {
            let pos = free_cell(&mut rng, &mut taken);
            let vel = Velocity::new(
                if rng.random_bool(0.5) { 1 } else { -1 },
                if rng.random_bool(0.5) { 1 } else { -1 },
            );
            cfg.balls.push(BallConfig { pos, vel });
        }
        cfg.sticky = sticky;
        Ok(cfg)
    }
}
