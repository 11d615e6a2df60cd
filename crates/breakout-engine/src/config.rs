//! Board and run configuration, validation, and error types.
//!
//! [`BoardConfig`] describes what goes on the board; [`build()`](BoardConfig::build)
//! validates it and lays out a fresh [`Board`]. [`RunConfig`] controls how
//! the workers are scheduled and paced once the board exists.

use std::error::Error;
use std::fmt;
use std::time::Duration;

use breakout_board::board::MAX_SIDE;
use breakout_board::{Board, Paddle, PlacementError};
use breakout_core::{CellKind, Pos, Velocity};
use log::warn;

/// Widest board accepted.
pub const MAX_WIDTH: u32 = 1024;

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while validating a configuration or starting a world.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Width or height is below 2.
    BoardTooSmall {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
    /// Width exceeds [`MAX_WIDTH`] or height exceeds the board's limit.
    BoardTooLarge {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
    /// The requested objects cannot fit on the board.
    TooManyObjects {
        /// Cells the objects need.
        requested: usize,
        /// Cells available to them.
        capacity: usize,
    },
    /// An object was placed off the board.
    OutOfBounds {
        /// The offending position.
        pos: Pos,
    },
    /// Two objects were placed on the same cell.
    Overlap {
        /// The contested position.
        pos: Pos,
    },
    /// A ball velocity is zero or has a component outside `{-1, 0, 1}`.
    InvalidVelocity {
        /// The rejected velocity.
        vel: Velocity,
    },
    /// Warp endpoints come in pairs; an odd count was requested.
    OddWarpCount {
        /// The requested endpoint count.
        warps: u32,
    },
    /// At least one ball is required.
    NoBalls,
    /// The paddle does not fit its row.
    InvalidPaddle {
        /// Description of the problem.
        reason: String,
    },
    /// Cooperative scheduling cannot run warp tunnels.
    WarpsUnsupported {
        /// Number of warp endpoints on the board.
        warps: usize,
    },
    /// Any other placement failure.
    Placement(PlacementError),
    /// A worker thread could not be spawned.
    ThreadSpawnFailed {
        /// Description of which thread failed.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BoardTooSmall { width, height } => {
                write!(f, "board {width}x{height} is smaller than 2x2")
            }
            Self::BoardTooLarge { width, height } => write!(
                f,
                "board {width}x{height} exceeds {MAX_WIDTH}x{MAX_SIDE}"
            ),
            Self::TooManyObjects {
                requested,
                capacity,
            } => write!(
                f,
                "objects need {requested} cells but only {capacity} are available"
            ),
            Self::OutOfBounds { pos } => write!(f, "position {pos} is off the board"),
            Self::Overlap { pos } => write!(f, "two objects placed at {pos}"),
            Self::InvalidVelocity { vel } => {
                write!(f, "velocity {vel} must be nonzero with unit components")
            }
            Self::OddWarpCount { warps } => {
                write!(f, "warp endpoints come in pairs, got {warps}")
            }
            Self::NoBalls => write!(f, "at least one ball is required"),
            Self::InvalidPaddle { reason } => write!(f, "invalid paddle: {reason}"),
            Self::WarpsUnsupported { warps } => write!(
                f,
                "cooperative mode cannot run warp tunnels ({warps} endpoints configured)"
            ),
            Self::Placement(e) => write!(f, "placement: {e}"),
            Self::ThreadSpawnFailed { reason } => {
                write!(f, "thread spawn failed: {reason}")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Placement(e) => Some(e),
            _ => None,
        }
    }
}

impl From<PlacementError> for ConfigError {
    fn from(e: PlacementError) -> Self {
        match e {
            PlacementError::OutOfBounds { pos } => Self::OutOfBounds { pos },
            PlacementError::Occupied { pos, .. } | PlacementError::DegenerateWarp { pos } => {
                Self::Overlap { pos }
            }
            PlacementError::InvalidVelocity { vel } => Self::InvalidVelocity { vel },
            other => Self::Placement(other),
        }
    }
}

// ── BoardConfig ────────────────────────────────────────────────────

/// A full row of bricks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ObstacleRow {
    /// Row index.
    pub row: i32,
    /// Hits each brick absorbs before breaking. `0` is indestructible.
    pub strength: u32,
}

/// Paddle placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaddleConfig {
    /// Initial leftmost column.
    pub left: i32,
    /// The row the paddle slides along. Nothing but balls may share it.
    pub row: i32,
    /// Width in cells.
    pub width: u32,
}

/// A ball's starting state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BallConfig {
    /// Starting cell: empty or sticky, never a paddle cell.
    pub pos: Pos,
    /// Starting velocity: nonzero, unit components.
    pub vel: Velocity,
}

impl BallConfig {
    /// Shorthand for `BallConfig { pos: (x, y), vel: (dx, dy) }`.
    pub fn new(x: i32, y: i32, dx: i32, dy: i32) -> Self {
        Self {
            pos: Pos::new(x, y),
            vel: Velocity::new(dx, dy),
        }
    }
}

/// Everything placed on a board before the simulation starts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BoardConfig {
    /// Board width.
    pub width: u32,
    /// Board height.
    pub height: u32,
    /// Brick rows, filled edge to edge.
    pub obstacle_rows: Vec<ObstacleRow>,
    /// Sticky cells.
    pub sticky: Vec<Pos>,
    /// Trash cells.
    pub trash: Vec<Pos>,
    /// Warp tunnels; each pair is linked in both directions.
    pub warps: Vec<(Pos, Pos)>,
    /// Optional paddle.
    pub paddle: Option<PaddleConfig>,
    /// Balls, in the order their handles are issued.
    pub balls: Vec<BallConfig>,
}

/// A laid-out board, ready to hand to a scheduler.
#[derive(Debug)]
pub struct BoardSetup {
    /// The board with every object in place.
    pub board: Board,
    /// The paddle, already painted onto its row.
    pub paddle: Option<Paddle>,
}

impl BoardConfig {
    /// An empty `width x height` board description.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Check dimensions, counts and velocities.
    ///
    /// Overlaps between individual objects are only detected by
    /// [`build()`](Self::build), which places them one by one.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (width, height) = (self.width, self.height);
        // 1. Dimensions.
        if width < 2 || height < 2 {
            return Err(ConfigError::BoardTooSmall { width, height });
        }
        if width > MAX_WIDTH || height > MAX_SIDE {
            return Err(ConfigError::BoardTooLarge { width, height });
        }
        // 2. At least one ball, each with a legal velocity.
        if self.balls.is_empty() {
            return Err(ConfigError::NoBalls);
        }
        if let Some(ball) = self
            .balls
            .iter()
            .find(|b| !b.vel.is_unit() || b.vel.is_zero())
        {
            return Err(ConfigError::InvalidVelocity { vel: ball.vel });
        }
        // 3. Brick rows and paddle lie on the board.
        for r in &self.obstacle_rows {
            if r.row < 0 || r.row >= height as i32 {
                return Err(ConfigError::OutOfBounds {
                    pos: Pos::new(0, r.row),
                });
            }
        }
        if let Some(p) = &self.paddle {
            if p.width == 0 {
                return Err(ConfigError::InvalidPaddle {
                    reason: "width must be at least 1".into(),
                });
            }
            if p.row < 0
                || p.row >= height as i32
                || p.left < 0
                || i64::from(p.left) + i64::from(p.width) > i64::from(width)
            {
                return Err(ConfigError::InvalidPaddle {
                    reason: format!(
                        "columns {}..{} on row {} do not fit a {width}x{height} board",
                        p.left,
                        i64::from(p.left) + i64::from(p.width),
                        p.row
                    ),
                });
            }
        }
        // 4. Counts. Balls may rest on sticky cells; nothing else shares.
        let capacity = (width as usize) * (height as usize);
        let fixed = self.trash.len()
            + 2 * self.warps.len()
            + (width as usize) * self.obstacle_rows.len()
            + self.paddle.map_or(0, |p| p.width as usize);
        let requested = fixed + self.sticky.len() + self.balls.len();
        if fixed + self.sticky.len() > capacity || fixed + self.balls.len() > capacity {
            return Err(ConfigError::TooManyObjects {
                requested,
                capacity,
            });
        }
        Ok(())
    }

    /// Validate, then place every object on a fresh board.
    ///
    /// Placement order: brick rows, sticky cells, trash cells, warp pairs,
    /// paddle, balls. The paddle row must hold nothing but the paddle.
    pub fn build(&self) -> Result<BoardSetup, ConfigError> {
        self.place().inspect_err(|e| warn!("board configuration rejected: {e}"))
    }

    fn place(&self) -> Result<BoardSetup, ConfigError> {
        self.validate()?;
        let mut board = Board::new(self.width, self.height)?;

        for r in &self.obstacle_rows {
            for x in 0..self.width as i32 {
                board.set_obstacle(Pos::new(x, r.row), r.strength)?;
            }
        }
        for &pos in &self.sticky {
            board.set_kind(pos, CellKind::Sticky)?;
        }
        for &pos in &self.trash {
            board.set_kind(pos, CellKind::Trash)?;
        }
        for &(a, b) in &self.warps {
            board.add_warp_pair(a, b)?;
        }

        let paddle = match self.paddle {
            Some(p) => {
                for x in 0..self.width as i32 {
                    if board.cell(x, p.row).read().kind != CellKind::Empty {
                        return Err(ConfigError::Overlap {
                            pos: Pos::new(x, p.row),
                        });
                    }
                }
                let paddle = Paddle::new(&board, p.left, p.row, p.width)?;
                paddle.paint(&board);
                Some(paddle)
            }
            None => None,
        };

        for ball in &self.balls {
            board.place_ball(ball.pos, ball.vel)?;
        }
        Ok(BoardSetup { board, paddle })
    }
}

// ── RunConfig ──────────────────────────────────────────────────────

/// How workers are scheduled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SchedulerMode {
    /// One thread per ball, per warp endpoint, and for the paddle.
    #[default]
    Parallel,
    /// One thread moving every ball in turn. No warps.
    Cooperative,
}

/// Scheduling and pacing for a running world.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunConfig {
    /// Scheduling mode. Default: parallel.
    pub mode: SchedulerMode,
    /// Pause after each successful move (parallel) or each full pass
    /// (cooperative). Default: none.
    pub move_delay: Duration,
    /// How long a ball stays inside a warp tunnel. Default: 200 ms.
    pub warp_delay: Duration,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            mode: SchedulerMode::Parallel,
            move_delay: Duration::ZERO,
            warp_delay: Duration::from_millis(200),
        }
    }
}

impl RunConfig {
    /// The paddle moves twice as often as the balls.
    pub fn paddle_delay(&self) -> Duration {
        self.move_delay / 2
    }
}
