use std::fmt;

use bevy::{
    math::Vec2,
    prelude::{KeyCode, Resource},
};
use clap::Parser;

use crate::{engine::StepperKind, grid::Layout, prelude::*};

/// Command-line arguments for launching the simulation.
#[derive(Debug, Parser)]
#[command(author, version, about = "Conway's Game of Life on a fixed grid")]
pub struct CliArgs {
    /// Number of cell columns in the grid.
    #[arg(
        long,
        value_name = "COLUMNS",
        default_value_t = DEFAULT_COLUMNS,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub columns: u32,
    /// Number of cell rows in the grid.
    #[arg(
        long,
        value_name = "ROWS",
        default_value_t = DEFAULT_ROWS,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub rows: u32,
    /// Edge length of a rendered cell in pixels.
    #[arg(
        long,
        value_name = "PIXELS",
        default_value_t = DEFAULT_CELL_SIZE,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub cell_size: u32,
    /// Initial generations per second.
    #[arg(
        long,
        value_name = "RATE",
        default_value_t = DEFAULT_STEP_RATE,
        value_parser = clap::value_parser!(u32).range((MIN_STEP_RATE as i64)..=(MAX_STEP_RATE as i64))
    )]
    pub rate: u32,
    /// Probability that a cell starts alive when the grid is seeded.
    #[arg(long, value_name = "PROBABILITY", default_value_t = DEFAULT_SEED_PROBABILITY)]
    pub fill: f64,
    /// Which stepping implementation advances the grid.
    #[arg(long, value_enum, default_value_t = StepperKind::Scalar)]
    pub stepper: StepperKind,
}

/// A rejected startup configuration. Reported before any simulation runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    Dimensions { rows: usize, columns: usize },
    CellSize(u32),
    SeedProbability(f64),
    StepRate(u32),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Dimensions { rows, columns } => {
                write!(f, "grid dimensions must be at least 1x1, got {rows}x{columns}")
            }
            Self::CellSize(px) => write!(f, "cell size must be positive, got {px}"),
            Self::SeedProbability(p) => {
                write!(f, "seed probability must lie in [0, 1], got {p}")
            }
            Self::StepRate(rate) => write!(
                f,
                "step rate must lie in [{MIN_STEP_RATE}, {MAX_STEP_RATE}], got {rate}"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Keyboard commands, resolved once at startup.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    pub pause: KeyCode,
    pub clear: KeyCode,
    pub reinitialize: KeyCode,
    pub faster: KeyCode,
    pub slower: KeyCode,
    pub quit: KeyCode,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            pause: KeyCode::Space,
            clear: KeyCode::KeyC,
            reinitialize: KeyCode::KeyR,
            faster: KeyCode::ArrowRight,
            slower: KeyCode::ArrowLeft,
            quit: KeyCode::Escape,
        }
    }
}

/// Validated startup configuration, shared with every system as a resource.
#[derive(Resource, Debug, Clone)]
pub struct Settings {
    pub rows: usize,
    pub columns: usize,
    pub cell_size: u32,
    pub step_rate: u32,
    pub seed_probability: f64,
    pub stepper: StepperKind,
    pub keys: KeyBindings,
}

impl Settings {
    pub fn new(
        rows: usize,
        columns: usize,
        cell_size: u32,
        step_rate: u32,
        seed_probability: f64,
        stepper: StepperKind,
    ) -> Result<Self, ConfigError> {
        if rows == 0 || columns == 0 {
            return Err(ConfigError::Dimensions { rows, columns });
        }
        if cell_size == 0 {
            return Err(ConfigError::CellSize(cell_size));
        }
        if !(0.0..=1.0).contains(&seed_probability) {
            return Err(ConfigError::SeedProbability(seed_probability));
        }
        if !(MIN_STEP_RATE..=MAX_STEP_RATE).contains(&step_rate) {
            return Err(ConfigError::StepRate(step_rate));
        }
        Ok(Self {
            rows,
            columns,
            cell_size,
            step_rate,
            seed_probability,
            stepper,
            keys: KeyBindings::default(),
        })
    }

    /// Window size in pixels: exactly the board footprint.
    pub fn window_resolution(&self) -> Vec2 {
        Vec2::new(
            self.columns as f32 * self.cell_size as f32,
            self.rows as f32 * self.cell_size as f32,
        )
    }

    pub fn layout(&self) -> Layout {
        Layout {
            center: BOARD_POS,
            rows: self.rows,
            columns: self.columns,
            cell_edge: self.cell_size as f32,
        }
    }
}

impl TryFrom<CliArgs> for Settings {
    type Error = ConfigError;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        Self::new(
            args.rows as usize,
            args.columns as usize,
            args.cell_size,
            args.rate,
            args.fill,
            args.stepper,
        )
    }
}
