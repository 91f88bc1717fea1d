pub mod camera;
pub mod config;
pub mod engine;
pub mod grid;
pub mod life;
pub mod state;

pub mod prelude {
    use bevy::{color::Color, math::Vec2};

    pub const MIN_STEP_RATE: u32 = 1;
    pub const MAX_STEP_RATE: u32 = 128;

    pub const DEFAULT_COLUMNS: u32 = 80;
    pub const DEFAULT_ROWS: u32 = 60;
    pub const DEFAULT_CELL_SIZE: u32 = 10;
    pub const DEFAULT_STEP_RATE: u32 = 8;
    pub const DEFAULT_SEED_PROBABILITY: f64 = 0.2;

    pub const BOARD_POS: Vec2 = Vec2::ZERO;
    /// Cells cover 0.8 of their footprint; the rest shows the backdrop as
    /// grid lines.
    pub const CELL_SCALE: Vec2 = Vec2::splat(0.8);

    pub const BG_COLOR: Color = Color::srgb(0.05, 0.05, 0.05);
    /// dimgray
    pub const GRID_LINE_COLOR: Color = Color::srgb(0.41, 0.41, 0.41);
    /// forestgreen
    pub const CELL_ALIVE_COLOR: Color = Color::srgb(0.13, 0.55, 0.13);
    pub const CELL_DEAD_COLOR: Color = Color::BLACK;
}
