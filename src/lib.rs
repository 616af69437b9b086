//! Glyph Surge - a grid routing puzzle
//!
//! Core modules:
//! - `sim`: Deterministic puzzle simulation (grid, entities, connectivity, overload, session)
//! - `config`: Data-driven puzzle layout and balance
//! - `error`: Configuration and precondition errors

pub mod config;
pub mod error;
pub mod sim;

pub use config::{Anchor, PuzzleConfig};
pub use error::{ConfigError, PreconditionError};

use glam::Vec2;

use crate::sim::CellPos;

/// Reference puzzle constants
pub mod consts {
    /// Grid dimensions
    pub const GRID_ROWS: usize = 5;
    pub const GRID_COLS: usize = 5;
    /// Upper bound on rows * cols for configured grids
    pub const MAX_CELLS: usize = 1 << 20;

    /// World-space layout of the grid (top-left corner, cell edge length)
    pub const GRID_ORIGIN_X: f32 = 250.0;
    pub const GRID_ORIGIN_Y: f32 = 150.0;
    pub const CELL_SIZE: f32 = 50.0;

    /// Node energy at spawn
    pub const MAX_ENERGY: f32 = 100.0;

    /// Overload cap and warning level
    pub const MAX_LOAD: f32 = 100.0;
    pub const WARNING_LOAD: f32 = 80.0;

    /// Overload per second per active node
    pub const PASSIVE_LOAD_RATE: f32 = 2.0;
    /// Overload per node stabilized by a surge
    pub const SURGE_LOAD_PER_NODE: f32 = 10.0;
    /// Energy drained per surge hit
    pub const SURGE_STABILIZE_AMOUNT: f32 = 50.0;

    /// Default frame step for scripted runs (60 Hz)
    pub const FRAME_DT: f32 = 1.0 / 60.0;
}

/// Map a world position to a (row, col) cell index.
///
/// Signed so callers can report positions left of or above the grid.
#[inline]
pub fn world_to_cell(world: Vec2, origin: Vec2, cell_size: f32) -> (i64, i64) {
    let local = (world - origin) / cell_size;
    (local.y.floor() as i64, local.x.floor() as i64)
}

/// World position of a cell's top-left corner
#[inline]
pub fn cell_to_world(pos: CellPos, origin: Vec2, cell_size: f32) -> Vec2 {
    origin + Vec2::new(pos.col as f32, pos.row as f32) * cell_size
}
