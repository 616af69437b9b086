//! Puzzle configuration
//!
//! Loaded from JSON; any field left out takes the reference value.

use std::fs;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{ConfigError, EntityKind};
use crate::sim::{CellPos, ConnectivityRule, EntityField, Node, Source};
use crate::{cell_to_world, world_to_cell};

/// Where an entity is placed: a grid cell, or a world position mapped onto one
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Anchor {
    Cell(CellPos),
    World(Vec2),
}

impl Anchor {
    pub fn cell(row: usize, col: usize) -> Self {
        Anchor::Cell(CellPos::new(row, col))
    }

    pub fn world(x: f32, y: f32) -> Self {
        Anchor::World(Vec2::new(x, y))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PuzzleConfig {
    pub rows: usize,
    pub cols: usize,
    /// Starting (and maximum) node energy
    pub max_energy: f32,
    /// Overload cap; reaching it loses the session
    pub max_load: f32,
    /// Overload level that raises a warning event
    pub warning_load: f32,
    /// Load per second per active node
    pub passive_load_rate: f32,
    /// Load per node stabilized by a surge
    pub surge_load_per_node: f32,
    /// Energy drained from each node a surge reaches
    pub surge_stabilize_amount: f32,
    pub initial_sources: Vec<Anchor>,
    pub initial_nodes: Vec<Anchor>,
    /// World position of the grid's top-left corner
    pub grid_origin: Vec2,
    /// World size of one cell
    pub cell_size: f32,
    pub connectivity: ConnectivityRule,
    /// Ignore placement and surges once the session is won or lost
    pub lock_when_resolved: bool,
}

/// The reference layout: a 5x5 grid, one source at (0,0), nodes at (2,2) and (3,3).
///
/// No node shares a row or column with the source, so this layout can only be
/// solved under [`ConnectivityRule::Legacy`].
impl Default for PuzzleConfig {
    fn default() -> Self {
        Self {
            rows: GRID_ROWS,
            cols: GRID_COLS,
            max_energy: MAX_ENERGY,
            max_load: MAX_LOAD,
            warning_load: WARNING_LOAD,
            passive_load_rate: PASSIVE_LOAD_RATE,
            surge_load_per_node: SURGE_LOAD_PER_NODE,
            surge_stabilize_amount: SURGE_STABILIZE_AMOUNT,
            initial_sources: vec![Anchor::world(250.0, 150.0)],
            initial_nodes: vec![Anchor::world(350.0, 250.0), Anchor::world(400.0, 300.0)],
            grid_origin: Vec2::new(GRID_ORIGIN_X, GRID_ORIGIN_Y),
            cell_size: CELL_SIZE,
            connectivity: ConnectivityRule::Aligned,
            lock_when_resolved: false,
        }
    }
}

impl PuzzleConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: PuzzleConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&contents)?;
        log::info!("Loaded puzzle config from {}", path.display());
        Ok(config)
    }

    /// Check dimensions, rates and that every anchor lands on the grid
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.build_field().map(|_| ())
    }

    /// Resolve anchors into a fresh entity field (nodes at full energy)
    pub fn build_field(&self) -> Result<EntityField, ConfigError> {
        let cells = self.rows.checked_mul(self.cols).unwrap_or(usize::MAX);
        if cells == 0 || cells > MAX_CELLS {
            return Err(ConfigError::InvalidDimensions {
                rows: self.rows,
                cols: self.cols,
            });
        }

        let values = [
            ("max_energy", self.max_energy),
            ("max_load", self.max_load),
            ("warning_load", self.warning_load),
            ("passive_load_rate", self.passive_load_rate),
            ("surge_load_per_node", self.surge_load_per_node),
            ("surge_stabilize_amount", self.surge_stabilize_amount),
            ("cell_size", self.cell_size),
        ];
        for (field, value) in values {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidValue { field, value });
            }
        }
        if self.warning_load > self.max_load {
            return Err(ConfigError::InvalidValue {
                field: "warning_load",
                value: self.warning_load,
            });
        }
        if self.cell_size == 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "cell_size",
                value: self.cell_size,
            });
        }

        if self.initial_sources.is_empty() {
            return Err(ConfigError::NoSources);
        }
        if self.initial_nodes.is_empty() {
            return Err(ConfigError::NoNodes);
        }

        let sources = self
            .initial_sources
            .iter()
            .enumerate()
            .map(|(i, anchor)| {
                let (cell, world) = self.resolve(EntityKind::Source, i, *anchor)?;
                Ok(Source::new(cell, world))
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        let nodes = self
            .initial_nodes
            .iter()
            .enumerate()
            .map(|(i, anchor)| {
                let (cell, world) = self.resolve(EntityKind::Node, i, *anchor)?;
                Ok(Node::new(cell, world, self.max_energy))
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(EntityField::new(sources, nodes))
    }

    fn resolve(
        &self,
        kind: EntityKind,
        index: usize,
        anchor: Anchor,
    ) -> Result<(CellPos, Vec2), ConfigError> {
        let (row, col, world) = match anchor {
            Anchor::Cell(pos) => (
                pos.row as i64,
                pos.col as i64,
                cell_to_world(pos, self.grid_origin, self.cell_size),
            ),
            Anchor::World(world) => {
                let (row, col) = world_to_cell(world, self.grid_origin, self.cell_size);
                (row, col, world)
            }
        };

        let in_bounds =
            (0..self.rows as i64).contains(&row) && (0..self.cols as i64).contains(&col);
        if !in_bounds {
            return Err(ConfigError::AnchorOutOfBounds {
                kind,
                index,
                row,
                col,
            });
        }
        Ok((CellPos::new(row as usize, col as usize), world))
    }
}
