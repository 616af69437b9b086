//! Error types
//!
//! Only configuration and frame input can be rejected. Once a session is
//! built every command is total.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Which kind of entity an anchor belongs to (for error messages)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Source,
    Node,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Source => f.write_str("source"),
            EntityKind::Node => f.write_str("node"),
        }
    }
}

/// Invalid puzzle configuration, reported when a session is built
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("grid must be non-empty and at most {} cells (got {rows}x{cols})", crate::consts::MAX_CELLS)]
    InvalidDimensions { rows: usize, cols: usize },
    #[error("puzzle needs at least one source")]
    NoSources,
    #[error("puzzle needs at least one node")]
    NoNodes,
    #[error("{field} is out of range (got {value})")]
    InvalidValue { field: &'static str, value: f32 },
    #[error("{kind} {index} anchored at ({row}, {col}) lies outside the grid")]
    AnchorOutOfBounds {
        kind: EntityKind,
        index: usize,
        row: i64,
        col: i64,
    },
    #[error("failed to parse JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Rejected per-frame input
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum PreconditionError {
    #[error("time delta must be finite and non-negative (got {0})")]
    InvalidDelta(f32),
}
