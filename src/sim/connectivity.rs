//! Surge connectivity
//!
//! Decides which nodes a surge reaches. This is a first-hop test, not a
//! path search: only the glyph on the source's own cell (and, for straight
//! glyphs, the glyph on the node's cell) matters. That keeps every surge
//! O(sources × nodes) and the puzzle readable at a glance.

use serde::{Deserialize, Serialize};

use super::entity::EntityField;
use super::grid::{Cell, CellPos, Grid};

/// Which variant of the first-hop test to apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConnectivityRule {
    /// Straight glyphs require the node on the same row (H) or column (V)
    #[default]
    Aligned,
    /// Straight glyphs only compare the forward coordinate: a Horizontal
    /// source reaches any node to its right whose column on the source row
    /// holds a Horizontal glyph, even on another row (likewise for Vertical)
    Legacy,
}

/// A (source, node) pair reached by a surge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub source: usize,
    pub node: usize,
}

/// First-hop reachability from a source cell to a node cell
pub fn first_hop_connected(
    grid: &Grid,
    rule: ConnectivityRule,
    source: CellPos,
    node: CellPos,
) -> bool {
    if source == node {
        return true;
    }

    let aligned = rule == ConnectivityRule::Aligned;
    match grid.get(source) {
        Cell::Horizontal => {
            (!aligned || source.row == node.row)
                && source.col < node.col
                && grid.get(CellPos::new(source.row, node.col)) == Cell::Horizontal
        }
        Cell::Vertical => {
            (!aligned || source.col == node.col)
                && source.row < node.row
                && grid.get(CellPos::new(node.row, source.col)) == Cell::Vertical
        }
        Cell::Cross => source.col == node.col || source.row == node.row,
        Cell::Empty => false,
    }
}

/// Read-only resolver over the current grid and entities.
///
/// Nothing is cached: build one per surge so grid edits are picked up.
#[derive(Debug, Clone, Copy)]
pub struct ConnectivityResolver<'a> {
    grid: &'a Grid,
    field: &'a EntityField,
    rule: ConnectivityRule,
}

impl<'a> ConnectivityResolver<'a> {
    pub fn new(grid: &'a Grid, field: &'a EntityField, rule: ConnectivityRule) -> Self {
        Self { grid, field, rule }
    }

    /// Is node `node` reachable from source `source`? Unknown indices are not.
    pub fn is_connected(&self, source: usize, node: usize) -> bool {
        match (self.field.sources().get(source), self.field.nodes().get(node)) {
            (Some(s), Some(n)) => first_hop_connected(self.grid, self.rule, s.cell, n.cell),
            _ => false,
        }
    }

    /// All connected pairs, source-major. Lazy and restartable via `clone()`.
    pub fn connections(self) -> impl Iterator<Item = Connection> + Clone + 'a {
        let node_count = self.field.nodes().len();
        (0..self.field.sources().len())
            .flat_map(move |source| (0..node_count).map(move |node| Connection { source, node }))
            .filter(move |c| self.is_connected(c.source, c.node))
    }

    /// Active nodes reached by at least one source, each listed once
    pub fn energized_nodes(self) -> Vec<usize> {
        self.field
            .nodes()
            .iter()
            .enumerate()
            .filter(|(_, node)| node.is_active())
            .filter(|&(node, _)| (0..self.field.sources().len()).any(|s| self.is_connected(s, node)))
            .map(|(node, _)| node)
            .collect()
    }
}
