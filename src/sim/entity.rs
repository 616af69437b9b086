//! Energy sources and unstable nodes
//!
//! Sources and Nodes are separate types: only Nodes carry energy. The
//! tagged [`Entity`] view lets a view layer walk both uniformly.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::grid::CellPos;

/// An always-on energy source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    /// Grid cell the source is anchored to
    pub cell: CellPos,
    /// World position it was placed at
    pub world: Vec2,
}

impl Source {
    pub fn new(cell: CellPos, world: Vec2) -> Self {
        Self { cell, world }
    }
}

/// A node that needs stabilizing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub cell: CellPos,
    pub world: Vec2,
    energy: f32,
    max_energy: f32,
}

impl Node {
    /// New node at full energy
    pub fn new(cell: CellPos, world: Vec2, max_energy: f32) -> Self {
        Self {
            cell,
            world,
            energy: max_energy,
            max_energy,
        }
    }

    pub fn energy(&self) -> f32 {
        self.energy
    }

    pub fn max_energy(&self) -> f32 {
        self.max_energy
    }

    /// Still needs stabilizing
    pub fn is_active(&self) -> bool {
        self.energy > 0.0
    }

    /// Drain energy, floored at zero. Returns false on an inactive node.
    fn drain(&mut self, amount: f32) -> bool {
        if !self.is_active() {
            return false;
        }
        self.energy = (self.energy - amount).max(0.0);
        true
    }
}

/// Borrowed, tagged view of either entity kind
#[derive(Debug, Clone, Copy)]
pub enum Entity<'a> {
    Source(&'a Source),
    Node(&'a Node),
}

impl Entity<'_> {
    pub fn cell(&self) -> CellPos {
        match self {
            Entity::Source(s) => s.cell,
            Entity::Node(n) => n.cell,
        }
    }

    pub fn world(&self) -> Vec2 {
        match self {
            Entity::Source(s) => s.world,
            Entity::Node(n) => n.world,
        }
    }

    /// Sources are always active; nodes while they hold energy
    pub fn is_active(&self) -> bool {
        match self {
            Entity::Source(_) => true,
            Entity::Node(n) => n.is_active(),
        }
    }
}

/// All sources and nodes of a session, in stable order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityField {
    sources: Vec<Source>,
    nodes: Vec<Node>,
}

impl EntityField {
    pub fn new(sources: Vec<Source>, nodes: Vec<Node>) -> Self {
        Self { sources, nodes }
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn for_each_source(&self, mut f: impl FnMut(usize, &Source)) {
        for (i, source) in self.sources.iter().enumerate() {
            f(i, source);
        }
    }

    pub fn for_each_node(&self, mut f: impl FnMut(usize, &Node)) {
        for (i, node) in self.nodes.iter().enumerate() {
            f(i, node);
        }
    }

    /// Sources first, then nodes
    pub fn entities(&self) -> impl Iterator<Item = Entity<'_>> {
        self.sources
            .iter()
            .map(Entity::Source)
            .chain(self.nodes.iter().map(Entity::Node))
    }

    /// Reduce a node's energy by `amount` (floored at zero).
    ///
    /// Returns true if the node was active and got drained; inactive nodes
    /// and unknown indices are left alone.
    pub fn stabilize(&mut self, node_index: usize, amount: f32) -> bool {
        debug_assert!(amount >= 0.0, "stabilize amount must be non-negative");
        self.nodes
            .get_mut(node_index)
            .is_some_and(|node| node.drain(amount))
    }

    pub fn active_node_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_active()).count()
    }

    pub fn all_nodes_inactive(&self) -> bool {
        self.nodes.iter().all(|n| !n.is_active())
    }
}
