//! Puzzle session state machine
//!
//! A session owns the grid, entities and overload meter outright. Views get
//! borrows or an owned [`SessionSnapshot`].

use serde::{Deserialize, Serialize};

use super::connectivity::ConnectivityResolver;
use super::entity::EntityField;
use super::grid::{Cell, CellPos, Glyph, Grid};
use super::overload::{OverloadEvent, OverloadModel};
use crate::config::PuzzleConfig;
use crate::error::{ConfigError, PreconditionError};

/// Session outcome; anything but InProgress is terminal until reset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Outcome {
    #[default]
    InProgress,
    /// Every node drained (win)
    Stabilized,
    /// Overload hit the cap (loss)
    Overloaded,
}

impl Outcome {
    pub fn is_terminal(self) -> bool {
        self != Outcome::InProgress
    }
}

/// Cursor movement direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Things a view may want to react to (sounds, flashes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEvent {
    GlyphPlaced { pos: CellPos, glyph: Glyph },
    /// A surge fired; `stabilized` nodes were reached
    Surge { stabilized: usize },
    NodeStabilized { node: usize },
    Overload(OverloadEvent),
    OutcomeChanged(Outcome),
    Reset,
}

/// Result of a single surge
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurgeReport {
    /// Indices of nodes drained by this surge
    pub stabilized: Vec<usize>,
}

/// Read-only copy of a node for views
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeView {
    pub cell: CellPos,
    pub energy: f32,
    pub active: bool,
}

/// Everything a view needs to draw one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub rows: usize,
    pub cols: usize,
    /// Row-major
    pub cells: Vec<Cell>,
    pub cursor: CellPos,
    pub sources: Vec<CellPos>,
    pub nodes: Vec<NodeView>,
    pub load: f32,
    pub max_load: f32,
    pub outcome: Outcome,
    pub elapsed: f64,
}

impl SessionSnapshot {
    pub fn cell(&self, pos: CellPos) -> Cell {
        self.cells[pos.row * self.cols + pos.col]
    }
}

#[derive(Debug, Clone)]
pub struct PuzzleSession {
    config: PuzzleConfig,
    /// Entities as spawned, restored on reset
    initial_field: EntityField,
    grid: Grid,
    field: EntityField,
    overload: OverloadModel,
    cursor: CellPos,
    outcome: Outcome,
    /// Simulated seconds since the last reset
    elapsed: f64,
    /// Frames advanced since the last reset
    ticks: u64,
    events: Vec<SessionEvent>,
}

impl PuzzleSession {
    /// Build a session, rejecting configs with bad values or off-grid anchors
    pub fn new(config: PuzzleConfig) -> Result<Self, ConfigError> {
        let initial_field = config.build_field()?;
        log::info!(
            "New puzzle session: {}x{} grid, {} sources, {} nodes",
            config.rows,
            config.cols,
            initial_field.sources().len(),
            initial_field.nodes().len()
        );

        Ok(Self {
            grid: Grid::new(config.rows, config.cols),
            field: initial_field.clone(),
            overload: overload_for(&config),
            initial_field,
            config,
            cursor: CellPos::default(),
            outcome: Outcome::InProgress,
            elapsed: 0.0,
            ticks: 0,
            events: Vec::new(),
        })
    }

    pub fn config(&self) -> &PuzzleConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn field(&self) -> &EntityField {
        &self.field
    }

    pub fn overload(&self) -> &OverloadModel {
        &self.overload
    }

    pub fn cursor(&self) -> CellPos {
        self.cursor
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Resolver over the current grid, for previews
    pub fn connectivity(&self) -> ConnectivityResolver<'_> {
        ConnectivityResolver::new(&self.grid, &self.field, self.config.connectivity)
    }

    /// Take queued events, oldest first
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    fn input_locked(&self) -> bool {
        self.config.lock_when_resolved && self.outcome.is_terminal()
    }

    /// Move the cursor one cell, staying inside the grid
    pub fn move_cursor(&mut self, direction: Direction) {
        let CellPos { row, col } = self.cursor;
        self.cursor = match direction {
            Direction::Up => CellPos::new(row.saturating_sub(1), col),
            Direction::Down => CellPos::new((row + 1).min(self.grid.rows() - 1), col),
            Direction::Left => CellPos::new(row, col.saturating_sub(1)),
            Direction::Right => CellPos::new(row, (col + 1).min(self.grid.cols() - 1)),
        };
    }

    /// Write a glyph under the cursor
    pub fn place_glyph(&mut self, glyph: Glyph) {
        if self.input_locked() {
            return;
        }
        self.grid.set(self.cursor, glyph.into());
        log::debug!(
            "Placed {:?} at ({}, {})",
            glyph,
            self.cursor.row,
            self.cursor.col
        );
        self.events.push(SessionEvent::GlyphPlaced {
            pos: self.cursor,
            glyph,
        });
    }

    /// Fire a surge: every active node reached by any source is drained once,
    /// and overload rises once per drained node.
    pub fn surge(&mut self) -> SurgeReport {
        if self.input_locked() {
            return SurgeReport::default();
        }

        let reached = self.connectivity().energized_nodes();
        let amount = self.config.surge_stabilize_amount;
        let mut report = SurgeReport::default();
        for node in reached {
            if self.field.stabilize(node, amount) {
                report.stabilized.push(node);
                self.events.push(SessionEvent::NodeStabilized { node });
                if let Some(event) = self.overload.on_surge(1) {
                    self.on_overload_event(event);
                }
            }
        }

        log::debug!(
            "Surge stabilized {} node(s), load now {:.1}",
            report.stabilized.len(),
            self.overload.load()
        );
        self.events.push(SessionEvent::Surge {
            stabilized: report.stabilized.len(),
        });
        report
    }

    /// Advance simulated time by `dt` seconds and re-evaluate the outcome.
    ///
    /// Call once per frame, after that frame's commands.
    pub fn advance(&mut self, dt: f32) -> Result<Outcome, PreconditionError> {
        if !dt.is_finite() || dt < 0.0 {
            return Err(PreconditionError::InvalidDelta(dt));
        }
        if self.outcome.is_terminal() {
            return Ok(self.outcome);
        }

        if let Some(event) = self.overload.tick(dt, self.field.active_node_count()) {
            self.on_overload_event(event);
        }
        self.elapsed += f64::from(dt);
        self.ticks += 1;

        // Stabilized takes priority when both hold
        let outcome = if self.field.all_nodes_inactive() {
            Outcome::Stabilized
        } else if self.overload.is_critical() {
            Outcome::Overloaded
        } else {
            Outcome::InProgress
        };

        if outcome != self.outcome {
            log::info!(
                "Session {:?} after {:.2}s (load {:.1})",
                outcome,
                self.elapsed,
                self.overload.load()
            );
            self.outcome = outcome;
            self.events.push(SessionEvent::OutcomeChanged(outcome));
        }
        Ok(self.outcome)
    }

    /// Start over with an empty grid, fresh entities and zero load
    pub fn reset(&mut self) {
        self.grid = Grid::new(self.config.rows, self.config.cols);
        self.field = self.initial_field.clone();
        self.overload = overload_for(&self.config);
        self.cursor = CellPos::default();
        self.outcome = Outcome::InProgress;
        self.elapsed = 0.0;
        self.ticks = 0;
        self.events.clear();
        self.events.push(SessionEvent::Reset);
        log::info!("Session reset");
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            rows: self.grid.rows(),
            cols: self.grid.cols(),
            cells: self.grid.cells().to_vec(),
            cursor: self.cursor,
            sources: self.field.sources().iter().map(|s| s.cell).collect(),
            nodes: self
                .field
                .nodes()
                .iter()
                .map(|n| NodeView {
                    cell: n.cell,
                    energy: n.energy(),
                    active: n.is_active(),
                })
                .collect(),
            load: self.overload.load(),
            max_load: self.overload.max_load(),
            outcome: self.outcome,
            elapsed: self.elapsed,
        }
    }

    fn on_overload_event(&mut self, event: OverloadEvent) {
        log::warn!("Overload {:?} at load {:.1}", event, self.overload.load());
        self.events.push(SessionEvent::Overload(event));
    }
}

fn overload_for(config: &PuzzleConfig) -> OverloadModel {
    OverloadModel::new(
        config.max_load,
        config.warning_load,
        config.passive_load_rate,
        config.surge_load_per_node,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Anchor;
    use crate::sim::ConnectivityRule;
    use proptest::prelude::*;

    /// Source at (0,0), nodes at (0,2) and (2,0); a Cross at the source reaches both
    fn cross_config() -> PuzzleConfig {
        PuzzleConfig {
            initial_sources: vec![Anchor::cell(0, 0)],
            initial_nodes: vec![Anchor::cell(0, 2), Anchor::cell(2, 0)],
            ..Default::default()
        }
    }

    fn session(config: PuzzleConfig) -> PuzzleSession {
        PuzzleSession::new(config).unwrap()
    }

    fn place_at(session: &mut PuzzleSession, row: usize, col: usize, glyph: Glyph) {
        while session.cursor().row > row {
            session.move_cursor(Direction::Up);
        }
        while session.cursor().row < row {
            session.move_cursor(Direction::Down);
        }
        while session.cursor().col > col {
            session.move_cursor(Direction::Left);
        }
        while session.cursor().col < col {
            session.move_cursor(Direction::Right);
        }
        session.place_glyph(glyph);
    }

    #[test]
    fn test_cursor_clamps_at_edges() {
        let mut s = session(PuzzleConfig::default());
        s.move_cursor(Direction::Up);
        s.move_cursor(Direction::Left);
        assert_eq!(s.cursor(), CellPos::new(0, 0));
        for _ in 0..10 {
            s.move_cursor(Direction::Down);
            s.move_cursor(Direction::Right);
        }
        assert_eq!(s.cursor(), CellPos::new(4, 4));
    }

    #[test]
    fn test_place_glyph_idempotent() {
        let mut once = session(PuzzleConfig::default());
        place_at(&mut once, 1, 2, Glyph::Cross);

        let mut twice = session(PuzzleConfig::default());
        place_at(&mut twice, 1, 2, Glyph::Cross);
        twice.place_glyph(Glyph::Cross);

        assert_eq!(once.grid(), twice.grid());
    }

    #[test]
    fn test_horizontal_surge_connects_same_row() {
        let config = PuzzleConfig {
            initial_sources: vec![Anchor::cell(0, 0)],
            initial_nodes: vec![Anchor::cell(0, 2)],
            ..Default::default()
        };
        let mut s = session(config.clone());
        place_at(&mut s, 0, 0, Glyph::Horizontal);
        place_at(&mut s, 0, 2, Glyph::Horizontal);
        assert_eq!(s.surge().stabilized, vec![0]);
        assert_eq!(s.field().nodes()[0].energy(), 50.0);

        // Empty node cell: no connection
        let mut s = session(config);
        place_at(&mut s, 0, 0, Glyph::Horizontal);
        assert!(s.surge().stabilized.is_empty());
        assert_eq!(s.field().nodes()[0].energy(), 100.0);
        assert_eq!(s.overload().load(), 0.0);
    }

    #[test]
    fn test_cross_surge_reaches_along_row() {
        let config = PuzzleConfig {
            initial_sources: vec![Anchor::cell(2, 2)],
            initial_nodes: vec![Anchor::cell(2, 4)],
            ..Default::default()
        };
        let mut s = session(config);
        place_at(&mut s, 2, 3, Glyph::Vertical);
        place_at(&mut s, 2, 2, Glyph::Cross);
        assert_eq!(s.surge().stabilized, vec![0]);
    }

    #[test]
    fn test_two_surges_stabilize() {
        let mut s = session(cross_config());
        s.place_glyph(Glyph::Cross);

        s.surge();
        assert!(s.field().nodes().iter().all(|n| n.energy() == 50.0));
        assert_eq!(s.overload().load(), 20.0);
        assert_eq!(s.advance(0.0).unwrap(), Outcome::InProgress);

        s.surge();
        assert!(s.field().nodes().iter().all(|n| n.energy() == 0.0));
        assert_eq!(s.overload().load(), 40.0);
        assert_eq!(s.advance(0.0).unwrap(), Outcome::Stabilized);
    }

    #[test]
    fn test_surge_counts_node_once_with_two_sources() {
        let config = PuzzleConfig {
            initial_sources: vec![Anchor::cell(0, 2), Anchor::cell(2, 0)],
            initial_nodes: vec![Anchor::cell(2, 2)],
            ..Default::default()
        };
        let mut s = session(config);
        place_at(&mut s, 0, 2, Glyph::Cross);
        place_at(&mut s, 2, 0, Glyph::Cross);
        assert_eq!(s.surge().stabilized, vec![0]);
        assert_eq!(s.field().nodes()[0].energy(), 50.0);
        assert_eq!(s.overload().load(), 10.0);
    }

    #[test]
    fn test_fifty_seconds_overloads() {
        let config = PuzzleConfig {
            initial_nodes: vec![Anchor::cell(4, 4)],
            ..Default::default()
        };
        let mut s = session(config);
        for _ in 0..49 {
            assert_eq!(s.advance(1.0).unwrap(), Outcome::InProgress);
        }
        assert_eq!(s.advance(1.0).unwrap(), Outcome::Overloaded);
        assert_eq!(s.overload().load(), 100.0);
        assert_eq!(s.elapsed(), 50.0);
    }

    #[test]
    fn test_default_layout_needs_legacy_rule() {
        // Source (0,0), nodes (2,2) and (3,3): no shared row or column
        let mut aligned = session(PuzzleConfig::default());
        for glyph in [Glyph::Horizontal, Glyph::Vertical, Glyph::Cross] {
            aligned.place_glyph(glyph);
            assert!(aligned.connectivity().energized_nodes().is_empty());
        }

        let mut legacy = session(PuzzleConfig {
            connectivity: ConnectivityRule::Legacy,
            ..Default::default()
        });
        place_at(&mut legacy, 0, 0, Glyph::Horizontal);
        place_at(&mut legacy, 0, 2, Glyph::Horizontal);
        place_at(&mut legacy, 0, 3, Glyph::Horizontal);
        assert_eq!(legacy.surge().stabilized, vec![0, 1]);
        assert_eq!(legacy.surge().stabilized, vec![0, 1]);
        assert_eq!(legacy.advance(0.0).unwrap(), Outcome::Stabilized);

        // Same glyphs under the default rule reach nothing
        place_at(&mut aligned, 0, 0, Glyph::Horizontal);
        place_at(&mut aligned, 0, 2, Glyph::Horizontal);
        place_at(&mut aligned, 0, 3, Glyph::Horizontal);
        assert!(aligned.surge().stabilized.is_empty());
    }

    #[test]
    fn test_stabilized_wins_over_overloaded() {
        let config = PuzzleConfig {
            surge_load_per_node: 50.0,
            ..cross_config()
        };
        let mut s = session(config);
        s.place_glyph(Glyph::Cross);
        s.surge();
        s.surge();
        assert!(s.overload().is_critical());
        assert_eq!(s.advance(0.0).unwrap(), Outcome::Stabilized);
    }

    #[test]
    fn test_terminal_outcome_is_sticky() {
        let config = PuzzleConfig {
            initial_nodes: vec![Anchor::cell(0, 4)],
            ..Default::default()
        };
        let mut s = session(config);
        assert_eq!(s.advance(50.0).unwrap(), Outcome::Overloaded);
        let ticks = s.ticks();

        // Draining every node after the loss does not flip the outcome
        s.place_glyph(Glyph::Cross);
        s.surge();
        s.surge();
        assert!(s.field().all_nodes_inactive());
        assert_eq!(s.advance(1.0).unwrap(), Outcome::Overloaded);
        assert_eq!(s.ticks(), ticks);
    }

    #[test]
    fn test_placement_allowed_after_outcome_by_default() {
        let mut s = session(cross_config());
        s.place_glyph(Glyph::Cross);
        s.surge();
        s.surge();
        s.advance(0.0).unwrap();
        assert_eq!(s.outcome(), Outcome::Stabilized);

        s.move_cursor(Direction::Right);
        s.place_glyph(Glyph::Vertical);
        assert_eq!(s.grid().get(CellPos::new(0, 1)), Cell::Vertical);
    }

    #[test]
    fn test_lock_when_resolved_freezes_input() {
        let config = PuzzleConfig {
            lock_when_resolved: true,
            ..cross_config()
        };
        let mut s = session(config);
        s.place_glyph(Glyph::Cross);
        s.surge();
        s.surge();
        s.advance(0.0).unwrap();
        assert_eq!(s.outcome(), Outcome::Stabilized);

        let load = s.overload().load();
        s.move_cursor(Direction::Right);
        s.place_glyph(Glyph::Vertical);
        assert_eq!(s.grid().get(CellPos::new(0, 1)), Cell::Empty);
        assert!(s.surge().stabilized.is_empty());
        assert_eq!(s.overload().load(), load);
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let fresh = session(cross_config());
        let mut s = fresh.clone();
        s.place_glyph(Glyph::Cross);
        s.move_cursor(Direction::Down);
        s.place_glyph(Glyph::Vertical);
        s.surge();
        s.advance(3.0).unwrap();
        s.surge();
        s.advance(0.0).unwrap();
        assert_eq!(s.outcome(), Outcome::Stabilized);

        s.reset();
        assert_eq!(s.snapshot(), fresh.snapshot());
        assert_eq!(s.ticks(), 0);
        assert_eq!(s.drain_events(), vec![SessionEvent::Reset]);
    }

    #[test]
    fn test_negative_delta_rejected() {
        let mut s = session(PuzzleConfig::default());
        assert_eq!(
            s.advance(-0.5),
            Err(PreconditionError::InvalidDelta(-0.5))
        );
        assert!(s.advance(f32::NAN).is_err());
        assert_eq!(s.overload().load(), 0.0);
    }

    #[test]
    fn test_events_in_order() {
        let mut s = session(cross_config());
        s.place_glyph(Glyph::Cross);
        s.surge();
        let events = s.drain_events();
        assert_eq!(
            events,
            vec![
                SessionEvent::GlyphPlaced {
                    pos: CellPos::new(0, 0),
                    glyph: Glyph::Cross
                },
                SessionEvent::NodeStabilized { node: 0 },
                SessionEvent::NodeStabilized { node: 1 },
                SessionEvent::Surge { stabilized: 2 },
            ]
        );
        assert!(s.drain_events().is_empty());
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let mut s = session(cross_config());
        s.place_glyph(Glyph::Cross);
        s.surge();
        s.advance(0.5).unwrap();
        let snap = s.snapshot();
        assert_eq!(snap.cell(CellPos::new(0, 0)), Cell::Cross);
        assert_eq!(snap.sources, vec![CellPos::new(0, 0)]);
        assert_eq!(snap.nodes.len(), 2);
        assert!(snap.nodes.iter().all(|n| n.active && n.energy == 50.0));
        // 20 from the surge + 2 nodes * 2.0 * 0.5
        assert_eq!(snap.load, 22.0);
        assert_eq!(snap.outcome, Outcome::InProgress);
    }

    fn command() -> impl Strategy<Value = u8> {
        0u8..8
    }

    proptest! {
        #[test]
        fn prop_load_and_energy_monotonic(
            steps in prop::collection::vec((command(), 0.0f32..3.0), 1..120)
        ) {
            let mut s = session(cross_config());
            let mut last_load = s.overload().load();
            let mut last_energy: Vec<f32> =
                s.field().nodes().iter().map(|n| n.energy()).collect();

            for (cmd, dt) in steps {
                match cmd {
                    0 => s.move_cursor(Direction::Up),
                    1 => s.move_cursor(Direction::Down),
                    2 => s.move_cursor(Direction::Left),
                    3 => s.move_cursor(Direction::Right),
                    4 => s.place_glyph(Glyph::Horizontal),
                    5 => s.place_glyph(Glyph::Vertical),
                    6 => s.place_glyph(Glyph::Cross),
                    _ => {
                        s.surge();
                    }
                }
                s.advance(dt).unwrap();

                let load = s.overload().load();
                prop_assert!(load >= last_load);
                prop_assert!(load <= s.overload().max_load());
                last_load = load;

                for (node, last) in s.field().nodes().iter().zip(last_energy.iter_mut()) {
                    prop_assert!(node.energy() <= *last);
                    prop_assert!(node.energy() >= 0.0);
                    *last = node.energy();
                }
                prop_assert!(s.grid().contains(s.cursor()));
            }
        }
    }
}
