//! Deterministic puzzle simulation
//!
//! All puzzle logic lives here. This module must be pure and deterministic:
//! - Time only advances through explicit `dt`
//! - Seeded RNG only (autoplay)
//! - Stable iteration order (sources and nodes by index)
//! - No rendering or platform dependencies

pub mod connectivity;
pub mod entity;
pub mod grid;
pub mod overload;
pub mod replay;
pub mod state;
pub mod tick;

pub use connectivity::{Connection, ConnectivityResolver, ConnectivityRule, first_hop_connected};
pub use entity::{Entity, EntityField, Node, Source};
pub use grid::{Cell, CellPos, Glyph, Grid};
pub use overload::{OverloadEvent, OverloadModel};
pub use replay::{Autoplayer, ReplaySummary, Script, replay};
pub use state::{
    Direction, NodeView, Outcome, PuzzleSession, SessionEvent, SessionSnapshot, SurgeReport,
};
pub use tick::{Command, TickInput, apply, tick};
