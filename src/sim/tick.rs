//! Frame driver
//!
//! One frame = the commands received this frame, then exactly one
//! `advance(dt)`. Driving a session only through [`tick`] keeps runs
//! reproducible from a recorded command/time-delta log.

use serde::{Deserialize, Serialize};

use super::grid::Glyph;
use super::state::{Direction, Outcome, PuzzleSession};
use crate::error::PreconditionError;

/// A discrete player command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", content = "arg")]
pub enum Command {
    MoveCursor(Direction),
    PlaceGlyph(Glyph),
    Surge,
    Reset,
}

/// Input for a single frame (deterministic)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickInput {
    /// Commands in the order they were received
    #[serde(default)]
    pub commands: Vec<Command>,
    /// Simulated seconds this frame covers
    pub dt: f32,
}

impl TickInput {
    /// A frame with no commands
    pub fn idle(dt: f32) -> Self {
        Self {
            commands: Vec::new(),
            dt,
        }
    }

    pub fn with(commands: impl Into<Vec<Command>>, dt: f32) -> Self {
        Self {
            commands: commands.into(),
            dt,
        }
    }
}

/// Apply one command to the session
pub fn apply(session: &mut PuzzleSession, command: Command) {
    match command {
        Command::MoveCursor(direction) => session.move_cursor(direction),
        Command::PlaceGlyph(glyph) => session.place_glyph(glyph),
        Command::Surge => {
            session.surge();
        }
        Command::Reset => session.reset(),
    }
}

/// Advance the session by one frame.
///
/// `dt` is checked before any command runs, so a rejected frame leaves the
/// session untouched.
pub fn tick(session: &mut PuzzleSession, input: &TickInput) -> Result<Outcome, PreconditionError> {
    if !input.dt.is_finite() || input.dt < 0.0 {
        return Err(PreconditionError::InvalidDelta(input.dt));
    }
    for &command in &input.commands {
        apply(session, command);
    }
    session.advance(input.dt)
}
