//! Recorded command scripts and seeded autoplay
//!
//! A [`Script`] is the full command/time-delta log of a run. Replaying the
//! same script on the same config always lands on the same state.

use std::fs;
use std::path::Path;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::grid::Glyph;
use super::state::{Direction, Outcome, PuzzleSession};
use super::tick::{Command, TickInput, tick};
use crate::error::{ConfigError, PreconditionError};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    pub frames: Vec<TickInput>,
}

impl Script {
    pub fn new(frames: Vec<TickInput>) -> Self {
        Self { frames }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let script = Self::from_json_str(&contents)?;
        log::info!(
            "Loaded script with {} frames from {}",
            script.frames.len(),
            path.display()
        );
        Ok(script)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// How a replay ended
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReplaySummary {
    pub frames_run: usize,
    pub outcome: Outcome,
    pub load: f32,
}

/// Run a script frame by frame, stopping at the first terminal outcome
pub fn replay(session: &mut PuzzleSession, script: &Script) -> Result<ReplaySummary, PreconditionError> {
    let mut frames_run = 0;
    for input in &script.frames {
        let outcome = tick(session, input)?;
        frames_run += 1;
        if outcome.is_terminal() {
            break;
        }
    }

    let summary = ReplaySummary {
        frames_run,
        outcome: session.outcome(),
        load: session.overload().load(),
    };
    log::info!(
        "Replay finished after {} frames: {:?} (load {:.1})",
        summary.frames_run,
        summary.outcome,
        summary.load
    );
    Ok(summary)
}

/// Seeded random command generator for soak runs and demos
#[derive(Debug, Clone)]
pub struct Autoplayer {
    rng: Pcg32,
    /// Chance (percent) that a frame carries a command at all
    pub command_chance: u32,
}

impl Autoplayer {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            command_chance: 25,
        }
    }

    /// Pick one command. Surges are rarer than cursor moves.
    pub fn next_command(&mut self) -> Command {
        match self.rng.random_range(0..10u32) {
            0 => Command::MoveCursor(Direction::Up),
            1 | 2 => Command::MoveCursor(Direction::Down),
            3 => Command::MoveCursor(Direction::Left),
            4 | 5 => Command::MoveCursor(Direction::Right),
            6 => Command::PlaceGlyph(Glyph::Horizontal),
            7 => Command::PlaceGlyph(Glyph::Vertical),
            8 => Command::PlaceGlyph(Glyph::Cross),
            _ => Command::Surge,
        }
    }

    /// Generate `frames` frames of fixed length `dt`
    pub fn script(&mut self, frames: usize, dt: f32) -> Script {
        let frames = (0..frames)
            .map(|_| {
                if self.rng.random_range(0..100u32) < self.command_chance {
                    TickInput::with(vec![self.next_command()], dt)
                } else {
                    TickInput::idle(dt)
                }
            })
            .collect();
        Script::new(frames)
    }
}
