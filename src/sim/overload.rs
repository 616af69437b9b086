//! Global overload meter
//!
//! Load only ever rises: passively while nodes stay active, and in steps on
//! every successful surge. It is clamped to `max_load` after each update.

use serde::{Deserialize, Serialize};

/// Loads this close to the cap count as the cap, so many small frame steps
/// land exactly on it.
const CAP_EPSILON: f64 = 1e-4;

/// Threshold crossed by an update (upward only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverloadEvent {
    /// Load reached the warning level
    Warning,
    /// Load reached the cap
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverloadModel {
    /// Accumulated in f64 so per-frame increments do not drift
    load: f64,
    max_load: f32,
    warning_load: f32,
    /// Load per second per active node
    passive_rate: f32,
    /// Load per node stabilized by a surge
    surge_per_node: f32,
}

impl OverloadModel {
    pub fn new(max_load: f32, warning_load: f32, passive_rate: f32, surge_per_node: f32) -> Self {
        Self {
            load: 0.0,
            max_load,
            warning_load,
            passive_rate,
            surge_per_node,
        }
    }

    pub fn load(&self) -> f32 {
        self.load as f32
    }

    pub fn max_load(&self) -> f32 {
        self.max_load
    }

    /// Load as a fraction of the cap, for meters
    pub fn fraction(&self) -> f32 {
        if self.max_load > 0.0 {
            (self.load / f64::from(self.max_load)) as f32
        } else {
            1.0
        }
    }

    pub fn is_warning(&self) -> bool {
        self.load >= f64::from(self.warning_load)
    }

    pub fn is_critical(&self) -> bool {
        self.load >= f64::from(self.max_load)
    }

    /// Passive accumulation: `passive_rate * dt` for each active node
    pub fn tick(&mut self, dt: f32, active_nodes: usize) -> Option<OverloadEvent> {
        let before = self.thresholds();
        for _ in 0..active_nodes {
            self.load += (f64::from(self.passive_rate) * f64::from(dt)).max(0.0);
        }
        self.clamp_and_report(before)
    }

    /// Step increase for nodes stabilized by a surge
    pub fn on_surge(&mut self, stabilized: usize) -> Option<OverloadEvent> {
        let before = self.thresholds();
        self.load += (f64::from(self.surge_per_node) * stabilized as f64).max(0.0);
        self.clamp_and_report(before)
    }

    fn thresholds(&self) -> (bool, bool) {
        (self.is_warning(), self.is_critical())
    }

    fn clamp_and_report(&mut self, (was_warning, was_critical): (bool, bool)) -> Option<OverloadEvent> {
        let max_load = f64::from(self.max_load);
        if self.load >= max_load - CAP_EPSILON {
            self.load = max_load;
        }

        if !was_critical && self.is_critical() {
            Some(OverloadEvent::Critical)
        } else if !was_warning && self.is_warning() {
            Some(OverloadEvent::Warning)
        } else {
            None
        }
    }
}
