//! Input and commands sent from the host to the simulation.
//!
//! The core never sees devices: the input collaborator maps them to a
//! normalized move vector and two buttons. Commands are queued and processed
//! at the next tick boundary.

use serde::{Deserialize, Serialize};

/// Per-tick player input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TickInput {
    /// Horizontal stick/keys in [-1, 1], dead zone already applied.
    pub move_x: f64,
    /// Vertical stick/keys in [-1, 1].
    pub move_y: f64,
    /// Fire held.
    pub fire: bool,
    /// Submit pressed this tick (restarts after game over).
    pub submit: bool,
}

impl TickInput {
    /// Input with components clamped to [-1, 1] and NaN treated as neutral.
    pub fn sanitized(self) -> Self {
        let clamp = |v: f64| if v.is_nan() { 0.0 } else { v.clamp(-1.0, 1.0) };
        Self {
            move_x: clamp(self.move_x),
            move_y: clamp(self.move_y),
            ..self
        }
    }
}

/// Session-level actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerCommand {
    /// Pause the simulation.
    Pause,
    /// Resume the simulation.
    Resume,
    /// Tear the session down and rebuild it from its config.
    Restart,
}
