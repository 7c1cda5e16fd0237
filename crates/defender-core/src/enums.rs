//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Discriminator for every simulated actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    Enemy,
    PlayerProjectile,
    EnemyProjectile,
    Effect,
}

/// Lifecycle of a single projectile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectilePhase {
    /// Travelling; lifetime is counting down.
    #[default]
    Flying,
    /// A hit was detected this tick; the kill is applied on the next tick.
    HitPending,
    /// The pending hit was applied and the projectile went back to its pool.
    Resolved,
    /// Lifetime ran out without a hit.
    Expired,
}

/// Which way the player ship faces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facing {
    #[default]
    Right,
    Left,
}

impl Facing {
    /// +1.0 for right, -1.0 for left.
    pub fn sign(self) -> f64 {
        match self {
            Facing::Right => 1.0,
            Facing::Left => -1.0,
        }
    }

    /// Rotation (radians) of a projectile launched in this direction.
    pub fn rotation(self) -> f64 {
        match self {
            Facing::Right => 0.0,
            Facing::Left => std::f64::consts::PI,
        }
    }
}

/// How the wrap coordinator decides that an entity crossed the seam.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WrapPolicy {
    /// Shift when further than half a map width from the camera.
    #[default]
    CenterHalfWidth,
    /// Shift when the camera-relative x leaves the map's explicit `[x_min, x_max]`.
    AreaBounds,
}

/// Game phase (top-level state).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    #[default]
    Running,
    Paused,
    /// The player ran out of lives; the world keeps running until restart.
    GameOver,
    /// The session was torn down; ticks are no-ops.
    Ended,
}
