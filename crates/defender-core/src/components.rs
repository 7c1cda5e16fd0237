//! ECS components for hecs entities.
//!
//! Components are plain data structs; game logic lives in systems.
//! The exceptions are the small helpers on `TrailHistory` and `PlayerStats`
//! that guard their invariants.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::prototypes::PrototypeId;
use crate::types::{EntityId, Position};

/// Marks an entity as live. Released pool entities lose this marker and are
/// skipped by every system and by snapshots.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Active;

/// Pool bookkeeping attached to every spawned entity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Lifecycle {
    /// The prototype this entity was instantiated from. Never changes.
    pub prototype: PrototypeId,
    /// Pool-managed entities go to a free list on release while pooling is
    /// enabled. The player ship is not pool-managed.
    pub pooled: bool,
    /// Bumped on every activation; handles carry the value they were issued with.
    pub activation: u32,
}

/// Orientation in radians. Projectiles travel along it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rotation {
    pub radians: f64,
}

/// Axis-aligned bounding box, centred on the entity position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HitBox {
    pub half_width: f64,
    pub half_height: f64,
}

impl HitBox {
    pub fn new(half_width: f64, half_height: f64) -> Self {
        Self {
            half_width,
            half_height,
        }
    }
}

/// Which wrap policy the coordinator applies to this entity.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct WrapRule {
    pub policy: WrapPolicy,
}

/// Recent positions for trail rendering (newest first).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrailHistory {
    pub points: Vec<Position>,
    pub capacity: usize,
}

impl TrailHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a new head point, dropping the oldest beyond capacity.
    pub fn record(&mut self, position: Position) {
        if self.capacity == 0 {
            return;
        }
        self.points.insert(0, position);
        self.points.truncate(self.capacity);
    }

    /// Apply a wrap shift to every stored point.
    pub fn shift_x(&mut self, delta: f64) {
        for point in &mut self.points {
            point.x += delta;
        }
    }
}

/// Player ship runtime state.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ShipControl {
    pub facing: Facing,
    /// Seconds since the last shot.
    pub fire_timer: f64,
}

/// Lives and score of one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub lives: u32,
    pub score: u64,
}

/// Result of a single damage application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Already game over; nothing changed.
    Ignored,
    /// A life was lost and some remain.
    Damaged { lives_left: u32 },
    /// The last life was lost by this hit.
    GameOver,
}

impl PlayerStats {
    pub fn new(lives: u32) -> Self {
        Self { lives, score: 0 }
    }

    pub fn is_game_over(&self) -> bool {
        self.lives == 0
    }

    /// Take one hit. Lives never drop below zero and game over triggers once.
    pub fn damage(&mut self) -> DamageOutcome {
        if self.is_game_over() {
            return DamageOutcome::Ignored;
        }
        self.lives -= 1;
        if self.lives == 0 {
            DamageOutcome::GameOver
        } else {
            DamageOutcome::Damaged {
                lives_left: self.lives,
            }
        }
    }

    pub fn give_score(&mut self, amount: u64) {
        self.score = self.score.saturating_add(amount);
    }
}

/// Enemy patrol state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EnemyBrain {
    pub move_x: f64,
    pub move_y: f64,
    /// Seconds since the last shot.
    pub fire_timer: f64,
}

impl Default for EnemyBrain {
    fn default() -> Self {
        Self {
            move_x: 1.0,
            move_y: -0.5,
            fire_timer: 0.0,
        }
    }
}

/// Per-activation projectile state.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ProjectileState {
    pub phase: ProjectilePhase,
    /// Seconds since launch.
    pub elapsed: f64,
    /// Ship speed added on launch when firing forward.
    pub inherited_speed: f64,
    /// The player that fired this projectile, if any.
    pub owner: Option<EntityId>,
}

/// Per-activation effect state.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct EffectState {
    pub elapsed: f64,
}
