//! Events emitted by the simulation for presentation and UI feedback.

use serde::{Deserialize, Serialize};

use crate::enums::EntityKind;
use crate::types::{EntityId, Position};

/// Things that happened during a tick, drained into the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    /// A ship or enemy fired.
    ProjectileFired {
        projectile: EntityId,
        kind: EntityKind,
        position: Position,
    },
    /// A fast projectile's sweep found a target; the kill lands next tick.
    HitDetected { projectile: EntityId, target: EntityId },
    /// An enemy was destroyed by a resolved hit.
    EnemyKilled {
        enemy: EntityId,
        by: Option<EntityId>,
        score_value: u64,
        position: Position,
    },
    /// A player lost a life.
    PlayerDamaged { player: EntityId, lives_left: u32 },
    /// A player lost the last life.
    GameOver { player: EntityId, final_score: u64 },
    /// The wrap coordinator moved something by `delta` along x.
    /// `entity` is `None` for the camera.
    WrapShift { entity: Option<EntityId>, delta: f64 },
    /// The session was rebuilt.
    SessionRestarted,
}
