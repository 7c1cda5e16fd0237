//! Game state snapshot: the complete visible state handed to renderer and UI each tick.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::events::GameEvent;
use crate::types::{EntityId, Position, SimTime};

/// Complete read-only state after a tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameStateSnapshot {
    pub time: SimTime,
    pub phase: GamePhase,
    pub camera: CameraView,
    /// Active entities, sorted by id.
    pub entities: Vec<EntityView>,
    pub player: Option<PlayerView>,
    pub events: Vec<GameEvent>,
    pub pool: PoolView,
}

/// One active entity for rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityView {
    pub id: EntityId,
    pub kind: EntityKind,
    pub position: Position,
    pub rotation: f64,
    /// Trail points, newest first. Empty when the entity has no trail.
    pub trail: Vec<Position>,
}

/// Camera placement.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CameraView {
    pub x: f64,
    pub y: f64,
}

/// HUD state of the player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: Option<EntityId>,
    pub lives: u32,
    pub score: u64,
    pub is_game_over: bool,
}

/// Pool statistics for debug overlays.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PoolView {
    pub enabled: bool,
    pub hits: u64,
    pub misses: u64,
    pub dormant: usize,
}
