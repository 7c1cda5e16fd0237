//! Snapshot system: queries the ECS world and builds a `GameStateSnapshot`.
//!
//! This system is read-only and never modifies the world.

use hecs::World;

use defender_core::components::*;
use defender_core::enums::{EntityKind, GamePhase};
use defender_core::events::GameEvent;
use defender_core::state::*;
use defender_core::types::{Position, SimTime};

use crate::pool::{entity_id, EntityPool};
use crate::systems::camera::Camera;

/// Build a complete snapshot from the current world state.
pub fn build_snapshot(
    world: &World,
    time: &SimTime,
    phase: GamePhase,
    camera: &Camera,
    events: Vec<GameEvent>,
    pool: &EntityPool,
) -> GameStateSnapshot {
    let stats = pool.stats();
    GameStateSnapshot {
        time: *time,
        phase,
        camera: CameraView {
            x: camera.x,
            y: camera.y,
        },
        entities: build_entities(world),
        player: build_player(world),
        events,
        pool: PoolView {
            enabled: pool.is_enabled(),
            hits: stats.hits,
            misses: stats.misses,
            dormant: pool.free_count(),
        },
    }
}

/// Every visible active entity, sorted by id. A ship that is game over is
/// hidden.
fn build_entities(world: &World) -> Vec<EntityView> {
    let mut entities: Vec<EntityView> = world
        .query::<(
            &Active,
            &EntityKind,
            &Position,
            &Rotation,
            Option<&TrailHistory>,
            Option<&PlayerStats>,
        )>()
        .iter()
        .filter(|(_, (.., stats))| !stats.is_some_and(|s| s.is_game_over()))
        .map(|(entity, (_, kind, pos, rot, trail, _))| EntityView {
            id: entity_id(entity),
            kind: *kind,
            position: *pos,
            rotation: rot.radians,
            trail: trail.map(|t| t.points.clone()).unwrap_or_default(),
        })
        .collect();

    entities.sort_by_key(|e| e.id);
    entities
}

/// HUD view of the first player ship, if one exists.
fn build_player(world: &World) -> Option<PlayerView> {
    world
        .query::<(&Active, &PlayerStats)>()
        .iter()
        .map(|(entity, (_, stats))| PlayerView {
            id: Some(entity_id(entity)),
            lives: stats.lives,
            score: stats.score,
            is_game_over: stats.is_game_over(),
        })
        .min_by_key(|view| view.id)
}
