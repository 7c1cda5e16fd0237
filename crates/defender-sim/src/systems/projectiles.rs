//! Projectile launch and travel.
//!
//! Player shots are fast: each tick they sweep their whole travel distance
//! for enemy boxes and stop just past the first contact, leaving a pending
//! hit for the combat pass of the next tick. Enemy shots are slow and simply
//! integrate their velocity.

use hecs::{Entity, World};

use defender_core::components::*;
use defender_core::constants::HIT_EPSILON;
use defender_core::enums::{EntityKind, ProjectilePhase};
use defender_core::events::GameEvent;
use defender_core::prototypes::{ProjectileTuning, PrototypeCatalog, PrototypeId};
use defender_core::types::{EntityHandle, EntityId, Position, Velocity};

use crate::map::Map;
use crate::pool::{entity_id, resolve_handle, EntityPool};
use crate::sweep;
use crate::systems::combat::PendingHit;

/// A shot queued by a ship or enemy during steering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotRequest {
    pub prototype: PrototypeId,
    pub position: Position,
    /// Travel direction of swept shots, in radians.
    pub rotation: f64,
    pub owner: Option<EntityId>,
    pub inherited_speed: f64,
    /// Unit launch direction for ballistic shots. `None` launches along
    /// `rotation`.
    pub direction: Option<(f64, f64)>,
}

/// Acquire every queued shot from the pool and give it its launch state.
pub fn launch(
    world: &mut World,
    pool: &mut EntityPool,
    catalog: &PrototypeCatalog,
    shots: &mut Vec<ShotRequest>,
    events: &mut Vec<GameEvent>,
) {
    for shot in shots.drain(..) {
        let acquired =
            pool.acquire(world, catalog, shot.prototype, shot.position, shot.rotation);
        let handle = match acquired {
            Ok(handle) => handle,
            Err(e) => {
                log::warn!("shot from {:?} not launched: {e}", shot.owner);
                continue;
            }
        };
        let Ok(entity) = resolve_handle(world, handle) else {
            continue;
        };

        let speed = world
            .get::<&ProjectileTuning>(entity)
            .map(|t| t.speed)
            .unwrap_or(0.0);
        let (dx, dy) = shot
            .direction
            .unwrap_or((shot.rotation.cos(), shot.rotation.sin()));
        if let Ok(mut state) = world.get::<&mut ProjectileState>(entity) {
            state.owner = shot.owner;
            state.inherited_speed = shot.inherited_speed;
        }
        if let Ok(mut vel) = world.get::<&mut Velocity>(entity) {
            let total = speed + shot.inherited_speed;
            *vel = Velocity::new(dx * total, dy * total);
        }
        let kind = world
            .get::<&EntityKind>(entity)
            .map(|k| *k)
            .unwrap_or(EntityKind::PlayerProjectile);

        events.push(GameEvent::ProjectileFired {
            projectile: handle.id,
            kind,
            position: shot.position,
        });
    }
}

/// Move every flying projectile and collect the ones whose lifetime ran out.
///
/// Player shots that find a target switch to `HitPending` and record a
/// [`PendingHit`] stamped with `current_tick`.
pub fn run(
    world: &mut World,
    map: &Map,
    current_tick: u64,
    dt: f64,
    pending: &mut Vec<PendingHit>,
    release_buffer: &mut Vec<Entity>,
    events: &mut Vec<GameEvent>,
) {
    // Candidate targets for player shots.
    let enemies: Vec<(Entity, Position, HitBox, u32)> = world
        .query_mut::<(&Active, &EntityKind, &Position, &HitBox, &Lifecycle)>()
        .into_iter()
        .filter(|(_, (_, kind, ..))| **kind == EntityKind::Enemy)
        .map(|(e, (_, _, pos, hb, life))| (e, *pos, *hb, life.activation))
        .collect();

    for (entity, (_active, kind, pos, rot, hb, vel, state, tuning, life)) in world.query_mut::<(
        &Active,
        &EntityKind,
        &mut Position,
        &Rotation,
        &HitBox,
        &Velocity,
        &mut ProjectileState,
        &ProjectileTuning,
        &Lifecycle,
    )>() {
        if state.phase != ProjectilePhase::Flying {
            continue;
        }

        match kind {
            EntityKind::PlayerProjectile => {
                let distance = (tuning.speed + state.inherited_speed) * dt;
                let hit = sweep::first_hit(
                    *pos,
                    rot.radians,
                    distance,
                    *hb,
                    map.width(),
                    enemies.iter().map(|&(e, p, h, _)| (e, p, h)),
                );
                let travel = hit.map_or(distance, |h| h.distance + HIT_EPSILON);
                pos.x += rot.radians.cos() * travel;
                pos.y += rot.radians.sin() * travel;

                if let Some(hit) = hit {
                    let activation = enemies
                        .iter()
                        .find(|(e, ..)| *e == hit.target)
                        .map_or(0, |&(.., a)| a);
                    state.phase = ProjectilePhase::HitPending;
                    pending.push(PendingHit {
                        projectile: EntityHandle {
                            id: entity_id(entity),
                            activation: life.activation,
                        },
                        target: EntityHandle {
                            id: entity_id(hit.target),
                            activation,
                        },
                        owner: state.owner,
                        detected_tick: current_tick,
                    });
                    events.push(GameEvent::HitDetected {
                        projectile: entity_id(entity),
                        target: entity_id(hit.target),
                    });
                    // A pending shot stops aging until it is resolved.
                    continue;
                }
            }
            EntityKind::EnemyProjectile => {
                pos.x += vel.x * dt;
                pos.y += vel.y * dt;
            }
            _ => continue,
        }

        state.elapsed += dt;
        if state.elapsed >= tuning.lifetime {
            state.phase = ProjectilePhase::Expired;
            release_buffer.push(entity);
        }
    }
}
