//! Combat resolution: deferred kills from player shots and instant damage
//! from enemy shots.
//!
//! A player shot that connects in tick N only marks the hit. The kill, the
//! death effect and the score land in tick N + 1, so the target is still
//! present (and still rendered) at the end of the tick the hit was found.

use hecs::{Entity, World};
use serde::{Deserialize, Serialize};

use defender_core::components::*;
use defender_core::enums::{EntityKind, ProjectilePhase};
use defender_core::events::GameEvent;
use defender_core::prototypes::{EnemyTuning, PlayerTuning, PrototypeCatalog};
use defender_core::types::{EntityHandle, EntityId, Position};

use crate::map::Map;
use crate::pool::{entity_id, resolve_handle, EntityPool};
use crate::sweep::nearest_dx;

/// A hit found by a projectile sweep, waiting for the next tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingHit {
    pub projectile: EntityHandle,
    pub target: EntityHandle,
    /// Player credited with the kill.
    pub owner: Option<EntityId>,
    pub detected_tick: u64,
}

/// Apply every pending hit detected before `current_tick`.
pub fn resolve_pending(
    world: &mut World,
    pool: &mut EntityPool,
    catalog: &PrototypeCatalog,
    pending: &mut Vec<PendingHit>,
    current_tick: u64,
    events: &mut Vec<GameEvent>,
) {
    let (due, waiting): (Vec<PendingHit>, Vec<PendingHit>) = pending
        .drain(..)
        .partition(|hit| hit.detected_tick < current_tick);
    *pending = waiting;

    for hit in due {
        if let Ok(target) = resolve_handle(world, hit.target) {
            kill_enemy(world, pool, catalog, target, hit.owner, events);
        } else {
            log::debug!("hit on {} dropped, target already gone", hit.target);
        }

        match resolve_handle(world, hit.projectile) {
            Ok(projectile) => {
                if let Ok(mut state) = world.get::<&mut ProjectileState>(projectile) {
                    state.phase = ProjectilePhase::Resolved;
                }
                pool.release_entity(world, projectile);
            }
            Err(e) => log::debug!("pending projectile not released: {e}"),
        }
    }
}

fn kill_enemy(
    world: &mut World,
    pool: &mut EntityPool,
    catalog: &PrototypeCatalog,
    target: Entity,
    owner: Option<EntityId>,
    events: &mut Vec<GameEvent>,
) {
    let position = world
        .get::<&Position>(target)
        .map(|p| *p)
        .unwrap_or_default();
    let tuning = world.get::<&EnemyTuning>(target).map(|t| *t).ok();
    pool.release_entity(world, target);

    let score_value = tuning.map_or(0, |t| t.score_value);
    if let Some(tuning) = tuning {
        if let Err(e) = pool.acquire(world, catalog, tuning.death_effect, position, 0.0) {
            log::warn!("enemy death effect not spawned: {e}");
        }
    }

    if let Some(id) = owner {
        let stats = Entity::from_bits(id.0).and_then(|e| world.get::<&mut PlayerStats>(e).ok());
        match stats {
            Some(mut stats) => stats.give_score(score_value),
            None => log::debug!("kill credited to missing player {id}"),
        }
    }

    events.push(GameEvent::EnemyKilled {
        enemy: entity_id(target),
        by: owner,
        score_value,
        position,
    });
}

/// Damage players touched by enemy shots. Each touching shot is released.
pub fn resolve_enemy_fire(
    world: &mut World,
    pool: &mut EntityPool,
    catalog: &PrototypeCatalog,
    map: &Map,
    events: &mut Vec<GameEvent>,
) {
    let players: Vec<(Entity, Position, HitBox)> = world
        .query_mut::<(&Active, &Position, &HitBox, &PlayerStats)>()
        .into_iter()
        .map(|(e, (_, pos, hb, _))| (e, *pos, *hb))
        .collect();
    if players.is_empty() {
        return;
    }

    let mut contacts: Vec<(Entity, Entity)> = Vec::new();
    for (shot, (_active, kind, pos, hb, state)) in world.query_mut::<(
        &Active,
        &EntityKind,
        &Position,
        &HitBox,
        &ProjectileState,
    )>() {
        if *kind != EntityKind::EnemyProjectile || state.phase != ProjectilePhase::Flying {
            continue;
        }
        let touched = players.iter().find(|(_, ppos, phb)| {
            let dx = nearest_dx(pos.x, ppos.x, map.width()).abs();
            let dy = (ppos.y - pos.y).abs();
            dx <= hb.half_width + phb.half_width && dy <= hb.half_height + phb.half_height
        });
        if let Some(&(player, ..)) = touched {
            contacts.push((shot, player));
        }
    }

    for (shot, player) in contacts {
        if let Ok(mut state) = world.get::<&mut ProjectileState>(shot) {
            state.phase = ProjectilePhase::Resolved;
        }
        pool.release_entity(world, shot);
        damage_player(world, pool, catalog, player, events);
    }
}

/// Take one life from a player. The last life triggers game over exactly
/// once; hits after that change nothing.
pub fn damage_player(
    world: &mut World,
    pool: &mut EntityPool,
    catalog: &PrototypeCatalog,
    player: Entity,
    events: &mut Vec<GameEvent>,
) {
    let outcome = match world.get::<&mut PlayerStats>(player) {
        Ok(mut stats) => (stats.damage(), stats.score),
        Err(_) => return,
    };
    let id = entity_id(player);

    match outcome {
        (DamageOutcome::Ignored, _) => {}
        (DamageOutcome::Damaged { lives_left }, _) => {
            log::debug!("player {id} hit, {lives_left} lives left");
            events.push(GameEvent::PlayerDamaged {
                player: id,
                lives_left,
            });
        }
        (DamageOutcome::GameOver, final_score) => {
            log::info!("player {id} destroyed, game over with score {final_score}");
            events.push(GameEvent::PlayerDamaged {
                player: id,
                lives_left: 0,
            });
            events.push(GameEvent::GameOver {
                player: id,
                final_score,
            });

            let position = world.get::<&Position>(player).map(|p| *p).unwrap_or_default();
            let effect = world.get::<&PlayerTuning>(player).map(|t| t.death_effect).ok();
            if let Some(effect) = effect {
                if let Err(e) = pool.acquire(world, catalog, effect, position, 0.0) {
                    log::warn!("player death effect not spawned: {e}");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use defender_core::config::MapConfig;
    use defender_core::prototypes::PrototypeId;

    use crate::world_setup::spawn_player;

    struct Fixture {
        world: World,
        pool: EntityPool,
        catalog: PrototypeCatalog,
        map: Map,
        events: Vec<GameEvent>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                world: World::new(),
                pool: EntityPool::new(true),
                catalog: PrototypeCatalog::standard(),
                map: Map::from_config(&MapConfig::default()).unwrap(),
                events: Vec::new(),
            }
        }

        fn spawn(&mut self, id: PrototypeId, pos: Position) -> EntityHandle {
            self.pool
                .acquire(&mut self.world, &self.catalog, id, pos, 0.0)
                .unwrap()
        }

        fn player(&mut self) -> Entity {
            let handle = spawn_player(
                &mut self.world,
                &self.catalog,
                PrototypeId::PLAYER_SHIP,
                Position::default(),
            )
            .unwrap();
            resolve_handle(&self.world, handle).unwrap()
        }

        fn count_kind(&self, kind: EntityKind) -> usize {
            self.world
                .query::<(&Active, &EntityKind)>()
                .iter()
                .filter(|(_, (_, k))| **k == kind)
                .count()
        }
    }

    #[test]
    fn test_pending_hit_waits_one_tick() {
        let mut fx = Fixture::new();
        let player = fx.player();
        let shot = fx.spawn(PrototypeId::PLAYER_SHOT, Position::default());
        let enemy = fx.spawn(PrototypeId::ENEMY, Position::new(2.0, 0.0));
        let mut pending = vec![PendingHit {
            projectile: shot,
            target: enemy,
            owner: Some(entity_id(player)),
            detected_tick: 5,
        }];

        resolve_pending(&mut fx.world, &mut fx.pool, &fx.catalog, &mut pending, 5, &mut fx.events);
        assert_eq!(pending.len(), 1);
        assert!(resolve_handle(&fx.world, enemy).is_ok());

        resolve_pending(&mut fx.world, &mut fx.pool, &fx.catalog, &mut pending, 6, &mut fx.events);
        assert!(pending.is_empty());
        assert!(resolve_handle(&fx.world, enemy).is_err());
        assert!(resolve_handle(&fx.world, shot).is_err());
        assert_eq!(fx.world.get::<&PlayerStats>(player).unwrap().score, 100);
        assert_eq!(fx.count_kind(EntityKind::Effect), 1);
        assert_eq!(fx.pool.free_count_of(PrototypeId::PLAYER_SHOT), 1);
        assert_eq!(fx.pool.free_count_of(PrototypeId::ENEMY), 1);
    }

    #[test]
    fn test_second_hit_on_same_target_only_releases_projectile() {
        let mut fx = Fixture::new();
        let player = fx.player();
        let enemy = fx.spawn(PrototypeId::ENEMY, Position::new(2.0, 0.0));
        let a = fx.spawn(PrototypeId::PLAYER_SHOT, Position::default());
        let b = fx.spawn(PrototypeId::PLAYER_SHOT, Position::new(0.0, 0.1));
        let owner = Some(entity_id(player));
        let mut pending = vec![
            PendingHit {
                projectile: a,
                target: enemy,
                owner,
                detected_tick: 1,
            },
            PendingHit {
                projectile: b,
                target: enemy,
                owner,
                detected_tick: 1,
            },
        ];

        resolve_pending(&mut fx.world, &mut fx.pool, &fx.catalog, &mut pending, 2, &mut fx.events);

        assert_eq!(fx.world.get::<&PlayerStats>(player).unwrap().score, 100);
        assert_eq!(fx.pool.free_count_of(PrototypeId::PLAYER_SHOT), 2);
        let kills = fx
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::EnemyKilled { .. }))
            .count();
        assert_eq!(kills, 1);
    }

    #[test]
    fn test_enemy_shot_damages_player() {
        let mut fx = Fixture::new();
        let player = fx.player();
        let shot = fx.spawn(PrototypeId::ENEMY_SHOT, Position::new(0.3, 0.0));
        let far = fx.spawn(PrototypeId::ENEMY_SHOT, Position::new(5.0, 0.0));

        resolve_enemy_fire(&mut fx.world, &mut fx.pool, &fx.catalog, &fx.map, &mut fx.events);

        assert_eq!(fx.world.get::<&PlayerStats>(player).unwrap().lives, 4);
        assert!(resolve_handle(&fx.world, shot).is_err());
        assert!(resolve_handle(&fx.world, far).is_ok());
        assert_eq!(
            fx.events,
            vec![GameEvent::PlayerDamaged {
                player: entity_id(player),
                lives_left: 4
            }]
        );
    }

    #[test]
    fn test_game_over_triggers_once() {
        let mut fx = Fixture::new();
        let player = fx.player();
        for _ in 0..8 {
            damage_player(&mut fx.world, &mut fx.pool, &fx.catalog, player, &mut fx.events);
        }
        let stats = *fx.world.get::<&PlayerStats>(player).unwrap();
        assert_eq!(stats.lives, 0);
        assert!(stats.is_game_over());

        let game_overs = fx
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::GameOver { .. }))
            .count();
        assert_eq!(game_overs, 1);
        // Exactly one death burst.
        assert_eq!(fx.count_kind(EntityKind::Effect), 1);
    }
}
