//! Entity pool: reuse cache for short-lived entities, keyed by prototype.
//!
//! Released pool-managed entities keep their components but lose the
//! `Active` marker, which hides them from every system and from snapshots.
//! Acquiring re-inserts the prototype's full bundle, replacing whatever the
//! previous activation left behind.

use std::collections::HashMap;

use hecs::{Entity, World};
use serde::{Deserialize, Serialize};

use defender_core::components::{Active, Lifecycle};
use defender_core::error::{SimError, SimResult};
use defender_core::prototypes::{PrototypeCatalog, PrototypeId};
use defender_core::types::{EntityHandle, EntityId, Position};

use crate::world_setup;

/// Stable id of an ECS entity.
pub fn entity_id(entity: Entity) -> EntityId {
    EntityId(entity.to_bits().get())
}

/// Reuse counters, exposed for debug overlays and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    /// Acquires served from a free list.
    pub hits: u64,
    /// Acquires that had to instantiate.
    pub misses: u64,
    /// Largest number of dormant entities held at once.
    pub peak_free: usize,
}

/// Free lists of dormant entities, one per prototype.
#[derive(Debug)]
pub struct EntityPool {
    free: HashMap<PrototypeId, Vec<Entity>>,
    enabled: bool,
    stats: PoolStats,
}

impl Default for EntityPool {
    fn default() -> Self {
        Self::new(true)
    }
}

impl EntityPool {
    pub fn new(enabled: bool) -> Self {
        Self {
            free: HashMap::new(),
            enabled,
            stats: PoolStats::default(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn stats(&self) -> PoolStats {
        self.stats
    }

    /// Number of dormant entities across all prototypes.
    pub fn free_count(&self) -> usize {
        self.free.values().map(Vec::len).sum()
    }

    /// Dormant entities held for one prototype.
    pub fn free_count_of(&self, prototype: PrototypeId) -> usize {
        self.free.get(&prototype).map_or(0, Vec::len)
    }

    /// Switch pooling on or off for the whole session. Turning it off
    /// destroys every dormant entity. The switch is read again at release
    /// time, so entities acquired while it was off are reclaimed once it is
    /// back on.
    pub fn set_enabled(&mut self, world: &mut World, enabled: bool) {
        if self.enabled == enabled {
            return;
        }
        self.enabled = enabled;
        if !enabled {
            let dropped = self.free_count();
            for entity in self.free.drain().flat_map(|(_, list)| list) {
                let _ = world.despawn(entity);
            }
            log::info!("pooling disabled, destroyed {dropped} dormant entities");
        } else {
            log::info!("pooling enabled");
        }
    }

    /// Hand out an active entity of `prototype` at `position`.
    ///
    /// Reuses a dormant entity instantiated from the same prototype when one
    /// exists; otherwise instantiates a new one.
    pub fn acquire(
        &mut self,
        world: &mut World,
        catalog: &PrototypeCatalog,
        prototype: PrototypeId,
        position: Position,
        rotation: f64,
    ) -> SimResult<EntityHandle> {
        let proto = if prototype.is_unset() {
            None
        } else {
            catalog.get(prototype)
        };
        let Some(proto) = proto else {
            log::warn!("acquire rejected: {}", SimError::InvalidPrototype(prototype));
            return Err(SimError::InvalidPrototype(prototype));
        };

        if self.enabled {
            while let Some(entity) = self.take_free(prototype) {
                let previous = match world.get::<&Lifecycle>(entity) {
                    Ok(lifecycle) => *lifecycle,
                    // Destroyed behind the pool's back; skip it.
                    Err(_) => continue,
                };
                debug_assert_eq!(previous.prototype, prototype);
                let lifecycle = Lifecycle {
                    activation: previous.activation.wrapping_add(1),
                    ..previous
                };
                let mut builder =
                    world_setup::build_components(proto, position, rotation, lifecycle);
                if world.insert(entity, builder.build()).is_ok() {
                    self.stats.hits += 1;
                    return Ok(EntityHandle {
                        id: entity_id(entity),
                        activation: lifecycle.activation,
                    });
                }
            }
        }

        let lifecycle = Lifecycle {
            prototype,
            pooled: true,
            activation: 1,
        };
        let mut builder = world_setup::build_components(proto, position, rotation, lifecycle);
        let entity = world.spawn(builder.build());
        self.stats.misses += 1;
        log::debug!("pool miss for {} ({}), instantiated {}", proto.name, prototype, entity_id(entity));
        Ok(EntityHandle {
            id: entity_id(entity),
            activation: 1,
        })
    }

    /// Release the entity behind `handle`. Pool-managed entities go dormant
    /// while pooling is enabled; everything else is destroyed.
    pub fn release(&mut self, world: &mut World, handle: EntityHandle) -> SimResult<()> {
        let entity = resolve_handle(world, handle)?;
        self.retire(world, entity);
        Ok(())
    }

    /// Release an entity the caller already knows to be active.
    /// Inactive or missing entities are ignored, so an entity can never
    /// be pushed onto a free list twice.
    pub fn release_entity(&mut self, world: &mut World, entity: Entity) {
        if world.get::<&Active>(entity).is_ok() {
            self.retire(world, entity);
        }
    }

    /// Forget every free list. Used when the world itself is cleared.
    pub fn clear(&mut self) {
        self.free.clear();
    }

    fn take_free(&mut self, prototype: PrototypeId) -> Option<Entity> {
        self.free.get_mut(&prototype).and_then(Vec::pop)
    }

    fn retire(&mut self, world: &mut World, entity: Entity) {
        let lifecycle = world.get::<&Lifecycle>(entity).map(|l| *l).ok();
        match lifecycle {
            Some(lifecycle) if lifecycle.pooled && self.enabled => {
                let _ = world.remove_one::<Active>(entity);
                self.free.entry(lifecycle.prototype).or_default().push(entity);
                self.stats.peak_free = self.stats.peak_free.max(self.free_count());
            }
            _ => {
                let _ = world.despawn(entity);
            }
        }
    }
}

/// Resolve a handle to its live entity.
///
/// Fails with `StaleHandle` when the entity was destroyed, is dormant in a
/// pool, or has been re-acquired since the handle was issued.
pub fn resolve_handle(world: &World, handle: EntityHandle) -> SimResult<Entity> {
    let stale = SimError::StaleHandle(handle);
    let entity = Entity::from_bits(handle.id.0).ok_or(stale.clone())?;
    let activation = world
        .get::<&Lifecycle>(entity)
        .map(|l| l.activation)
        .map_err(|_| stale.clone())?;
    if activation != handle.activation || world.get::<&Active>(entity).is_err() {
        return Err(stale);
    }
    Ok(entity)
}

/// Whether `handle` still refers to a live activation.
pub fn is_live(world: &World, handle: EntityHandle) -> bool {
    resolve_handle(world, handle).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use defender_core::components::{ProjectileState, TrailHistory};

    fn setup() -> (World, PrototypeCatalog, EntityPool) {
        (World::new(), PrototypeCatalog::standard(), EntityPool::new(true))
    }

    #[test]
    fn test_acquire_release_reuses_entity() {
        let (mut world, catalog, mut pool) = setup();
        let a = pool
            .acquire(&mut world, &catalog, PrototypeId::ENEMY, Position::new(1.0, 0.0), 0.0)
            .unwrap();
        pool.release(&mut world, a).unwrap();
        assert_eq!(pool.free_count_of(PrototypeId::ENEMY), 1);

        let b = pool
            .acquire(&mut world, &catalog, PrototypeId::ENEMY, Position::new(5.0, 1.0), 0.0)
            .unwrap();
        assert_eq!(a.id, b.id, "released entity should be reused");
        assert_eq!(b.activation, a.activation + 1);
        assert_eq!(pool.stats().hits, 1);
        assert_eq!(pool.stats().misses, 1);

        let entity = resolve_handle(&world, b).unwrap();
        assert_eq!(*world.get::<&Position>(entity).unwrap(), Position::new(5.0, 1.0));
    }

    #[test]
    fn test_pool_never_crosses_prototypes() {
        let (mut world, catalog, mut pool) = setup();
        let shot = pool
            .acquire(&mut world, &catalog, PrototypeId::PLAYER_SHOT, Position::default(), 0.0)
            .unwrap();
        pool.release(&mut world, shot).unwrap();

        let enemy = pool
            .acquire(&mut world, &catalog, PrototypeId::ENEMY, Position::default(), 0.0)
            .unwrap();
        assert_ne!(shot.id, enemy.id);
        let entity = resolve_handle(&world, enemy).unwrap();
        assert_eq!(
            world.get::<&Lifecycle>(entity).unwrap().prototype,
            PrototypeId::ENEMY
        );
        assert_eq!(pool.free_count_of(PrototypeId::PLAYER_SHOT), 1);
    }

    #[test]
    fn test_invalid_prototype() {
        let (mut world, catalog, mut pool) = setup();
        for id in [PrototypeId::UNSET, PrototypeId(77)] {
            let err = pool
                .acquire(&mut world, &catalog, id, Position::default(), 0.0)
                .unwrap_err();
            assert_eq!(err, SimError::InvalidPrototype(id));
        }
        assert_eq!(world.len(), 0);
    }

    #[test]
    fn test_stale_handle_after_release() {
        let (mut world, catalog, mut pool) = setup();
        let a = pool
            .acquire(&mut world, &catalog, PrototypeId::ENEMY, Position::default(), 0.0)
            .unwrap();
        pool.release(&mut world, a).unwrap();

        // Double release is rejected and does not duplicate the free entry.
        assert_eq!(pool.release(&mut world, a), Err(SimError::StaleHandle(a)));
        assert_eq!(pool.free_count(), 1);

        // Re-acquired slot does not revive the old handle.
        let b = pool
            .acquire(&mut world, &catalog, PrototypeId::ENEMY, Position::default(), 0.0)
            .unwrap();
        assert!(!is_live(&world, a));
        assert!(is_live(&world, b));
    }

    #[test]
    fn test_reactivation_clears_state() {
        let (mut world, catalog, mut pool) = setup();
        let a = pool
            .acquire(&mut world, &catalog, PrototypeId::PLAYER_SHOT, Position::default(), 0.0)
            .unwrap();
        let entity = resolve_handle(&world, a).unwrap();
        {
            let mut state = world.get::<&mut ProjectileState>(entity).unwrap();
            state.elapsed = 0.7;
            state.inherited_speed = 12.0;
        }
        world
            .get::<&mut TrailHistory>(entity)
            .unwrap()
            .record(Position::new(3.0, 0.0));
        pool.release(&mut world, a).unwrap();

        let b = pool
            .acquire(&mut world, &catalog, PrototypeId::PLAYER_SHOT, Position::default(), 0.0)
            .unwrap();
        let entity = resolve_handle(&world, b).unwrap();
        let state = *world.get::<&ProjectileState>(entity).unwrap();
        assert_eq!(state.elapsed, 0.0);
        assert_eq!(state.inherited_speed, 0.0);
        assert!(world.get::<&TrailHistory>(entity).unwrap().points.is_empty());
    }

    #[test]
    fn test_disabled_pool_destroys() {
        let (mut world, catalog, mut pool) = setup();
        pool.set_enabled(&mut world, false);
        let a = pool
            .acquire(&mut world, &catalog, PrototypeId::ENEMY, Position::default(), 0.0)
            .unwrap();
        pool.release(&mut world, a).unwrap();
        assert_eq!(world.len(), 0);
        assert_eq!(pool.free_count(), 0);

        let b = pool
            .acquire(&mut world, &catalog, PrototypeId::ENEMY, Position::default(), 0.0)
            .unwrap();
        assert_eq!(pool.stats().hits, 0);
        assert_eq!(pool.stats().misses, 2);
        assert!(is_live(&world, b));
    }

    #[test]
    fn test_reenabled_pool_reclaims_entities_acquired_while_off() {
        let (mut world, catalog, mut pool) = setup();
        pool.set_enabled(&mut world, false);
        let a = pool
            .acquire(&mut world, &catalog, PrototypeId::ENEMY, Position::default(), 0.0)
            .unwrap();
        pool.set_enabled(&mut world, true);

        pool.release(&mut world, a).unwrap();
        assert_eq!(world.len(), 1);
        assert_eq!(pool.free_count_of(PrototypeId::ENEMY), 1);

        let b = pool
            .acquire(&mut world, &catalog, PrototypeId::ENEMY, Position::default(), 0.0)
            .unwrap();
        assert_eq!(a.id, b.id);
        assert_eq!(pool.stats().hits, 1);
    }

    #[test]
    fn test_player_ship_is_never_pooled() {
        let (mut world, catalog, mut pool) = setup();
        let player = world_setup::spawn_player(
            &mut world,
            &catalog,
            PrototypeId::PLAYER_SHIP,
            Position::default(),
        )
        .unwrap();
        pool.release(&mut world, player).unwrap();
        assert_eq!(world.len(), 0);
        assert_eq!(pool.free_count(), 0);
    }

    #[test]
    fn test_disabling_drops_dormant_entities() {
        let (mut world, catalog, mut pool) = setup();
        let handles: Vec<_> = (0..3)
            .map(|_| {
                pool.acquire(&mut world, &catalog, PrototypeId::ENEMY_SHOT, Position::default(), 0.0)
                    .unwrap()
            })
            .collect();
        for h in handles {
            pool.release(&mut world, h).unwrap();
        }
        assert_eq!(world.len(), 3);
        assert_eq!(pool.stats().peak_free, 3);

        pool.set_enabled(&mut world, false);
        assert_eq!(world.len(), 0);
        assert_eq!(pool.free_count(), 0);
    }

    #[test]
    fn test_externally_destroyed_free_entry_is_skipped() {
        let (mut world, catalog, mut pool) = setup();
        let a = pool
            .acquire(&mut world, &catalog, PrototypeId::ENEMY, Position::default(), 0.0)
            .unwrap();
        pool.release(&mut world, a).unwrap();
        world.despawn(Entity::from_bits(a.id.0).unwrap()).unwrap();

        let b = pool
            .acquire(&mut world, &catalog, PrototypeId::ENEMY, Position::default(), 0.0)
            .unwrap();
        assert!(is_live(&world, b));
        assert_eq!(pool.stats().misses, 2);
    }
}
