//! Entity spawn factories.
//!
//! Turns a prototype into a full component bundle. The same bundle is used
//! both for fresh instantiation and for re-activating a pooled entity, so
//! every activation starts from zeroed per-activation state.

use hecs::{EntityBuilder, World};

use defender_core::components::*;
use defender_core::error::{SimError, SimResult};
use defender_core::prototypes::{Behavior, Prototype, PrototypeCatalog, PrototypeId};
use defender_core::types::{EntityHandle, Position, Velocity};

use crate::pool::entity_id;

/// Build the component bundle for one activation of `prototype`.
pub fn build_components(
    prototype: &Prototype,
    position: Position,
    rotation: f64,
    lifecycle: Lifecycle,
) -> EntityBuilder {
    let mut builder = EntityBuilder::new();
    builder
        .add(Active)
        .add(lifecycle)
        .add(prototype.behavior.kind())
        .add(position)
        .add(Rotation { radians: rotation })
        .add(Velocity::default())
        .add(prototype.hit_box)
        .add(WrapRule {
            policy: prototype.wrap,
        });

    match prototype.behavior {
        Behavior::Player(tuning) => {
            builder
                .add(tuning)
                .add(ShipControl::default())
                .add(PlayerStats::new(tuning.lives));
        }
        Behavior::Enemy(tuning) => {
            builder.add(tuning).add(EnemyBrain::default());
        }
        Behavior::PlayerProjectile(tuning) | Behavior::EnemyProjectile(tuning) => {
            builder.add(tuning).add(ProjectileState::default());
        }
        Behavior::Effect(tuning) => {
            builder.add(tuning).add(EffectState::default());
        }
    }

    if prototype.trail_length > 0 {
        builder.add(TrailHistory::with_capacity(prototype.trail_length));
    }

    builder
}

/// Spawn the player ship. Players are never pool-managed: releasing one
/// destroys it.
pub fn spawn_player(
    world: &mut World,
    catalog: &PrototypeCatalog,
    prototype: PrototypeId,
    position: Position,
) -> SimResult<EntityHandle> {
    let proto = catalog
        .get(prototype)
        .filter(|p| matches!(p.behavior, Behavior::Player(_)))
        .ok_or(SimError::InvalidPrototype(prototype))?;

    let lifecycle = Lifecycle {
        prototype,
        pooled: false,
        activation: 1,
    };
    let mut builder = build_components(proto, position, 0.0, lifecycle);
    let entity = world.spawn(builder.build());
    log::debug!(
        "spawned player {} at ({:.2}, {:.2})",
        entity_id(entity),
        position.x,
        position.y
    );

    Ok(EntityHandle {
        id: entity_id(entity),
        activation: 1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use defender_core::enums::EntityKind;

    #[test]
    fn test_player_bundle() {
        let mut world = World::new();
        let catalog = PrototypeCatalog::standard();
        let handle =
            spawn_player(&mut world, &catalog, PrototypeId::PLAYER_SHIP, Position::default())
                .unwrap();
        let entity = hecs::Entity::from_bits(handle.id.0).unwrap();

        assert_eq!(*world.get::<&EntityKind>(entity).unwrap(), EntityKind::Player);
        assert_eq!(world.get::<&PlayerStats>(entity).unwrap().lives, 5);
        assert!(!world.get::<&Lifecycle>(entity).unwrap().pooled);
        assert!(world.get::<&TrailHistory>(entity).is_err());
    }

    #[test]
    fn test_player_requires_player_prototype() {
        let mut world = World::new();
        let catalog = PrototypeCatalog::standard();
        let err = spawn_player(&mut world, &catalog, PrototypeId::ENEMY, Position::default())
            .unwrap_err();
        assert_eq!(err, SimError::InvalidPrototype(PrototypeId::ENEMY));
        assert_eq!(world.len(), 0);
    }

    #[test]
    fn test_projectile_bundle_has_trail() {
        let catalog = PrototypeCatalog::standard();
        let proto = catalog.get(PrototypeId::PLAYER_SHOT).unwrap();
        let mut world = World::new();
        let lifecycle = Lifecycle {
            prototype: proto.id,
            pooled: true,
            activation: 1,
        };
        let entity = world.spawn(
            build_components(proto, Position::new(1.0, 2.0), 0.0, lifecycle).build(),
        );
        assert_eq!(world.get::<&TrailHistory>(entity).unwrap().capacity, 5);
        assert_eq!(
            world.get::<&ProjectileState>(entity).unwrap().phase,
            defender_core::enums::ProjectilePhase::Flying
        );
    }
}
