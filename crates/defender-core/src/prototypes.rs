//! Prototype catalog: data-driven entity templates.
//!
//! A prototype is what the pool keys on: every pooled entity remembers the
//! prototype it was instantiated from and is only ever handed out again for
//! that same prototype. Tuning records double as ECS components so systems
//! read them without a catalog lookup.

use serde::{Deserialize, Serialize};

use crate::components::HitBox;
use crate::constants::*;
use crate::enums::{EntityKind, WrapPolicy};

/// Identifies a prototype in the catalog. `PrototypeId::UNSET` never resolves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PrototypeId(pub u32);

impl PrototypeId {
    pub const UNSET: PrototypeId = PrototypeId(0);
    pub const PLAYER_SHIP: PrototypeId = PrototypeId(1);
    pub const ENEMY: PrototypeId = PrototypeId(2);
    pub const PLAYER_SHOT: PrototypeId = PrototypeId(3);
    pub const ENEMY_SHOT: PrototypeId = PrototypeId(4);
    pub const PLAYER_DEATH_FX: PrototypeId = PrototypeId(5);
    pub const ENEMY_DEATH_FX: PrototypeId = PrototypeId(6);

    pub fn is_unset(self) -> bool {
        self == Self::UNSET
    }
}

impl std::fmt::Display for PrototypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Player ship handling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerTuning {
    pub lives: u32,
    pub max_speed_x: f64,
    pub max_speed_y: f64,
    pub acceleration_x: f64,
    pub acceleration_y: f64,
    pub brake_damping_x: f64,
    pub brake_damping_y: f64,
    pub fire_rate: f64,
    pub min_speed_fraction: f64,
    pub vertical_margin: f64,
    pub camera_offset_x: f64,
    pub camera_follow_speed: f64,
    /// Cannon offset in ship space; x is mirrored when facing left.
    pub cannon_offset_x: f64,
    pub cannon_offset_y: f64,
    pub projectile: PrototypeId,
    pub death_effect: PrototypeId,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            lives: PLAYER_LIVES,
            max_speed_x: PLAYER_MAX_SPEED_X,
            max_speed_y: PLAYER_MAX_SPEED_Y,
            acceleration_x: PLAYER_ACCELERATION_X,
            acceleration_y: PLAYER_ACCELERATION_Y,
            brake_damping_x: PLAYER_BRAKE_DAMPING_X,
            brake_damping_y: PLAYER_BRAKE_DAMPING_Y,
            fire_rate: PLAYER_FIRE_RATE,
            min_speed_fraction: PLAYER_MIN_SPEED_FRACTION,
            vertical_margin: PLAYER_VERTICAL_MARGIN,
            camera_offset_x: PLAYER_CAMERA_OFFSET_X,
            camera_follow_speed: PLAYER_CAMERA_FOLLOW_SPEED,
            cannon_offset_x: 0.6,
            cannon_offset_y: -0.1,
            projectile: PrototypeId::PLAYER_SHOT,
            death_effect: PrototypeId::PLAYER_DEATH_FX,
        }
    }
}

/// Enemy patrol and fire behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemyTuning {
    pub speed: f64,
    pub flip_rate: f64,
    pub vertical_step: f64,
    pub edge_margin: f64,
    pub score_value: u64,
    pub fire_interval: f64,
    pub projectile: PrototypeId,
    pub death_effect: PrototypeId,
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            speed: ENEMY_SPEED,
            flip_rate: ENEMY_FLIP_RATE,
            vertical_step: ENEMY_VERTICAL_STEP,
            edge_margin: ENEMY_EDGE_MARGIN,
            score_value: ENEMY_SCORE_VALUE,
            fire_interval: ENEMY_FIRE_INTERVAL,
            projectile: PrototypeId::ENEMY_SHOT,
            death_effect: PrototypeId::ENEMY_DEATH_FX,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectileTuning {
    pub speed: f64,
    pub lifetime: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectTuning {
    /// Seconds until the effect completes and returns to its pool.
    pub duration: f64,
}

/// Kind-specific behaviour of a prototype.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Behavior {
    Player(PlayerTuning),
    Enemy(EnemyTuning),
    PlayerProjectile(ProjectileTuning),
    EnemyProjectile(ProjectileTuning),
    Effect(EffectTuning),
}

impl Behavior {
    pub fn kind(&self) -> EntityKind {
        match self {
            Behavior::Player(_) => EntityKind::Player,
            Behavior::Enemy(_) => EntityKind::Enemy,
            Behavior::PlayerProjectile(_) => EntityKind::PlayerProjectile,
            Behavior::EnemyProjectile(_) => EntityKind::EnemyProjectile,
            Behavior::Effect(_) => EntityKind::Effect,
        }
    }
}

/// A named entity template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prototype {
    pub id: PrototypeId,
    pub name: String,
    pub behavior: Behavior,
    pub hit_box: HitBox,
    /// Number of trail points recorded; 0 disables the trail.
    #[serde(default)]
    pub trail_length: usize,
    #[serde(default)]
    pub wrap: WrapPolicy,
}

/// All prototypes available to a session, ordered by id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrototypeCatalog {
    prototypes: Vec<Prototype>,
}

impl PrototypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a prototype. The unset id is ignored.
    pub fn insert(&mut self, prototype: Prototype) {
        if prototype.id.is_unset() {
            return;
        }
        match self.prototypes.binary_search_by_key(&prototype.id, |p| p.id) {
            Ok(idx) => self.prototypes[idx] = prototype,
            Err(idx) => self.prototypes.insert(idx, prototype),
        }
    }

    pub fn get(&self, id: PrototypeId) -> Option<&Prototype> {
        self.prototypes
            .binary_search_by_key(&id, |p| p.id)
            .ok()
            .map(|idx| &self.prototypes[idx])
    }

    pub fn len(&self) -> usize {
        self.prototypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prototypes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Prototype> {
        self.prototypes.iter()
    }

    /// The stock catalog: one ship, one enemy, two shots and two death bursts.
    pub fn standard() -> Self {
        let mut catalog = Self::new();
        catalog.insert(Prototype {
            id: PrototypeId::PLAYER_SHIP,
            name: "player_ship".into(),
            behavior: Behavior::Player(PlayerTuning::default()),
            hit_box: HitBox::new(0.5, 0.25),
            trail_length: 0,
            wrap: WrapPolicy::CenterHalfWidth,
        });
        catalog.insert(Prototype {
            id: PrototypeId::ENEMY,
            name: "enemy".into(),
            behavior: Behavior::Enemy(EnemyTuning::default()),
            hit_box: HitBox::new(0.5, 0.5),
            trail_length: 0,
            wrap: WrapPolicy::CenterHalfWidth,
        });
        catalog.insert(Prototype {
            id: PrototypeId::PLAYER_SHOT,
            name: "player_shot".into(),
            behavior: Behavior::PlayerProjectile(ProjectileTuning {
                speed: PLAYER_PROJECTILE_SPEED,
                lifetime: PLAYER_PROJECTILE_LIFETIME,
            }),
            hit_box: HitBox::new(0.1, 0.05),
            trail_length: PROJECTILE_TRAIL_LENGTH,
            wrap: WrapPolicy::CenterHalfWidth,
        });
        catalog.insert(Prototype {
            id: PrototypeId::ENEMY_SHOT,
            name: "enemy_shot".into(),
            behavior: Behavior::EnemyProjectile(ProjectileTuning {
                speed: ENEMY_PROJECTILE_SPEED,
                lifetime: ENEMY_PROJECTILE_LIFETIME,
            }),
            hit_box: HitBox::new(0.1, 0.1),
            trail_length: 0,
            wrap: WrapPolicy::CenterHalfWidth,
        });
        for (id, name) in [
            (PrototypeId::PLAYER_DEATH_FX, "player_death_fx"),
            (PrototypeId::ENEMY_DEATH_FX, "enemy_death_fx"),
        ] {
            catalog.insert(Prototype {
                id,
                name: name.into(),
                behavior: Behavior::Effect(EffectTuning {
                    duration: DEATH_EFFECT_DURATION,
                }),
                hit_box: HitBox::new(0.0, 0.0),
                trail_length: 0,
                wrap: WrapPolicy::AreaBounds,
            });
        }
        catalog
    }
}
