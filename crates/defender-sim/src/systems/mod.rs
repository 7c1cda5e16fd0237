//! ECS systems that operate on the simulation world each tick.
//!
//! Systems are free functions over `&mut World` (or `&World` when read-only).
//! The engine owns the cross-tick state they need and runs them in a fixed
//! order: pending hits, steering, projectiles, enemy fire, camera, wrap.

pub mod camera;
pub mod combat;
pub mod effects;
pub mod enemy_ai;
pub mod player;
pub mod projectiles;
pub mod snapshot;
pub mod spawner;
pub mod trail;
pub mod wrap;
