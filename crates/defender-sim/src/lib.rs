//! Simulation engine for the wrap-around shooter.
//!
//! Owns the hecs ECS world, the entity pool and the session's map, runs the
//! per-tick system pipeline and produces `GameStateSnapshot`s for the host.

pub mod engine;
pub mod map;
pub mod pool;
pub mod sweep;
pub mod systems;
pub mod world_setup;

pub use defender_core as core;
pub use engine::SimulationEngine;
