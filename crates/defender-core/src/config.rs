//! Session configuration.
//!
//! Everything here is plain serde data so hosts can ship it as JSON.
//! `Default` reproduces the stock arcade tuning.

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::prototypes::{PrototypeCatalog, PrototypeId};
use crate::types::Position;

/// Play-area dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    /// Wrap modulus along x.
    pub width: f64,
    pub y_min: f64,
    pub y_max: f64,
    /// Left edge of the explicit wrap area, relative to the camera.
    /// `None` centres the area (`-width / 2`).
    #[serde(default)]
    pub x_min: Option<f64>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: MAP_WIDTH,
            y_min: -MAP_HEIGHT / 2.0,
            y_max: MAP_HEIGHT / 2.0,
            x_min: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    pub snap_distance: f64,
    pub slow_follow_fraction: f64,
    /// Enemies only fire while this close to the camera horizontally.
    pub view_half_width: f64,
    /// Fixed camera height.
    pub y: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            snap_distance: CAMERA_SNAP_DISTANCE,
            slow_follow_fraction: CAMERA_SLOW_FOLLOW_FRACTION,
            view_half_width: CAMERA_VIEW_HALF_WIDTH,
            y: 0.0,
        }
    }
}

/// Timed enemy spawning inside a rectangle around `origin`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnerConfig {
    pub enabled: bool,
    pub prototype: PrototypeId,
    pub origin: Position,
    /// Spawn rectangle as (x, y, width, height) relative to `origin`.
    pub area: [f64; 4],
    pub interval_min: f64,
    pub interval_max: f64,
    pub max_alive: usize,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            prototype: PrototypeId::ENEMY,
            origin: Position::default(),
            area: [-32.0, -2.0, 64.0, 4.0],
            interval_min: SPAWN_INTERVAL_MIN,
            interval_max: SPAWN_INTERVAL_MAX,
            max_alive: SPAWN_MAX_ALIVE,
        }
    }
}

/// Configuration for starting a new simulation session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// RNG seed for determinism. Same seed and inputs = same simulation.
    pub seed: u64,
    /// Rate the host drives `tick` at.
    pub tick_rate: u32,
    pub map: MapConfig,
    pub camera: CameraConfig,
    pub spawner: SpawnerConfig,
    /// Reuse released entities instead of destroying them.
    pub pooling_enabled: bool,
    /// Prototype of the player ship spawned at session start.
    pub player_prototype: PrototypeId,
    pub prototypes: PrototypeCatalog,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            tick_rate: TICK_RATE,
            map: MapConfig::default(),
            camera: CameraConfig::default(),
            spawner: SpawnerConfig::default(),
            pooling_enabled: true,
            player_prototype: PrototypeId::PLAYER_SHIP,
            prototypes: PrototypeCatalog::standard(),
        }
    }
}

impl SimConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Seconds per tick at `tick_rate`.
    pub fn dt(&self) -> f64 {
        1.0 / self.tick_rate.max(1) as f64
    }
}
