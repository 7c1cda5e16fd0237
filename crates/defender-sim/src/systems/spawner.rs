//! Enemy spawner: timed, capped spawning inside a rectangle.

use hecs::World;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use defender_core::config::SpawnerConfig;
use defender_core::prototypes::PrototypeCatalog;
use defender_core::types::{EntityHandle, Position};

use crate::pool::{is_live, EntityPool};

fn range(rng: &mut ChaCha8Rng, lo: f64, hi: f64) -> f64 {
    if hi > lo {
        rng.gen_range(lo..hi)
    } else {
        lo
    }
}

/// Spawner state carried across ticks.
#[derive(Debug, Clone)]
pub struct Spawner {
    config: SpawnerConfig,
    timer: f64,
    /// Handles of spawned enemies still alive.
    spawned: Vec<EntityHandle>,
}

impl Spawner {
    pub fn new(config: SpawnerConfig, rng: &mut ChaCha8Rng) -> Self {
        let mut spawner = Self {
            config,
            timer: 0.0,
            spawned: Vec::new(),
        };
        spawner.randomize_timer(rng);
        spawner
    }

    /// Seconds until the next spawn attempt.
    pub fn timer(&self) -> f64 {
        self.timer
    }

    pub fn alive(&self) -> usize {
        self.spawned.len()
    }

    fn randomize_timer(&mut self, rng: &mut ChaCha8Rng) {
        self.timer = range(rng, self.config.interval_min, self.config.interval_max);
    }

    /// Count down and spawn one enemy when due and under the cap.
    /// Returns the new enemy's handle, if any.
    pub fn run(
        &mut self,
        world: &mut World,
        pool: &mut EntityPool,
        catalog: &PrototypeCatalog,
        rng: &mut ChaCha8Rng,
        dt: f64,
    ) -> Option<EntityHandle> {
        if !self.config.enabled {
            return None;
        }
        // Killed or despawned enemies free their slot.
        self.spawned.retain(|&handle| is_live(world, handle));

        self.timer -= dt;
        if self.timer > 0.0 || self.spawned.len() >= self.config.max_alive {
            return None;
        }

        let [x, y, w, h] = self.config.area;
        let position = Position::new(
            self.config.origin.x + range(rng, x, x + w),
            self.config.origin.y + range(rng, y, y + h),
        );
        let spawned = pool.acquire(world, catalog, self.config.prototype, position, 0.0);
        self.randomize_timer(rng);
        match spawned {
            Ok(handle) => {
                log::debug!(
                    "spawned enemy {} at ({:.2}, {:.2}), {} alive",
                    handle,
                    position.x,
                    position.y,
                    self.spawned.len() + 1
                );
                self.spawned.push(handle);
                Some(handle)
            }
            Err(e) => {
                log::warn!("spawner failed: {e}");
                None
            }
        }
    }
}
