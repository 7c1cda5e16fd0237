//! Simulation engine: the core of the game.
//!
//! `SimulationEngine` owns the session: the hecs ECS world, the map
//! registry, the entity pool, the camera and the cross-tick combat state.
//! It processes commands, runs all systems in a fixed order and produces
//! `GameStateSnapshot`s. Completely headless, enabling deterministic testing.

use std::collections::VecDeque;

use hecs::{Entity, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use defender_core::commands::{PlayerCommand, TickInput};
use defender_core::components::PlayerStats;
use defender_core::config::SimConfig;
use defender_core::constants::MAX_FRAME_DT;
use defender_core::enums::GamePhase;
use defender_core::error::{SimError, SimResult};
use defender_core::events::GameEvent;
use defender_core::prototypes::PrototypeId;
use defender_core::state::GameStateSnapshot;
use defender_core::types::{EntityHandle, Position, SessionId, SimTime};

use crate::map::{Map, MapRegistry};
use crate::pool::{self, EntityPool, PoolStats};
use crate::systems;
use crate::systems::camera::Camera;
use crate::systems::combat::PendingHit;
use crate::systems::projectiles::ShotRequest;
use crate::systems::spawner::Spawner;
use crate::world_setup;

/// The simulation engine. Owns the ECS world and all sim state.
pub struct SimulationEngine {
    config: SimConfig,
    world: World,
    maps: MapRegistry,
    session: SessionId,
    pool: EntityPool,
    time: SimTime,
    phase: GamePhase,
    rng: ChaCha8Rng,
    camera: Camera,
    player: Option<EntityHandle>,
    spawner: Spawner,
    command_queue: VecDeque<PlayerCommand>,
    pending_hits: Vec<PendingHit>,
    shot_requests: Vec<ShotRequest>,
    release_buffer: Vec<Entity>,
    events: Vec<GameEvent>,
}

impl SimulationEngine {
    /// Create an engine and start its first session.
    ///
    /// Fails when the map dimensions are unusable or the configured player
    /// prototype is not a player ship.
    pub fn new(config: SimConfig) -> SimResult<Self> {
        let map = Map::from_config(&config.map)?;
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let spawner = Spawner::new(config.spawner, &mut rng);
        let mut engine = Self {
            world: World::new(),
            maps: MapRegistry::new(),
            session: SessionId(0),
            pool: EntityPool::new(config.pooling_enabled),
            time: SimTime::default(),
            phase: GamePhase::default(),
            rng,
            camera: Camera::default(),
            player: None,
            spawner,
            command_queue: VecDeque::new(),
            pending_hits: Vec::new(),
            shot_requests: Vec::new(),
            release_buffer: Vec::new(),
            events: Vec::new(),
            config,
        };
        engine.start_session(map)?;
        Ok(engine)
    }

    /// Register the map, spawn the player at the origin and put the camera
    /// on it.
    fn start_session(&mut self, map: Map) -> SimResult<()> {
        self.session = SessionId(self.session.0 + 1);
        self.maps.register(self.session, map);
        self.camera = Camera {
            x: 0.0,
            y: self.config.camera.y,
        };
        let player = world_setup::spawn_player(
            &mut self.world,
            &self.config.prototypes,
            self.config.player_prototype,
            Position::default(),
        )?;
        self.player = Some(player);
        self.phase = GamePhase::Running;
        log::info!(
            "{} started: map width {}, seed {}, pooling {}",
            self.session,
            map.width(),
            self.config.seed,
            if self.pool.is_enabled() { "on" } else { "off" }
        );
        Ok(())
    }

    /// Drop everything the session owns: entities, free lists, pending
    /// hits, queued shots and the map registration.
    fn teardown(&mut self) {
        self.maps.unload(self.session);
        // Despawn individually: `World::clear` resets generations, which would
        // let old-session handles resolve against new entities.
        let entities: Vec<Entity> = self.world.iter().map(|e| e.entity()).collect();
        for entity in entities {
            let _ = self.world.despawn(entity);
        }
        self.pool.clear();
        self.pending_hits.clear();
        self.shot_requests.clear();
        self.release_buffer.clear();
        self.player = None;
    }

    /// Tear the session down and rebuild it from the same config.
    pub fn restart(&mut self) -> SimResult<()> {
        let map = Map::from_config(&self.config.map)?;
        self.teardown();
        self.time = SimTime::default();
        self.spawner = Spawner::new(self.config.spawner, &mut self.rng);
        self.start_session(map)?;
        self.events.push(GameEvent::SessionRestarted);
        Ok(())
    }

    /// End the session. Later ticks find no map and do nothing.
    pub fn end_session(&mut self) {
        self.teardown();
        self.phase = GamePhase::Ended;
        log::info!("{} ended", self.session);
    }

    /// Queue a command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: PlayerCommand) {
        self.command_queue.push_back(command);
    }

    /// Advance the simulation by `dt` seconds and return the resulting
    /// snapshot. `dt` is clamped to `[0, MAX_FRAME_DT]`.
    pub fn tick(&mut self, input: &TickInput, dt: f64) -> GameStateSnapshot {
        self.process_commands();

        let input = input.sanitized();
        let dt = if dt.is_finite() {
            dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };

        if self.phase == GamePhase::GameOver && input.submit {
            if let Err(e) = self.restart() {
                log::warn!("restart failed: {e}");
            }
        }

        if self.phase != GamePhase::Paused {
            match self.run_systems(&input, dt) {
                Ok(()) => self.time.advance(dt),
                Err(e) => log::warn!("tick skipped: {e}"),
            }
        }

        let events = std::mem::take(&mut self.events);
        systems::snapshot::build_snapshot(
            &self.world,
            &self.time,
            self.phase,
            &self.camera,
            events,
            &self.pool,
        )
    }

    /// Spawn an entity of `prototype` through the pool.
    pub fn spawn(
        &mut self,
        prototype: PrototypeId,
        position: Position,
        rotation: f64,
    ) -> SimResult<EntityHandle> {
        if self.maps.find(self.session).is_err() {
            log::warn!("spawn of {prototype} outside an active session");
            return Err(SimError::NoActiveMap(self.session));
        }
        self.pool.acquire(
            &mut self.world,
            &self.config.prototypes,
            prototype,
            position,
            rotation,
        )
    }

    /// Return an entity to its pool, or destroy it if it is not pool-managed.
    pub fn despawn(&mut self, handle: EntityHandle) -> SimResult<()> {
        self.pool.release(&mut self.world, handle).map_err(|e| {
            log::warn!("despawn failed: {e}");
            e
        })
    }

    /// Switch entity reuse on or off for this session.
    pub fn set_pooling_enabled(&mut self, enabled: bool) {
        self.pool.set_enabled(&mut self.world, enabled);
    }

    /// Map of the active session.
    pub fn map(&self) -> SimResult<&Map> {
        self.maps.find(self.session)
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Get the current game phase.
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Get the current simulation time.
    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn camera(&self) -> Camera {
        self.camera
    }

    /// Handle of the player ship spawned for this session.
    pub fn player_handle(&self) -> Option<EntityHandle> {
        self.player
    }

    pub fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }

    /// Hits waiting for the next combat pass.
    pub fn pending_hits(&self) -> &[PendingHit] {
        &self.pending_hits
    }

    /// Get a read-only reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable world access for tests that stage exact positions.
    #[cfg(test)]
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Process all queued commands.
    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    /// Handle a single command.
    fn handle_command(&mut self, command: PlayerCommand) {
        match command {
            PlayerCommand::Pause => {
                if matches!(self.phase, GamePhase::Running | GamePhase::GameOver) {
                    self.phase = GamePhase::Paused;
                }
            }
            PlayerCommand::Resume => {
                if self.phase == GamePhase::Paused {
                    self.phase = if self.player_is_game_over() {
                        GamePhase::GameOver
                    } else {
                        GamePhase::Running
                    };
                }
            }
            PlayerCommand::Restart => {
                if let Err(e) = self.restart() {
                    log::warn!("restart failed: {e}");
                }
            }
        }
    }

    fn player_is_game_over(&self) -> bool {
        self.player
            .and_then(|h| pool::resolve_handle(&self.world, h).ok())
            .and_then(|e| self.world.get::<&PlayerStats>(e).ok().map(|s| s.is_game_over()))
            .unwrap_or(false)
    }

    /// Run all systems in order.
    fn run_systems(&mut self, input: &TickInput, dt: f64) -> SimResult<()> {
        let map = *self.maps.find(self.session)?;
        let tick = self.time.tick;
        let catalog = &self.config.prototypes;

        // 1. Last tick's hits, before anything moves
        systems::combat::resolve_pending(
            &mut self.world,
            &mut self.pool,
            catalog,
            &mut self.pending_hits,
            tick,
            &mut self.events,
        );
        // 2. Enemy spawning
        self.spawner
            .run(&mut self.world, &mut self.pool, catalog, &mut self.rng, dt);
        // 3. Player steering + cannon
        systems::player::run(&mut self.world, input, &map, dt, &mut self.shot_requests);
        // 4. Enemy patrol + fire
        systems::enemy_ai::run(
            &mut self.world,
            &mut self.rng,
            &map,
            &self.camera,
            self.config.camera.view_half_width,
            dt,
            &mut self.shot_requests,
        );
        // 5. Projectile travel (sweeps, expiry)
        systems::projectiles::run(
            &mut self.world,
            &map,
            tick,
            dt,
            &mut self.pending_hits,
            &mut self.release_buffer,
            &mut self.events,
        );
        // 6. Launch this tick's shots; they start moving next tick
        systems::projectiles::launch(
            &mut self.world,
            &mut self.pool,
            catalog,
            &mut self.shot_requests,
            &mut self.events,
        );
        // 7. Effects
        systems::effects::run(&mut self.world, dt, &mut self.release_buffer);
        // 8. Enemy fire against the player
        systems::combat::resolve_enemy_fire(
            &mut self.world,
            &mut self.pool,
            catalog,
            &map,
            &mut self.events,
        );
        // 9. Return expired projectiles and finished effects
        for entity in self.release_buffer.drain(..) {
            self.pool.release_entity(&mut self.world, entity);
        }
        // 10. Trails
        systems::trail::run(&mut self.world);
        // 11. Camera
        systems::camera::run(&mut self.world, &mut self.camera, &self.config.camera, dt);
        // 12. Wrap (camera first, then every entity against it)
        systems::wrap::run(&mut self.world, &map, &mut self.camera, &mut self.events);

        if self.phase == GamePhase::Running && self.player_is_game_over() {
            self.phase = GamePhase::GameOver;
        }
        Ok(())
    }
}
