//! Game loop thread: runs the simulation engine at the configured tick rate.
//!
//! The engine is created inside this thread so it never crosses threads.
//! Input and commands arrive via `mpsc` channel. Snapshots are stored in
//! shared state for polling.

use std::io;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use defender_core::commands::TickInput;
use defender_core::config::SimConfig;
use defender_core::state::GameStateSnapshot;
use defender_sim::SimulationEngine;

use crate::state::GameLoopCommand;

/// Wall-clock duration of one tick at `tick_rate`.
pub fn tick_duration(tick_rate: u32) -> Duration {
    Duration::from_nanos(1_000_000_000 / u64::from(tick_rate.max(1)))
}

/// Spawns the game loop in a new thread.
///
/// Returns the command sender and the thread handle.
pub fn spawn_game_loop(
    config: SimConfig,
    latest_snapshot: Arc<Mutex<Option<GameStateSnapshot>>>,
) -> io::Result<(mpsc::Sender<GameLoopCommand>, JoinHandle<()>)> {
    let (cmd_tx, cmd_rx) = mpsc::channel::<GameLoopCommand>();

    let handle = std::thread::Builder::new()
        .name("defender-game-loop".into())
        .spawn(move || {
            run_game_loop(config, cmd_rx, &latest_snapshot);
        })?;

    Ok((cmd_tx, handle))
}

/// Drain pending messages into the engine. Returns `false` once the loop
/// should stop.
fn drain_commands(
    engine: &mut SimulationEngine,
    input: &mut TickInput,
    cmd_rx: &mpsc::Receiver<GameLoopCommand>,
) -> bool {
    loop {
        match cmd_rx.try_recv() {
            Ok(GameLoopCommand::Input(next)) => *input = next,
            Ok(GameLoopCommand::Command(cmd)) => engine.queue_command(cmd),
            Ok(GameLoopCommand::Shutdown) => return false,
            Err(mpsc::TryRecvError::Empty) => return true,
            Err(mpsc::TryRecvError::Disconnected) => return false,
        }
    }
}

/// The game loop. Runs until Shutdown command or channel disconnect.
fn run_game_loop(
    config: SimConfig,
    cmd_rx: mpsc::Receiver<GameLoopCommand>,
    latest_snapshot: &Mutex<Option<GameStateSnapshot>>,
) {
    let dt = config.dt();
    let tick = tick_duration(config.tick_rate);
    let mut engine = match SimulationEngine::new(config) {
        Ok(engine) => engine,
        Err(e) => {
            log::error!("cannot start simulation: {e}");
            return;
        }
    };
    let mut input = TickInput::default();
    let mut next_tick_time = Instant::now();

    loop {
        // 1. Drain all pending messages
        if !drain_commands(&mut engine, &mut input, &cmd_rx) {
            break;
        }

        // 2. Advance one fixed step (engine handles pause internally)
        let snapshot = engine.tick(&input, dt);
        // Submit is a one-shot press.
        input.submit = false;

        // 3. Store latest snapshot for polling
        if let Ok(mut lock) = latest_snapshot.lock() {
            *lock = Some(snapshot);
        }

        // 4. Sleep until next tick
        next_tick_time += tick;
        let now = Instant::now();
        if next_tick_time > now {
            std::thread::sleep(next_tick_time - now);
        } else if now - next_tick_time > tick * 2 {
            // Too far behind; reset to avoid catch-up spiral
            next_tick_time = now;
        }
    }

    engine.end_session();
    log::info!("game loop stopped after {} ticks", engine.time().tick);
}

#[cfg(test)]
mod tests {
    use super::*;
    use defender_core::commands::PlayerCommand;
    use defender_core::enums::GamePhase;

    fn config_dt() -> f64 {
        SimConfig::default().dt()
    }

    #[test]
    fn test_command_channel_round_trip() {
        let (tx, rx) = mpsc::channel::<GameLoopCommand>();

        tx.send(GameLoopCommand::Input(TickInput {
            fire: true,
            ..Default::default()
        }))
        .unwrap();
        tx.send(GameLoopCommand::Command(PlayerCommand::Pause))
            .unwrap();
        tx.send(GameLoopCommand::Shutdown).unwrap();

        let mut commands = Vec::new();
        while let Ok(cmd) = rx.try_recv() {
            commands.push(cmd);
        }

        assert_eq!(commands.len(), 3);
        assert!(matches!(commands[0], GameLoopCommand::Input(i) if i.fire));
        assert!(matches!(
            commands[1],
            GameLoopCommand::Command(PlayerCommand::Pause)
        ));
        assert!(matches!(commands[2], GameLoopCommand::Shutdown));
    }

    #[test]
    fn test_drain_stops_on_shutdown() {
        let mut engine = SimulationEngine::new(SimConfig::default()).unwrap();
        let mut input = TickInput::default();
        let (tx, rx) = mpsc::channel::<GameLoopCommand>();

        tx.send(GameLoopCommand::Input(TickInput {
            move_x: 1.0,
            ..Default::default()
        }))
        .unwrap();
        tx.send(GameLoopCommand::Command(PlayerCommand::Pause))
            .unwrap();
        assert!(drain_commands(&mut engine, &mut input, &rx));
        assert_eq!(input.move_x, 1.0);
        let snap = engine.tick(&input, config_dt());
        assert_eq!(snap.phase, GamePhase::Paused);

        tx.send(GameLoopCommand::Shutdown).unwrap();
        assert!(!drain_commands(&mut engine, &mut input, &rx));
        drop(tx);
        assert!(!drain_commands(&mut engine, &mut input, &rx));
    }

    #[test]
    fn test_snapshot_serialization_under_3ms() {
        let mut engine = SimulationEngine::new(SimConfig::default()).unwrap();
        let input = TickInput {
            fire: true,
            move_x: 1.0,
            ..Default::default()
        };

        // Run enough ticks to populate entities
        for _ in 0..600 {
            engine.tick(&input, config_dt());
        }

        let snapshot = engine.tick(&input, config_dt());
        let start = Instant::now();
        let json = serde_json::to_string(&snapshot).unwrap();
        let elapsed = start.elapsed();

        assert!(
            elapsed < Duration::from_millis(3),
            "Snapshot serialization took {:?}, should be <3ms",
            elapsed
        );
        assert!(!json.is_empty());
    }

    #[test]
    fn test_loop_thread_publishes_snapshots() {
        let latest = Arc::new(Mutex::new(None));
        let (tx, handle) = spawn_game_loop(SimConfig::default(), latest.clone()).unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while latest.lock().unwrap().is_none() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        tx.send(GameLoopCommand::Shutdown).unwrap();
        handle.join().unwrap();

        let snap = latest.lock().unwrap().clone().unwrap();
        assert!(snap.time.tick >= 1);
        assert!(snap.player.is_some());
    }

    #[test]
    fn test_tick_duration() {
        // 60Hz = 16.666ms per tick
        assert_eq!(tick_duration(60).as_nanos(), 1_000_000_000u128 / 60);
        assert_eq!(tick_duration(0), Duration::from_secs(1));
    }
}
