//! Headless defender runner.
//!
//! Usage: `defender-app [config.json] [seconds]`
//!
//! Plays the game with a simple autopilot that weaves across the play area
//! and keeps firing, pressing submit whenever the game is over. Set
//! `RUST_LOG=debug` to watch spawns and pool traffic.

use std::error::Error;
use std::time::{Duration, Instant};

use defender_app::state::{AppState, GameLoopCommand};
use defender_core::commands::TickInput;
use defender_core::config::SimConfig;
use defender_core::enums::GamePhase;
use defender_core::state::GameStateSnapshot;

/// Input for the autopilot at `t` seconds into the run.
fn autopilot(t: f64, snapshot: Option<&GameStateSnapshot>) -> TickInput {
    let game_over = snapshot.is_some_and(|s| s.phase == GamePhase::GameOver);
    TickInput {
        // Reverse every 6 s so the camera lead swings both ways.
        move_x: if (t / 6.0).floor() as i64 % 2 == 0 { 1.0 } else { -1.0 },
        move_y: (t * 0.8).sin(),
        fire: true,
        submit: game_over,
    }
}

fn load_config(path: Option<&String>) -> Result<SimConfig, Box<dyn Error>> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)?;
            Ok(SimConfig::from_json(&json)?)
        }
        None => Ok(SimConfig::default()),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = load_config(args.first())?;
    let seconds: f64 = match args.get(1) {
        Some(s) => s.parse()?,
        None => 30.0,
    };

    let state = AppState::new();
    state.start(config)?;
    log::info!("running autopilot for {seconds} s");

    let started = Instant::now();
    let mut last_report = 0;
    while started.elapsed().as_secs_f64() < seconds {
        let t = started.elapsed().as_secs_f64();
        let snapshot = state.snapshot()?;
        state.send(GameLoopCommand::Input(autopilot(t, snapshot.as_ref())))?;

        if let Some(snap) = snapshot {
            let whole = t as u64;
            if whole > last_report {
                last_report = whole;
                if let Some(player) = snap.player {
                    log::info!(
                        "t={:.1}s phase={:?} entities={} lives={} score={} pool hits/misses={}/{}",
                        snap.time.elapsed_secs,
                        snap.phase,
                        snap.entities.len(),
                        player.lives,
                        player.score,
                        snap.pool.hits,
                        snap.pool.misses
                    );
                }
            }
        }
        std::thread::sleep(Duration::from_millis(50));
    }

    state.stop()?;
    Ok(())
}
