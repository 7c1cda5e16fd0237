//! Host state shared between the caller and the game loop thread.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use defender_core::commands::{PlayerCommand, TickInput};
use defender_core::config::SimConfig;
use defender_core::state::GameStateSnapshot;

use crate::game_loop;

/// Messages sent from the host to the game loop thread.
#[derive(Debug)]
pub enum GameLoopCommand {
    /// Input applied to every tick until replaced.
    Input(TickInput),
    /// A player command to forward to the simulation engine.
    Command(PlayerCommand),
    /// Shut down the game loop thread gracefully.
    Shutdown,
}

/// Shared host state.
///
/// - `mpsc::Sender` sits behind a `Mutex` since it is `Send` but not `Sync`
/// - the latest snapshot is shared with the game loop thread
pub struct AppState {
    /// `None` until [`AppState::start`] is called.
    pub command_tx: Mutex<Option<mpsc::Sender<GameLoopCommand>>>,
    /// Updated by the game loop thread after each tick.
    pub latest_snapshot: Arc<Mutex<Option<GameStateSnapshot>>>,
    loop_thread: Mutex<Option<JoinHandle<()>>>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            command_tx: Mutex::new(None),
            latest_snapshot: Arc::new(Mutex::new(None)),
            loop_thread: Mutex::new(None),
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.command_tx.lock().is_ok_and(|tx| tx.is_some())
    }

    /// Start the simulation thread. Fails if it is already running.
    pub fn start(&self, config: SimConfig) -> Result<(), String> {
        let mut tx_lock = self.command_tx.lock().map_err(|e| e.to_string())?;
        if tx_lock.is_some() {
            return Err("Simulation already running".into());
        }

        let (cmd_tx, handle) = game_loop::spawn_game_loop(config, self.latest_snapshot.clone())
            .map_err(|e| format!("Failed to spawn game loop: {e}"))?;
        *tx_lock = Some(cmd_tx);
        *self.loop_thread.lock().map_err(|e| e.to_string())? = Some(handle);
        Ok(())
    }

    /// Forward a message to the game loop thread.
    pub fn send(&self, command: GameLoopCommand) -> Result<(), String> {
        let tx_lock = self.command_tx.lock().map_err(|e| e.to_string())?;
        match tx_lock.as_ref() {
            Some(tx) => tx
                .send(command)
                .map_err(|e| format!("Failed to send command: {}", e)),
            None => Err("Simulation not started".into()),
        }
    }

    /// Latest snapshot, for polling.
    pub fn snapshot(&self) -> Result<Option<GameStateSnapshot>, String> {
        let lock = self.latest_snapshot.lock().map_err(|e| e.to_string())?;
        Ok(lock.clone())
    }

    /// Ask the loop to stop and wait for its thread.
    pub fn stop(&self) -> Result<(), String> {
        let tx = self.command_tx.lock().map_err(|e| e.to_string())?.take();
        if let Some(tx) = tx {
            // A disconnected channel also stops the loop.
            let _ = tx.send(GameLoopCommand::Shutdown);
        }
        let handle = self.loop_thread.lock().map_err(|e| e.to_string())?.take();
        if let Some(handle) = handle {
            handle
                .join()
                .map_err(|_| "Game loop thread panicked".to_string())?;
        }
        Ok(())
    }
}
