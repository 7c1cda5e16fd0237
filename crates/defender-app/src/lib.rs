//! Headless host for the defender simulation.
//!
//! Runs the engine on its own fixed-rate thread, forwards input and
//! commands to it over a channel and keeps the latest snapshot for polling.

pub mod game_loop;
pub mod state;

pub use defender_core as core;
