//! Core types and definitions for the wrap-around shooter simulation.
//!
//! This crate defines the vocabulary shared across all other crates:
//! components, prototypes, input, config, state snapshots, events, errors and
//! constants. It has no dependency on the ECS or any runtime framework.

pub mod commands;
pub mod components;
pub mod config;
pub mod constants;
pub mod enums;
pub mod error;
pub mod events;
pub mod prototypes;
pub mod state;
pub mod types;
