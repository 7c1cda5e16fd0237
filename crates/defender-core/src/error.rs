//! Error taxonomy for core operations.
//!
//! All variants are local and recoverable: the failing call is aborted and
//! logged, the simulation loop keeps running.

use thiserror::Error;

use crate::prototypes::PrototypeId;
use crate::types::{EntityHandle, SessionId};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// Spawn requested with an unset or unknown prototype.
    #[error("invalid prototype {0}")]
    InvalidPrototype(PrototypeId),
    /// A map query was made outside an active session.
    #[error("no active map for session {0}")]
    NoActiveMap(SessionId),
    /// The handle refers to an entity that was released or destroyed.
    #[error("stale entity handle {0}")]
    StaleHandle(EntityHandle),
    /// Map dimensions that cannot support wrapping.
    #[error("invalid map: width {width}, y range [{y_min}, {y_max}]")]
    InvalidMap { width: f64, y_min: f64, y_max: f64 },
}

pub type SimResult<T> = Result<T, SimError>;
