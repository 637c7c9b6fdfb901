//! Error types for simulation setup and queries.

use thiserror::Error;

use crate::sim::BodyId;

/// Errors surfaced by the simulation API.
///
/// Numeric degeneracies inside a step (zero-length vectors, aligned normals)
/// are never reported here; they resolve to fixed fallbacks.
#[derive(Debug, Error)]
pub enum SimError {
    /// A body handle does not refer to a body in the world.
    #[error("unknown body: {0}")]
    UnknownBody(BodyId),

    /// Both handles of a pair query refer to the same body.
    #[error("body {0} cannot be paired with itself")]
    SelfPair(BodyId),

    /// A part description has non-positive or non-finite properties.
    #[error("invalid part: {0}")]
    InvalidPart(String),

    /// An arena description has invalid geometry.
    #[error("invalid arena: {0}")]
    InvalidArena(String),

    /// Step called with a negative or non-finite timestep.
    #[error("invalid timestep: {0}")]
    InvalidTimestep(f64),

    /// Configuration values are out of range.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Reading a configuration file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration JSON could not be parsed or written.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias for simulation operations.
pub type SimResult<T> = Result<T, SimError>;
