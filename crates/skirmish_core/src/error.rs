//! Error types for the decision engine.
//!
//! Absence conditions (no target, no safe retreat point, no legal
//! ability) are not errors; they are `Option::None` with a defined
//! fallback branch in the policy. The variants here cover breaches of
//! the contract with the external collaborator.

use thiserror::Error;

use crate::entity::EntityId;

/// Result type alias using [`EngineError`].
pub type Result<T> = std::result::Result<T, EngineError>;

/// Top-level error type for the decision engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The collaborator handed over a snapshot containing the same
    /// entity ID twice.
    #[error("Duplicate entity ID in snapshot: {0}")]
    DuplicateEntity(EntityId),

    /// The engine needs at least one fallback waypoint to send idle
    /// units toward when no enemy has ever been observed.
    #[error("Scouting rotation must contain at least one waypoint")]
    EmptyScoutRotation,
}
