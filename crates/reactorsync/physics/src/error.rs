//! Error types for reactorsync-physics

use thiserror::Error;

/// Errors from the physics layer.
#[derive(Debug, Error)]
pub enum PhysicsError {
    /// Anomaly type name not present in the catalog.
    #[error("unknown anomaly type: {0}")]
    UnknownAnomalyType(String),

    /// Severity name outside the yellow/red tiers.
    #[error("unknown severity: {0}")]
    UnknownSeverity(String),
}

/// Result type for physics operations.
pub type PhysicsResult<T> = Result<T, PhysicsError>;
