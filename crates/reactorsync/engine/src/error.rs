//! Error types for reactorsync-engine

use reactorsync_types::ReactorId;
use thiserror::Error;

/// Errors surfaced by external sinks (registry, store, bus).
#[derive(Debug, Error)]
pub enum SinkError {
    /// Could not reach the sink at all.
    #[error("connection error: {0}")]
    Connection(String),

    /// The sink rejected or failed the operation.
    #[error("query error: {0}")]
    Query(String),

    /// Publishing to the bus failed.
    #[error("publish error: {0}")]
    Publish(String),

    /// The sink did not answer within the bounded call timeout.
    #[error("{operation} timed out after {timeout_ms}ms")]
    Timeout {
        operation: &'static str,
        timeout_ms: u64,
    },

    /// The sink has been closed.
    #[error("sink closed")]
    Closed,
}

/// Result type for sink operations.
pub type SinkResult<T> = Result<T, SinkError>;

/// Engine-level errors.
///
/// Only startup problems are fatal; everything inside a running cycle is
/// counted and logged instead of propagated.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Reactor registry could not be read at startup.
    #[error("failed to load reactor registry: {0}")]
    RegistryUnavailable(#[source] SinkError),

    /// A sink failed its startup health check.
    #[error("sink unhealthy at startup ({sink}): {source}")]
    SinkUnhealthy {
        sink: &'static str,
        #[source]
        source: SinkError,
    },

    /// Reading generation produced a non-finite value for one reactor.
    #[error("generation failed for {reactor_id}: {reason}")]
    Generation {
        reactor_id: ReactorId,
        reason: String,
    },
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
