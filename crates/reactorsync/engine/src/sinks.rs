//! Sink traits
//!
//! Narrow async interfaces to the engine's external collaborators. The
//! daemon provides PostgreSQL- and broadcast-backed implementations; tests
//! script in-memory fakes. Partial success on batch writes is expected and
//! reported through the returned count, not as an error.

use crate::error::SinkResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reactorsync_types::{
    AlertEnvelope, FaultRecord, FaultType, Reactor, ReactorId, ReactorStatus, TelemetryEnvelope,
    TelemetryReading,
};

/// Read side of the fleet registry.
///
/// Loaded once at startup; fleet changes require a restart.
#[async_trait]
pub trait ReactorRegistry: Send + Sync {
    async fn list_reactors(&self) -> SinkResult<Vec<Reactor>>;
}

/// Telemetry batch writer.
#[async_trait]
pub trait TelemetryStore: Send + Sync {
    /// Connectivity probe, run once at startup.
    async fn ping(&self) -> SinkResult<()>;

    /// Write a batch of readings, returning how many were stored.
    ///
    /// A short count is partial success, reflected in statistics by the
    /// caller; only a transport-level failure is an `Err`.
    async fn insert_batch(&self, readings: &[TelemetryReading]) -> SinkResult<usize>;

    /// Release connections. Called once during scheduler cleanup.
    async fn close(&self) -> SinkResult<()>;
}

/// Fault record writer.
///
/// The scheduler applies the one-hour dedupe rule via
/// `has_recent_unresolved` before every insert.
#[async_trait]
pub trait FaultStore: Send + Sync {
    /// Whether an unresolved fault of this (reactor, type) pair exists at or
    /// after `since`.
    async fn has_recent_unresolved(
        &self,
        reactor_id: ReactorId,
        fault_type: FaultType,
        since: DateTime<Utc>,
    ) -> SinkResult<bool>;

    async fn insert_fault(&self, fault: &FaultRecord) -> SinkResult<()>;
}

/// Health score/status updater.
#[async_trait]
pub trait HealthSink: Send + Sync {
    async fn update_health(
        &self,
        reactor_id: ReactorId,
        health_score: f64,
        status: ReactorStatus,
    ) -> SinkResult<()>;
}

/// Message bus publisher.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish_telemetry(&self, envelope: TelemetryEnvelope) -> SinkResult<()>;

    async fn publish_alert(&self, envelope: AlertEnvelope) -> SinkResult<()>;

    /// Connectivity probe, run once at startup.
    async fn health_check(&self) -> SinkResult<()>;

    /// Flush and release the producer. Called once during scheduler cleanup.
    async fn close(&self) -> SinkResult<()>;
}
