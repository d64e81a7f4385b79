//! Core types for the ReactorSync telemetry engine
//!
//! Shared data model used by the physics layer, the generation engine, and
//! the daemon's sinks: reactor identities and registry rows, telemetry
//! readings, anomaly factor maps, fault records, and bus envelopes.

pub mod envelope;
pub mod fault;
pub mod ids;
pub mod reactor;
pub mod reading;

pub use envelope::{AlertEnvelope, MessageSource, TelemetryEnvelope};
pub use fault::{FaultRecord, FaultSeverity, FaultType};
pub use ids::ReactorId;
pub use reactor::{Reactor, ReactorStatus, ReactorType};
pub use reading::{FactorMap, Metric, TelemetryReading};
