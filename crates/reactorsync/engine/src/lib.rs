//! ReactorSync generation engine
//!
//! The stateful half of the telemetry pipeline:
//!
//! - [`tracker`] - per-reactor injected anomaly state with expiry
//! - [`coordinator`] - one reading per reactor per cycle, with per-item
//!   failure isolation and the shared monotonic time step
//! - [`scheduler`] - the periodic generate → publish → persist → score →
//!   fault-check loop
//! - [`sinks`] - the narrow async interfaces to the registry, store, and bus
//! - [`stats`] - lifetime counters surfaced to the admin API
//!
//! The engine owns no I/O of its own; everything external arrives through
//! the sink traits so the scheduler is testable against in-memory fakes.

pub mod coordinator;
pub mod error;
pub mod scheduler;
pub mod sinks;
pub mod stats;
pub mod tracker;

pub use coordinator::TelemetryCoordinator;
pub use error::{EngineError, SinkError, SinkResult};
pub use scheduler::{CycleScheduler, SchedulerConfig, FAULT_DEDUPE_WINDOW_SECS};
pub use sinks::{FaultStore, HealthSink, Publisher, ReactorRegistry, TelemetryStore};
pub use stats::{GenerationStats, StatsSnapshot};
pub use tracker::{ActiveAnomaly, AnomalySummary, AnomalyTracker};
