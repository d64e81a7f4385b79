//! Bus message envelopes
//!
//! Every message published to the bus is keyed by reactor id and wraps the
//! domain payload with a producer timestamp and a source tag so consumers
//! can distinguish telemetry traffic from alert traffic.

use crate::fault::FaultRecord;
use crate::ids::ReactorId;
use crate::reading::TelemetryReading;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Origin tag carried on every bus message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageSource {
    SyntheticGenerator,
    AnomalyDetector,
}

/// A telemetry reading as published to the bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryEnvelope {
    #[serde(flatten)]
    pub reading: TelemetryReading,

    /// When the producer handed the message to the bus.
    pub producer_timestamp: DateTime<Utc>,

    pub source: MessageSource,
}

impl TelemetryEnvelope {
    pub fn new(reading: TelemetryReading) -> Self {
        Self {
            reading,
            producer_timestamp: Utc::now(),
            source: MessageSource::SyntheticGenerator,
        }
    }

    /// Partition key for the bus.
    pub fn key(&self) -> ReactorId {
        self.reading.reactor_id
    }
}

/// A fault alert as published to the bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertEnvelope {
    #[serde(flatten)]
    pub fault: FaultRecord,

    /// When the producer handed the message to the bus.
    pub producer_timestamp: DateTime<Utc>,

    pub source: MessageSource,
}

impl AlertEnvelope {
    pub fn new(fault: FaultRecord) -> Self {
        Self {
            fault,
            producer_timestamp: Utc::now(),
            source: MessageSource::AnomalyDetector,
        }
    }

    /// Partition key for the bus.
    pub fn key(&self) -> ReactorId {
        self.fault.reactor_id
    }
}
