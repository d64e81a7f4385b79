//! Fault classification types
//!
//! A fault record is what the engine persists and alerts on when a reading
//! breaches a classification threshold.

use crate::ids::ReactorId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fault classification produced from a telemetry reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultType {
    TemperatureSpike,
    PressureDrop,
    VibrationHigh,
    FluxInstability,
    TritiumHigh,
}

impl FaultType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FaultType::TemperatureSpike => "temperature_spike",
            FaultType::PressureDrop => "pressure_drop",
            FaultType::VibrationHigh => "vibration_high",
            FaultType::FluxInstability => "flux_instability",
            FaultType::TritiumHigh => "tritium_high",
        }
    }
}

impl fmt::Display for FaultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Qualitative fault tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaultSeverity {
    Yellow,
    Red,
}

impl FaultSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            FaultSeverity::Yellow => "yellow",
            FaultSeverity::Red => "red",
        }
    }
}

impl fmt::Display for FaultSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fault detected from one reading, written to the fault store and
/// published as an alert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaultRecord {
    pub reactor_id: ReactorId,
    pub fault_type: FaultType,
    pub severity: FaultSeverity,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

impl FaultRecord {
    /// Standard record for an automated detection.
    pub fn automated(
        reactor_id: ReactorId,
        fault_type: FaultType,
        severity: FaultSeverity,
        health_score: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            reactor_id,
            fault_type,
            severity,
            description: format!(
                "Automated detection: {} (health score: {:.1})",
                fault_type, health_score
            ),
            timestamp,
        }
    }
}
