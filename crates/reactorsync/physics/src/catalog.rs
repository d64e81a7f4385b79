//! Anomaly catalog
//!
//! Named anomaly modes and the per-channel factor maps they produce at each
//! severity. Several modes couple multiple channels in one map; a coolant
//! leak drops pressure while raising temperature and vibration, which is
//! what makes the injected faults read as causally plausible downstream.

use crate::error::PhysicsError;
use reactorsync_types::{FactorMap, FaultSeverity, Metric};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Injectable anomaly modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyType {
    TemperatureSpike,
    PressureDrop,
    VibrationIncrease,
    FluxInstability,
    CoolantLeak,
    PumpFailure,
}

impl AnomalyType {
    /// All catalog entries.
    pub const ALL: [AnomalyType; 6] = [
        AnomalyType::TemperatureSpike,
        AnomalyType::PressureDrop,
        AnomalyType::VibrationIncrease,
        AnomalyType::FluxInstability,
        AnomalyType::CoolantLeak,
        AnomalyType::PumpFailure,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalyType::TemperatureSpike => "temperature_spike",
            AnomalyType::PressureDrop => "pressure_drop",
            AnomalyType::VibrationIncrease => "vibration_increase",
            AnomalyType::FluxInstability => "flux_instability",
            AnomalyType::CoolantLeak => "coolant_leak",
            AnomalyType::PumpFailure => "pump_failure",
        }
    }
}

impl fmt::Display for AnomalyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnomalyType {
    type Err = PhysicsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "temperature_spike" => Ok(AnomalyType::TemperatureSpike),
            "pressure_drop" => Ok(AnomalyType::PressureDrop),
            "vibration_increase" => Ok(AnomalyType::VibrationIncrease),
            "flux_instability" => Ok(AnomalyType::FluxInstability),
            "coolant_leak" => Ok(AnomalyType::CoolantLeak),
            "pump_failure" => Ok(AnomalyType::PumpFailure),
            other => Err(PhysicsError::UnknownAnomalyType(other.to_string())),
        }
    }
}

/// Parse a severity string from the admin surface.
///
/// `FaultSeverity` lives in the types crate without a `FromStr`; the
/// rejection of unknown values is a catalog concern.
pub fn parse_severity(s: &str) -> Result<FaultSeverity, PhysicsError> {
    match s {
        "yellow" => Ok(FaultSeverity::Yellow),
        "red" => Ok(FaultSeverity::Red),
        other => Err(PhysicsError::UnknownSeverity(other.to_string())),
    }
}

/// Factor map for an anomaly at a given severity.
pub fn anomaly_factors(anomaly: AnomalyType, severity: FaultSeverity) -> FactorMap {
    use FaultSeverity::{Red, Yellow};
    use Metric::*;

    let factors: &[(Metric, f64)] = match (anomaly, severity) {
        (AnomalyType::TemperatureSpike, Red) => &[(CoreTemperature, 1.15)],
        (AnomalyType::TemperatureSpike, Yellow) => &[(CoreTemperature, 1.08)],

        (AnomalyType::PressureDrop, Red) => &[(Pressure, 0.75)],
        (AnomalyType::PressureDrop, Yellow) => &[(Pressure, 0.85)],

        (AnomalyType::VibrationIncrease, Red) => &[(Vibration, 2.5)],
        (AnomalyType::VibrationIncrease, Yellow) => &[(Vibration, 1.8)],

        (AnomalyType::FluxInstability, Red) => &[(NeutronFlux, 1.25)],
        (AnomalyType::FluxInstability, Yellow) => &[(NeutronFlux, 1.12)],

        (AnomalyType::CoolantLeak, Red) => {
            &[(Pressure, 0.70), (CoreTemperature, 1.12), (Vibration, 1.6)]
        }
        (AnomalyType::CoolantLeak, Yellow) => {
            &[(Pressure, 0.80), (CoreTemperature, 1.06), (Vibration, 1.3)]
        }

        (AnomalyType::PumpFailure, Red) => &[(Pressure, 0.65), (Vibration, 3.0)],
        (AnomalyType::PumpFailure, Yellow) => &[(Pressure, 0.85), (Vibration, 2.2)],
    };

    factors.iter().copied().collect()
}
