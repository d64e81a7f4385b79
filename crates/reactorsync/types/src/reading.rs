//! Telemetry readings and anomaly factor maps
//!
//! A reading is one timestamped set of the five simulated sensor channels
//! for one reactor. Readings are immutable once produced; the engine only
//! ever constructs new ones.

use crate::ids::ReactorId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// The five simulated sensor channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    NeutronFlux,
    CoreTemperature,
    Pressure,
    Vibration,
    TritiumLevel,
}

impl Metric {
    /// All channels, in the order the physics model computes them.
    pub const ALL: [Metric; 5] = [
        Metric::NeutronFlux,
        Metric::CoreTemperature,
        Metric::Pressure,
        Metric::Vibration,
        Metric::TritiumLevel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::NeutronFlux => "neutron_flux",
            Metric::CoreTemperature => "core_temperature",
            Metric::Pressure => "pressure",
            Metric::Vibration => "vibration",
            Metric::TritiumLevel => "tritium_level",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-metric anomaly multipliers.
///
/// Absent entries read as 1.0, so an empty map is the identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FactorMap(HashMap<Metric, f64>);

impl FactorMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Multiplier for a channel; 1.0 when no factor is set.
    pub fn factor(&self, metric: Metric) -> f64 {
        self.0.get(&metric).copied().unwrap_or(1.0)
    }

    pub fn set(&mut self, metric: Metric, factor: f64) {
        self.0.insert(metric, factor);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Metric, f64)> + '_ {
        self.0.iter().map(|(m, f)| (*m, *f))
    }
}

impl FromIterator<(Metric, f64)> for FactorMap {
    fn from_iter<I: IntoIterator<Item = (Metric, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One telemetry reading for one reactor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryReading {
    /// Reactor this reading belongs to.
    pub reactor_id: ReactorId,

    /// When the reading was generated.
    pub timestamp: DateTime<Utc>,

    /// Neutron flux (n/cm²/s).
    pub neutron_flux: f64,

    /// Core temperature (°C).
    pub core_temperature: f64,

    /// Primary circuit pressure (MPa).
    pub pressure: f64,

    /// Mechanical vibration (mm/s).
    pub vibration: f64,

    /// Tritium level (pCi/L).
    pub tritium_level: f64,
}

impl TelemetryReading {
    /// Value of a channel on this reading.
    pub fn metric(&self, metric: Metric) -> f64 {
        match metric {
            Metric::NeutronFlux => self.neutron_flux,
            Metric::CoreTemperature => self.core_temperature,
            Metric::Pressure => self.pressure,
            Metric::Vibration => self.vibration,
            Metric::TritiumLevel => self.tritium_level,
        }
    }

    /// All channels as `(metric, value)` pairs.
    pub fn metrics(&self) -> impl Iterator<Item = (Metric, f64)> + '_ {
        Metric::ALL.iter().map(move |m| (*m, self.metric(*m)))
    }
}
