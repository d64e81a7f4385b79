//! Reactor registry types
//!
//! Rows read from the fleet registry at startup, plus the reactor type and
//! displayed status enums.

use crate::ids::ReactorId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Reactor design type.
///
/// Unknown type strings parse to `Other`, which resolves to the CANDU
/// physics profile downstream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReactorType {
    Candu,
    Smr,
    Pwr,
    Bwr,
    /// Unrecognized registry value, carried verbatim.
    Other(String),
}

impl FromStr for ReactorType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_uppercase().as_str() {
            "CANDU" => ReactorType::Candu,
            "SMR" => ReactorType::Smr,
            "PWR" => ReactorType::Pwr,
            "BWR" => ReactorType::Bwr,
            _ => ReactorType::Other(s.to_string()),
        })
    }
}

impl fmt::Display for ReactorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReactorType::Candu => write!(f, "CANDU"),
            ReactorType::Smr => write!(f, "SMR"),
            ReactorType::Pwr => write!(f, "PWR"),
            ReactorType::Bwr => write!(f, "BWR"),
            ReactorType::Other(s) => write!(f, "{}", s),
        }
    }
}

/// Displayed reactor status, derived from the health score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactorStatus {
    Healthy,
    Warning,
    Unhealthy,
}

impl ReactorStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReactorStatus::Healthy => "healthy",
            ReactorStatus::Warning => "warning",
            ReactorStatus::Unhealthy => "unhealthy",
        }
    }
}

impl fmt::Display for ReactorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the fleet registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reactor {
    /// Registry primary key.
    pub id: ReactorId,

    /// Human-readable site name.
    pub name: String,

    /// Reactor design type, drives the physics profile.
    #[serde(rename = "type")]
    pub reactor_type: ReactorType,

    /// Displayed status at load time.
    pub status: ReactorStatus,

    /// Last computed health score (0-100).
    pub health_score: f64,

    /// Site latitude, if recorded.
    pub latitude: Option<f64>,

    /// Site longitude, if recorded.
    pub longitude: Option<f64>,
}
