//! Physics-informed telemetry model for ReactorSync
//!
//! Stateless building blocks of the generation engine:
//!
//! - [`profiles`] - fixed operational baselines per reactor type
//! - [`model`] - the correlated five-channel sensor model
//! - [`catalog`] - named anomaly modes and their per-channel factors
//! - [`scoring`] - weighted health scoring and threshold fault
//!   classification
//!
//! Everything here is synchronous and deterministic apart from the sensor
//! noise, which is drawn from a caller-supplied [`rand::Rng`] so tests can
//! seed it.

pub mod catalog;
pub mod error;
pub mod model;
pub mod profiles;
pub mod scoring;

pub use catalog::{anomaly_factors, parse_severity, AnomalyType};
pub use error::PhysicsError;
pub use model::generate_reading;
pub use profiles::{profile_for, ReactorProfile};
pub use scoring::{
    classify_fault, health_score, health_score_partial, severity_for, status_for,
    HEALTHY_THRESHOLD, WARNING_THRESHOLD,
};
