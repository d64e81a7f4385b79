//! Generation statistics
//!
//! Monotonically accumulating lifetime counters. The scheduler increments
//! them; the admin API reads consistent-enough snapshots without stopping
//! the loop, so plain relaxed atomics are sufficient.

use crate::tracker::AnomalySummary;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Lifetime counters for the generation loop.
#[derive(Debug)]
pub struct GenerationStats {
    total_readings: AtomicU64,
    successful_publishes: AtomicU64,
    successful_stores: AtomicU64,
    errors: AtomicU64,
    is_running: AtomicBool,
    started_at: DateTime<Utc>,
}

impl GenerationStats {
    pub fn new() -> Self {
        Self {
            total_readings: AtomicU64::new(0),
            successful_publishes: AtomicU64::new(0),
            successful_stores: AtomicU64::new(0),
            errors: AtomicU64::new(0),
            is_running: AtomicBool::new(false),
            started_at: Utc::now(),
        }
    }

    pub fn record_readings(&self, count: u64) {
        self.total_readings.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_publishes(&self, count: u64) {
        self.successful_publishes.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_stores(&self, count: u64) {
        self.successful_stores.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_errors(&self, count: u64) {
        self.errors.fetch_add(count, Ordering::Relaxed);
    }

    pub fn set_running(&self, running: bool) {
        self.is_running.store(running, Ordering::Relaxed);
    }

    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::Relaxed)
    }

    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }

    /// Point-in-time snapshot for the admin API.
    pub fn snapshot(
        &self,
        reactors_monitored: usize,
        active_anomalies: Vec<AnomalySummary>,
    ) -> StatsSnapshot {
        let now = Utc::now();
        StatsSnapshot {
            total_readings: self.total_readings.load(Ordering::Relaxed),
            successful_publishes: self.successful_publishes.load(Ordering::Relaxed),
            successful_stores: self.successful_stores.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            started_at: self.started_at,
            runtime_seconds: (now - self.started_at).num_seconds(),
            reactors_monitored,
            active_anomalies,
            is_running: self.is_running(),
        }
    }
}

impl Default for GenerationStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Serialized statistics view.
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    pub total_readings: u64,
    pub successful_publishes: u64,
    pub successful_stores: u64,
    pub errors: u64,
    pub started_at: DateTime<Utc>,
    pub runtime_seconds: i64,
    pub reactors_monitored: usize,
    pub active_anomalies: Vec<AnomalySummary>,
    pub is_running: bool,
}
