//! Injected anomaly state
//!
//! Mutable per-reactor anomaly state shared between the admin control
//! surface and the scheduler. A single async mutex over the map serializes
//! the two writers; at most one anomaly is active per reactor, and a new
//! injection replaces the previous one unconditionally.
//!
//! This state is intentionally ephemeral; a restart clears all injected
//! anomalies.

use chrono::{DateTime, Duration, Utc};
use reactorsync_physics::{anomaly_factors, AnomalyType};
use reactorsync_types::{FactorMap, FaultSeverity, ReactorId};
use serde::Serialize;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// One active injected anomaly.
#[derive(Debug, Clone)]
pub struct ActiveAnomaly {
    pub anomaly_type: AnomalyType,
    pub severity: FaultSeverity,
    pub factors: FactorMap,
    pub expires_at: DateTime<Utc>,
}

/// Read-only view of an active anomaly for the stats/admin surface.
#[derive(Debug, Clone, Serialize)]
pub struct AnomalySummary {
    pub reactor_id: ReactorId,
    pub anomaly_type: AnomalyType,
    pub severity: FaultSeverity,
    pub expires_at: DateTime<Utc>,
}

/// Tracks the currently active anomaly per reactor.
#[derive(Debug, Default)]
pub struct AnomalyTracker {
    entries: Mutex<HashMap<ReactorId, ActiveAnomaly>>,
}

impl AnomalyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Activate an anomaly for a reactor, replacing any existing one.
    pub async fn inject(
        &self,
        reactor_id: ReactorId,
        anomaly_type: AnomalyType,
        severity: FaultSeverity,
        duration: Duration,
    ) {
        let anomaly = ActiveAnomaly {
            anomaly_type,
            severity,
            factors: anomaly_factors(anomaly_type, severity),
            expires_at: Utc::now() + duration,
        };

        let replaced = self
            .entries
            .lock()
            .await
            .insert(reactor_id, anomaly)
            .is_some();

        tracing::warn!(
            %reactor_id,
            %anomaly_type,
            %severity,
            duration_minutes = duration.num_minutes(),
            replaced,
            "Anomaly injected"
        );
    }

    /// Remove any active anomaly for a reactor. No-op if none is active.
    pub async fn clear(&self, reactor_id: ReactorId) -> bool {
        let removed = self.entries.lock().await.remove(&reactor_id).is_some();
        if removed {
            tracing::info!(%reactor_id, "Anomaly cleared");
        }
        removed
    }

    /// Drop all entries whose expiry has passed. Returns how many expired.
    pub async fn sweep(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|reactor_id, anomaly| {
            let live = anomaly.expires_at > now;
            if !live {
                tracing::info!(
                    %reactor_id,
                    anomaly_type = %anomaly.anomaly_type,
                    "Anomaly expired"
                );
            }
            live
        });
        before - entries.len()
    }

    /// Test hook: install an entry without going through the catalog.
    #[cfg(test)]
    pub(crate) async fn inject_raw(&self, reactor_id: ReactorId, anomaly: ActiveAnomaly) {
        self.entries.lock().await.insert(reactor_id, anomaly);
    }

    /// Factor map for a reactor; identity when no anomaly is active.
    pub async fn active_factors(&self, reactor_id: ReactorId) -> FactorMap {
        self.entries
            .lock()
            .await
            .get(&reactor_id)
            .map(|a| a.factors.clone())
            .unwrap_or_default()
    }

    /// Snapshot of all active anomalies, pruning expired entries first.
    pub async fn active_anomalies(&self, now: DateTime<Utc>) -> Vec<AnomalySummary> {
        let mut entries = self.entries.lock().await;
        entries.retain(|_, anomaly| anomaly.expires_at > now);
        entries
            .iter()
            .map(|(reactor_id, anomaly)| AnomalySummary {
                reactor_id: *reactor_id,
                anomaly_type: anomaly.anomaly_type,
                severity: anomaly.severity,
                expires_at: anomaly.expires_at,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reactorsync_types::Metric;

    #[tokio::test]
    async fn test_inject_replaces_previous_anomaly() {
        let tracker = AnomalyTracker::new();
        let reactor = ReactorId::new(1);

        tracker
            .inject(
                reactor,
                AnomalyType::PressureDrop,
                FaultSeverity::Red,
                Duration::minutes(30),
            )
            .await;
        let factors = tracker.active_factors(reactor).await;
        assert_eq!(factors.factor(Metric::Pressure), 0.75);

        // Replacement fully supersedes: pressure factor returns to identity.
        tracker
            .inject(
                reactor,
                AnomalyType::VibrationIncrease,
                FaultSeverity::Yellow,
                Duration::minutes(30),
            )
            .await;
        let factors = tracker.active_factors(reactor).await;
        assert_eq!(factors.factor(Metric::Pressure), 1.0);
        assert_eq!(factors.factor(Metric::Vibration), 1.8);

        let active = tracker.active_anomalies(Utc::now()).await;
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].anomaly_type, AnomalyType::VibrationIncrease);
    }

    #[tokio::test]
    async fn test_sweep_removes_expired_entries() {
        let tracker = AnomalyTracker::new();
        let expiring = ReactorId::new(1);
        let lasting = ReactorId::new(2);

        tracker
            .inject(
                expiring,
                AnomalyType::CoolantLeak,
                FaultSeverity::Red,
                Duration::minutes(5),
            )
            .await;
        tracker
            .inject(
                lasting,
                AnomalyType::PumpFailure,
                FaultSeverity::Yellow,
                Duration::minutes(60),
            )
            .await;

        let removed = tracker.sweep(Utc::now() + Duration::minutes(10)).await;
        assert_eq!(removed, 1);

        // The expired reactor generates at baseline again.
        assert!(tracker.active_factors(expiring).await.is_empty());
        assert!(!tracker.active_factors(lasting).await.is_empty());
    }

    #[tokio::test]
    async fn test_clear_is_noop_when_absent() {
        let tracker = AnomalyTracker::new();
        let reactor = ReactorId::new(9);

        assert!(!tracker.clear(reactor).await);

        tracker
            .inject(
                reactor,
                AnomalyType::FluxInstability,
                FaultSeverity::Red,
                Duration::minutes(30),
            )
            .await;
        assert!(tracker.clear(reactor).await);
        assert!(tracker.active_factors(reactor).await.is_empty());
    }
}
