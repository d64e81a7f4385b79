//! Telemetry coordinator
//!
//! Produces one reading per tracked reactor per cycle. The monotonic time
//! step is owned here and shared across all reactors: it advances once per
//! reading, is never reset, and drives the phase continuity of the physics
//! model's sinusoidal terms across cycles.

use crate::error::EngineError;
use crate::tracker::AnomalyTracker;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use reactorsync_physics::{generate_reading, profile_for};
use reactorsync_types::{Reactor, TelemetryReading};
use std::sync::Arc;

/// Output of one generation cycle.
#[derive(Debug)]
pub struct CycleOutput {
    pub readings: Vec<TelemetryReading>,

    /// Reactors whose reading failed to generate this cycle.
    pub failures: u64,
}

/// Generates readings for the whole fleet, one cycle at a time.
pub struct TelemetryCoordinator {
    tracker: Arc<AnomalyTracker>,
    rng: StdRng,
    time_step: u64,
}

impl TelemetryCoordinator {
    pub fn new(tracker: Arc<AnomalyTracker>) -> Self {
        Self::with_rng(tracker, StdRng::from_entropy())
    }

    /// Seeded constructor for deterministic tests.
    pub fn with_rng(tracker: Arc<AnomalyTracker>, rng: StdRng) -> Self {
        Self {
            tracker,
            rng,
            time_step: 0,
        }
    }

    /// Current time step; advances once per generated reading.
    pub fn time_step(&self) -> u64 {
        self.time_step
    }

    /// Generate one reading per reactor at the shared cycle timestamp.
    ///
    /// A failure for one reactor is logged and counted without aborting the
    /// cycle; the remaining reactors still get readings.
    pub async fn generate_cycle(
        &mut self,
        reactors: &[Reactor],
        timestamp: DateTime<Utc>,
    ) -> CycleOutput {
        let mut readings = Vec::with_capacity(reactors.len());
        let mut failures = 0u64;

        for reactor in reactors {
            match self.generate_one(reactor, timestamp).await {
                Ok(reading) => readings.push(reading),
                Err(error) => {
                    tracing::error!(
                        reactor_id = %reactor.id,
                        error = %error,
                        "Error generating telemetry"
                    );
                    failures += 1;
                }
            }
        }

        CycleOutput { readings, failures }
    }

    async fn generate_one(
        &mut self,
        reactor: &Reactor,
        timestamp: DateTime<Utc>,
    ) -> Result<TelemetryReading, EngineError> {
        let factors = self.tracker.active_factors(reactor.id).await;
        let profile = profile_for(&reactor.reactor_type);

        let reading = generate_reading(
            profile,
            reactor.id,
            timestamp,
            self.time_step,
            &factors,
            &mut self.rng,
        );
        self.time_step += 1;

        // A non-finite factor poisons every downstream channel; reject the
        // reading rather than hand NaN to the sinks.
        if reading.metrics().any(|(_, value)| !value.is_finite()) {
            return Err(EngineError::Generation {
                reactor_id: reactor.id,
                reason: "non-finite metric value".to_string(),
            });
        }

        Ok(reading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use reactorsync_physics::AnomalyType;
    use reactorsync_types::{FaultSeverity, Metric, ReactorId, ReactorStatus, ReactorType};

    fn reactor(id: i64, reactor_type: ReactorType) -> Reactor {
        Reactor {
            id: ReactorId::new(id),
            name: format!("Unit {}", id),
            reactor_type,
            status: ReactorStatus::Healthy,
            health_score: 100.0,
            latitude: None,
            longitude: None,
        }
    }

    fn coordinator() -> TelemetryCoordinator {
        TelemetryCoordinator::with_rng(Arc::new(AnomalyTracker::new()), StdRng::seed_from_u64(7))
    }

    #[tokio::test]
    async fn test_one_reading_per_reactor() {
        let mut coordinator = coordinator();
        let fleet = vec![
            reactor(1, ReactorType::Candu),
            reactor(2, ReactorType::Smr),
        ];

        let output = coordinator.generate_cycle(&fleet, Utc::now()).await;
        assert_eq!(output.readings.len(), 2);
        assert_eq!(output.failures, 0);
        assert_eq!(output.readings[0].reactor_id, ReactorId::new(1));
        assert_eq!(output.readings[1].reactor_id, ReactorId::new(2));
    }

    #[tokio::test]
    async fn test_time_step_is_shared_and_never_reset() {
        let mut coordinator = coordinator();
        let fleet = vec![
            reactor(1, ReactorType::Candu),
            reactor(2, ReactorType::Smr),
            reactor(3, ReactorType::Candu),
        ];

        coordinator.generate_cycle(&fleet, Utc::now()).await;
        assert_eq!(coordinator.time_step(), 3);

        coordinator.generate_cycle(&fleet, Utc::now()).await;
        assert_eq!(coordinator.time_step(), 6);
    }

    #[tokio::test]
    async fn test_injected_anomaly_shows_in_reading() {
        let tracker = Arc::new(AnomalyTracker::new());
        tracker
            .inject(
                ReactorId::new(1),
                AnomalyType::PressureDrop,
                FaultSeverity::Red,
                Duration::minutes(30),
            )
            .await;

        let mut coordinator =
            TelemetryCoordinator::with_rng(Arc::clone(&tracker), StdRng::seed_from_u64(3));
        let fleet = vec![reactor(1, ReactorType::Candu)];

        // Average over enough cycles to see through the noise.
        let mut sum = 0.0;
        let n = 100;
        for _ in 0..n {
            let output = coordinator.generate_cycle(&fleet, Utc::now()).await;
            sum += output.readings[0].pressure;
        }
        let mean = sum / n as f64;
        assert!(
            (mean - 12.5 * 0.75).abs() < 0.5,
            "expected ~9.4 MPa, got {mean}"
        );

        // After a sweep past expiry the reactor returns to baseline.
        tracker.sweep(Utc::now() + Duration::minutes(31)).await;
        assert!(tracker
            .active_factors(ReactorId::new(1))
            .await
            .is_empty());
    }

    #[tokio::test]
    async fn test_generation_failure_isolated_to_one_reactor() {
        let tracker = Arc::new(AnomalyTracker::new());
        let mut coordinator =
            TelemetryCoordinator::with_rng(Arc::clone(&tracker), StdRng::seed_from_u64(5));

        // Poison reactor 2 with a non-finite factor; the catalog never
        // produces one, so install the entry directly.
        let mut factors = reactorsync_types::FactorMap::new();
        factors.set(Metric::Pressure, f64::NAN);
        tracker
            .inject_raw(
                ReactorId::new(2),
                crate::tracker::ActiveAnomaly {
                    anomaly_type: AnomalyType::PressureDrop,
                    severity: FaultSeverity::Red,
                    factors,
                    expires_at: Utc::now() + Duration::minutes(30),
                },
            )
            .await;

        let fleet = vec![
            reactor(1, ReactorType::Candu),
            reactor(2, ReactorType::Candu),
            reactor(3, ReactorType::Smr),
        ];
        let output = coordinator.generate_cycle(&fleet, Utc::now()).await;

        assert_eq!(output.failures, 1);
        let ids: Vec<_> = output.readings.iter().map(|r| r.reactor_id).collect();
        assert_eq!(ids, vec![ReactorId::new(1), ReactorId::new(3)]);
        // The time step still advanced for the failed reactor.
        assert_eq!(coordinator.time_step(), 3);
    }
}
