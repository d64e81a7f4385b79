//! Cycle scheduler
//!
//! Drives the periodic generation loop: sweep expired anomalies, generate
//! one reading per reactor, publish and persist the batch best-effort, then
//! score each reading, push the health update, and raise deduplicated
//! faults. Sink calls run under a bounded timeout so a stalled collaborator
//! counts as a failure instead of wedging the loop. Stop requests are
//! honored between cycles, never mid-cycle.

use crate::coordinator::TelemetryCoordinator;
use crate::error::{EngineError, SinkError, SinkResult};
use crate::sinks::{FaultStore, HealthSink, Publisher, ReactorRegistry, TelemetryStore};
use crate::stats::{GenerationStats, StatsSnapshot};
use crate::tracker::AnomalyTracker;
use chrono::Utc;
use reactorsync_physics::{classify_fault, health_score, severity_for, status_for};
use reactorsync_types::{
    AlertEnvelope, FaultRecord, Reactor, TelemetryEnvelope, TelemetryReading,
};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;

/// Dedupe window for repeated faults of the same (reactor, type) pair.
pub const FAULT_DEDUPE_WINDOW_SECS: i64 = 3600;

/// Scheduler timing and sink-call bounds.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Target interval between cycle starts.
    pub generation_interval: Duration,

    /// Upper bound for any single sink call.
    pub sink_timeout: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            generation_interval: Duration::from_secs(60),
            sink_timeout: Duration::from_secs(10),
        }
    }
}

/// The periodic generation loop and its collaborators.
pub struct CycleScheduler {
    config: SchedulerConfig,
    coordinator: Mutex<TelemetryCoordinator>,
    tracker: Arc<AnomalyTracker>,
    registry: Arc<dyn ReactorRegistry>,
    telemetry: Arc<dyn TelemetryStore>,
    faults: Arc<dyn FaultStore>,
    health: Arc<dyn HealthSink>,
    publisher: Arc<dyn Publisher>,
    stats: Arc<GenerationStats>,
    reactors: RwLock<Vec<Reactor>>,
    stop_requested: AtomicBool,
}

impl CycleScheduler {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: SchedulerConfig,
        coordinator: TelemetryCoordinator,
        tracker: Arc<AnomalyTracker>,
        registry: Arc<dyn ReactorRegistry>,
        telemetry: Arc<dyn TelemetryStore>,
        faults: Arc<dyn FaultStore>,
        health: Arc<dyn HealthSink>,
        publisher: Arc<dyn Publisher>,
    ) -> Self {
        Self {
            config,
            coordinator: Mutex::new(coordinator),
            tracker,
            registry,
            telemetry,
            faults,
            health,
            publisher,
            stats: Arc::new(GenerationStats::new()),
            reactors: RwLock::new(Vec::new()),
            stop_requested: AtomicBool::new(false),
        }
    }

    /// Shared anomaly tracker, for the admin control surface.
    pub fn tracker(&self) -> Arc<AnomalyTracker> {
        Arc::clone(&self.tracker)
    }

    /// Statistics snapshot, including active anomalies.
    pub async fn statistics(&self) -> StatsSnapshot {
        let reactors_monitored = self.reactors.read().await.len();
        let active = self.tracker.active_anomalies(Utc::now()).await;
        self.stats.snapshot(reactors_monitored, active)
    }

    /// Request a graceful stop after the current cycle finishes.
    pub fn stop(&self) {
        self.stop_requested.store(true, Ordering::Relaxed);
        tracing::info!("Generation stop requested");
    }

    /// Run the generation loop until `stop()` is called.
    ///
    /// Startup failures (registry unreachable, unhealthy sinks) abort before
    /// the first cycle and propagate. Sink resources are released on every
    /// exit path.
    pub async fn run(&self) -> Result<(), EngineError> {
        let result = self.run_inner().await;
        self.cleanup().await;
        result
    }

    async fn run_inner(&self) -> Result<(), EngineError> {
        self.initialize().await?;

        self.stats.set_running(true);
        tracing::info!("Starting data generation loop");

        while !self.stop_requested.load(Ordering::Relaxed) {
            let cycle_start = Instant::now();

            self.run_cycle().await;

            let elapsed = cycle_start.elapsed();
            if elapsed >= self.config.generation_interval {
                tracing::warn!(
                    cycle_ms = elapsed.as_millis() as u64,
                    interval_ms = self.config.generation_interval.as_millis() as u64,
                    "Generation cycle took longer than interval"
                );
            } else {
                tokio::time::sleep(self.config.generation_interval - elapsed).await;
            }
        }

        self.stats.set_running(false);
        tracing::info!("Generation loop stopped");
        Ok(())
    }

    async fn initialize(&self) -> Result<(), EngineError> {
        tracing::info!("Initializing telemetry engine");

        let reactors = self
            .registry
            .list_reactors()
            .await
            .map_err(EngineError::RegistryUnavailable)?;

        self.publisher
            .health_check()
            .await
            .map_err(|source| EngineError::SinkUnhealthy {
                sink: "publisher",
                source,
            })?;

        self.telemetry
            .ping()
            .await
            .map_err(|source| EngineError::SinkUnhealthy {
                sink: "telemetry store",
                source,
            })?;

        tracing::info!(
            reactor_count = reactors.len(),
            interval_secs = self.config.generation_interval.as_secs(),
            "Telemetry engine initialized"
        );
        *self.reactors.write().await = reactors;
        Ok(())
    }

    /// One full cycle. Never fatal; all failures are counted and logged.
    async fn run_cycle(&self) {
        let timestamp = Utc::now();

        self.tracker.sweep(timestamp).await;

        let reactors = self.reactors.read().await;
        let output = {
            let mut coordinator = self.coordinator.lock().await;
            coordinator.generate_cycle(&reactors, timestamp).await
        };
        drop(reactors);

        self.stats.record_readings(output.readings.len() as u64);
        self.stats.record_errors(output.failures);

        self.publish_batch(&output.readings).await;
        self.persist_batch(&output.readings).await;
        self.score_and_check(&output.readings).await;

        tracing::info!(
            readings_generated = output.readings.len(),
            timestamp = %timestamp,
            "Telemetry cycle complete"
        );
    }

    /// Publish each reading to the bus. Best effort per item: failures are
    /// counted and not retried within the cycle.
    async fn publish_batch(&self, readings: &[TelemetryReading]) {
        let mut published = 0u64;

        for reading in readings {
            let envelope = TelemetryEnvelope::new(reading.clone());
            match self
                .bounded("publish telemetry", self.publisher.publish_telemetry(envelope))
                .await
            {
                Ok(()) => published += 1,
                Err(error) => {
                    tracing::error!(
                        reactor_id = %reading.reactor_id,
                        error = %error,
                        "Error publishing telemetry"
                    );
                    self.stats.record_errors(1);
                }
            }
        }

        self.stats.record_publishes(published);
        if (published as usize) < readings.len() {
            tracing::warn!(
                successful = published,
                total = readings.len(),
                "Some bus publishes failed"
            );
        }
    }

    /// Persist the batch. The store reports how many rows landed; the
    /// shortfall is counted as errors, one per lost reading.
    async fn persist_batch(&self, readings: &[TelemetryReading]) {
        if readings.is_empty() {
            return;
        }

        let stored = match self
            .bounded("telemetry insert", self.telemetry.insert_batch(readings))
            .await
        {
            Ok(stored) => stored.min(readings.len()),
            Err(error) => {
                tracing::error!(error = %error, "Error storing telemetry batch");
                0
            }
        };

        self.stats.record_stores(stored as u64);
        let lost = readings.len() - stored;
        if lost > 0 {
            self.stats.record_errors(lost as u64);
            tracing::warn!(
                successful = stored,
                total = readings.len(),
                "Some telemetry inserts failed"
            );
        }
    }

    /// Score each reading, push the health update, and raise a fault when a
    /// classification threshold is breached and the dedupe window allows.
    async fn score_and_check(&self, readings: &[TelemetryReading]) {
        for reading in readings {
            let score = health_score(reading);
            let status = status_for(score);

            if let Err(error) = self
                .bounded(
                    "health update",
                    self.health.update_health(reading.reactor_id, score, status),
                )
                .await
            {
                tracing::error!(
                    reactor_id = %reading.reactor_id,
                    error = %error,
                    "Error updating reactor health"
                );
                self.stats.record_errors(1);
            }

            let Some(severity) = severity_for(score) else {
                continue;
            };
            let Some(fault_type) = classify_fault(reading) else {
                continue;
            };

            let fault = FaultRecord::automated(
                reading.reactor_id,
                fault_type,
                severity,
                score,
                reading.timestamp,
            );
            self.raise_fault(fault).await;
        }
    }

    /// Publish and persist one fault unless an unresolved fault of the same
    /// (reactor, type) pair already exists inside the dedupe window.
    async fn raise_fault(&self, fault: FaultRecord) {
        let since = fault.timestamp - chrono::Duration::seconds(FAULT_DEDUPE_WINDOW_SECS);

        match self
            .bounded(
                "fault dedupe check",
                self.faults
                    .has_recent_unresolved(fault.reactor_id, fault.fault_type, since),
            )
            .await
        {
            Ok(true) => {
                tracing::debug!(
                    reactor_id = %fault.reactor_id,
                    fault_type = %fault.fault_type,
                    "Similar fault already exists, skipping"
                );
                return;
            }
            Ok(false) => {}
            Err(error) => {
                tracing::error!(
                    reactor_id = %fault.reactor_id,
                    error = %error,
                    "Error checking for duplicate fault"
                );
                self.stats.record_errors(1);
                return;
            }
        }

        if let Err(error) = self
            .bounded(
                "alert publish",
                self.publisher.publish_alert(AlertEnvelope::new(fault.clone())),
            )
            .await
        {
            tracing::error!(
                reactor_id = %fault.reactor_id,
                error = %error,
                "Error sending alert"
            );
            self.stats.record_errors(1);
        }

        match self
            .bounded("fault insert", self.faults.insert_fault(&fault))
            .await
        {
            Ok(()) => {
                tracing::warn!(
                    reactor_id = %fault.reactor_id,
                    fault_type = %fault.fault_type,
                    severity = %fault.severity,
                    "Fault created"
                );
            }
            Err(error) => {
                tracing::error!(
                    reactor_id = %fault.reactor_id,
                    error = %error,
                    "Error creating fault"
                );
                self.stats.record_errors(1);
            }
        }
    }

    /// Release sink resources. Runs on every exit path.
    async fn cleanup(&self) {
        if let Err(error) = self.publisher.close().await {
            tracing::error!(error = %error, "Error closing publisher");
        }
        if let Err(error) = self.telemetry.close().await {
            tracing::error!(error = %error, "Error closing telemetry store");
        }
        tracing::info!("Engine cleanup completed");
    }

    /// Run a sink call under the configured timeout; a stalled sink counts
    /// as a failure rather than blocking the loop.
    async fn bounded<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = SinkResult<T>>,
    ) -> SinkResult<T> {
        match tokio::time::timeout(self.config.sink_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(SinkError::Timeout {
                operation,
                timeout_ms: self.config.sink_timeout.as_millis() as u64,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, Duration as ChronoDuration};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use reactorsync_types::{
        FaultType, ReactorId, ReactorStatus, ReactorType,
    };

    fn reactor(id: i64) -> Reactor {
        Reactor {
            id: ReactorId::new(id),
            name: format!("Unit {}", id),
            reactor_type: ReactorType::Candu,
            status: ReactorStatus::Healthy,
            health_score: 100.0,
            latitude: None,
            longitude: None,
        }
    }

    /// A reading bad enough to score deep red and classify as a
    /// temperature spike.
    fn critical_reading(id: i64, timestamp: DateTime<Utc>) -> TelemetryReading {
        TelemetryReading {
            reactor_id: ReactorId::new(id),
            timestamp,
            neutron_flux: 0.0,
            core_temperature: 400.0,
            pressure: 8.0,
            vibration: 15.0,
            tritium_level: 2000.0,
        }
    }

    struct MockRegistry {
        reactors: Vec<Reactor>,
        fail: bool,
    }

    #[async_trait]
    impl ReactorRegistry for MockRegistry {
        async fn list_reactors(&self) -> SinkResult<Vec<Reactor>> {
            if self.fail {
                Err(SinkError::Connection("registry down".to_string()))
            } else {
                Ok(self.reactors.clone())
            }
        }
    }

    #[derive(Default)]
    struct MockTelemetryStore {
        stored: Mutex<Vec<TelemetryReading>>,
        reject_reactor: Option<ReactorId>,
        closed: AtomicBool,
    }

    #[async_trait]
    impl TelemetryStore for MockTelemetryStore {
        async fn ping(&self) -> SinkResult<()> {
            Ok(())
        }

        async fn insert_batch(&self, readings: &[TelemetryReading]) -> SinkResult<usize> {
            let mut stored = self.stored.lock().await;
            let mut count = 0;
            for reading in readings {
                if Some(reading.reactor_id) != self.reject_reactor {
                    stored.push(reading.clone());
                    count += 1;
                }
            }
            Ok(count)
        }

        async fn close(&self) -> SinkResult<()> {
            self.closed.store(true, Ordering::Relaxed);
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockFaultStore {
        faults: Mutex<Vec<FaultRecord>>,
    }

    #[async_trait]
    impl FaultStore for MockFaultStore {
        async fn has_recent_unresolved(
            &self,
            reactor_id: ReactorId,
            fault_type: FaultType,
            since: DateTime<Utc>,
        ) -> SinkResult<bool> {
            Ok(self.faults.lock().await.iter().any(|f| {
                f.reactor_id == reactor_id && f.fault_type == fault_type && f.timestamp > since
            }))
        }

        async fn insert_fault(&self, fault: &FaultRecord) -> SinkResult<()> {
            self.faults.lock().await.push(fault.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockHealthSink {
        updates: Mutex<Vec<(ReactorId, f64, ReactorStatus)>>,
    }

    #[async_trait]
    impl HealthSink for MockHealthSink {
        async fn update_health(
            &self,
            reactor_id: ReactorId,
            health_score: f64,
            status: ReactorStatus,
        ) -> SinkResult<()> {
            self.updates
                .lock()
                .await
                .push((reactor_id, health_score, status));
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockPublisher {
        telemetry: Mutex<Vec<TelemetryEnvelope>>,
        alerts: Mutex<Vec<AlertEnvelope>>,
        fail_telemetry: bool,
        closed: AtomicBool,
    }

    #[async_trait]
    impl Publisher for MockPublisher {
        async fn publish_telemetry(&self, envelope: TelemetryEnvelope) -> SinkResult<()> {
            if self.fail_telemetry {
                return Err(SinkError::Publish("bus unavailable".to_string()));
            }
            self.telemetry.lock().await.push(envelope);
            Ok(())
        }

        async fn publish_alert(&self, envelope: AlertEnvelope) -> SinkResult<()> {
            self.alerts.lock().await.push(envelope);
            Ok(())
        }

        async fn health_check(&self) -> SinkResult<()> {
            Ok(())
        }

        async fn close(&self) -> SinkResult<()> {
            self.closed.store(true, Ordering::Relaxed);
            Ok(())
        }
    }

    struct Harness {
        scheduler: Arc<CycleScheduler>,
        telemetry: Arc<MockTelemetryStore>,
        faults: Arc<MockFaultStore>,
        health: Arc<MockHealthSink>,
        publisher: Arc<MockPublisher>,
    }

    fn harness(
        fleet: Vec<Reactor>,
        telemetry: MockTelemetryStore,
        publisher: MockPublisher,
        registry_fail: bool,
    ) -> Harness {
        let tracker = Arc::new(AnomalyTracker::new());
        let coordinator =
            TelemetryCoordinator::with_rng(Arc::clone(&tracker), StdRng::seed_from_u64(11));
        let telemetry = Arc::new(telemetry);
        let faults = Arc::new(MockFaultStore::default());
        let health = Arc::new(MockHealthSink::default());
        let publisher = Arc::new(publisher);

        let scheduler = Arc::new(CycleScheduler::new(
            SchedulerConfig {
                generation_interval: Duration::from_millis(5),
                sink_timeout: Duration::from_secs(1),
            },
            coordinator,
            tracker,
            Arc::new(MockRegistry {
                reactors: fleet,
                fail: registry_fail,
            }),
            Arc::clone(&telemetry) as Arc<dyn TelemetryStore>,
            Arc::clone(&faults) as Arc<dyn FaultStore>,
            Arc::clone(&health) as Arc<dyn HealthSink>,
            Arc::clone(&publisher) as Arc<dyn Publisher>,
        ));

        Harness {
            scheduler,
            telemetry,
            faults,
            health,
            publisher,
        }
    }

    #[tokio::test]
    async fn test_partial_persist_failure_counts_only_the_lost_reading() {
        let store = MockTelemetryStore {
            reject_reactor: Some(ReactorId::new(2)),
            ..Default::default()
        };
        let h = harness(
            vec![reactor(1), reactor(2)],
            store,
            MockPublisher::default(),
            false,
        );

        h.scheduler.initialize().await.unwrap();
        h.scheduler.run_cycle().await;

        let stats = h.scheduler.statistics().await;
        assert_eq!(stats.total_readings, 2);
        assert_eq!(stats.successful_stores, 1);
        assert_eq!(stats.errors, 1);

        // Both readings were still published; the persist failure did not
        // leak into the bus path.
        assert_eq!(h.publisher.telemetry.lock().await.len(), 2);
        assert_eq!(h.telemetry.stored.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_publish_failure_does_not_block_persistence() {
        let publisher = MockPublisher {
            fail_telemetry: true,
            ..Default::default()
        };
        let h = harness(
            vec![reactor(1), reactor(2)],
            MockTelemetryStore::default(),
            publisher,
            false,
        );

        h.scheduler.initialize().await.unwrap();
        h.scheduler.run_cycle().await;

        let stats = h.scheduler.statistics().await;
        assert_eq!(stats.successful_publishes, 0);
        assert_eq!(stats.successful_stores, 2);
        assert_eq!(stats.errors, 2);
    }

    #[tokio::test]
    async fn test_fault_dedupe_suppresses_within_window() {
        let h = harness(
            vec![reactor(1)],
            MockTelemetryStore::default(),
            MockPublisher::default(),
            false,
        );

        let base = Utc::now();
        let first = critical_reading(1, base);
        let repeat = critical_reading(1, base + ChronoDuration::minutes(30));
        let after_window = critical_reading(1, base + ChronoDuration::hours(2));

        h.scheduler.score_and_check(&[first]).await;
        h.scheduler.score_and_check(&[repeat]).await;
        assert_eq!(h.faults.faults.lock().await.len(), 1);
        assert_eq!(h.publisher.alerts.lock().await.len(), 1);

        h.scheduler.score_and_check(&[after_window]).await;
        assert_eq!(h.faults.faults.lock().await.len(), 2);
        assert_eq!(h.publisher.alerts.lock().await.len(), 2);

        let fault = &h.faults.faults.lock().await[0];
        assert_eq!(fault.fault_type, FaultType::TemperatureSpike);
        assert_eq!(fault.severity, reactorsync_types::FaultSeverity::Red);
    }

    #[tokio::test]
    async fn test_health_updates_use_shared_thresholds() {
        let h = harness(
            vec![reactor(1)],
            MockTelemetryStore::default(),
            MockPublisher::default(),
            false,
        );

        let reading = critical_reading(1, Utc::now());
        h.scheduler.score_and_check(&[reading]).await;

        let updates = h.health.updates.lock().await;
        assert_eq!(updates.len(), 1);
        let (id, score, status) = updates[0];
        assert_eq!(id, ReactorId::new(1));
        assert!(score < 70.0);
        assert_eq!(status, ReactorStatus::Unhealthy);
    }

    #[tokio::test]
    async fn test_stop_honored_at_cycle_boundary_and_cleanup_runs() {
        let h = harness(
            vec![reactor(1)],
            MockTelemetryStore::default(),
            MockPublisher::default(),
            false,
        );

        let scheduler = Arc::clone(&h.scheduler);
        let handle = tokio::spawn(async move { scheduler.run().await });

        tokio::time::sleep(Duration::from_millis(20)).await;
        h.scheduler.stop();

        let result = tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("scheduler did not stop")
            .expect("task panicked");
        assert!(result.is_ok());

        let stats = h.scheduler.statistics().await;
        assert!(!stats.is_running);
        assert!(stats.total_readings >= 1);
        assert!(h.publisher.closed.load(Ordering::Relaxed));
        assert!(h.telemetry.closed.load(Ordering::Relaxed));
    }

    #[tokio::test]
    async fn test_registry_failure_aborts_before_loop_but_still_cleans_up() {
        let h = harness(
            vec![reactor(1)],
            MockTelemetryStore::default(),
            MockPublisher::default(),
            true,
        );

        let result = h.scheduler.run().await;
        assert!(matches!(result, Err(EngineError::RegistryUnavailable(_))));

        let stats = h.scheduler.statistics().await;
        assert_eq!(stats.total_readings, 0);
        assert!(h.publisher.closed.load(Ordering::Relaxed));
        assert!(h.telemetry.closed.load(Ordering::Relaxed));
    }
}
