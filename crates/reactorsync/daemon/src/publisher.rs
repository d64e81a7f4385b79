//! In-process bus publisher
//!
//! Fans telemetry and alert envelopes out over tokio broadcast channels.
//! The external gateway subscribes and forwards to its WebSocket clients;
//! the envelope shape on the channel is identical to what a durable bus
//! producer would serialize, so swapping one in changes only this module.

use async_trait::async_trait;
use reactorsync_engine::{Publisher, SinkError, SinkResult};
use reactorsync_types::{AlertEnvelope, TelemetryEnvelope};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::broadcast;

/// Broadcast-backed implementation of the engine's `Publisher` sink.
#[derive(Debug)]
pub struct BroadcastPublisher {
    telemetry_tx: broadcast::Sender<TelemetryEnvelope>,
    alert_tx: broadcast::Sender<AlertEnvelope>,
    closed: AtomicBool,
}

impl BroadcastPublisher {
    pub fn new(capacity: usize) -> Self {
        let (telemetry_tx, _) = broadcast::channel(capacity);
        let (alert_tx, _) = broadcast::channel(capacity);
        Self {
            telemetry_tx,
            alert_tx,
            closed: AtomicBool::new(false),
        }
    }

    // Subscription points for the gateway process; nothing in the daemon
    // itself consumes the channels.
    #[allow(dead_code)]
    pub fn subscribe_telemetry(&self) -> broadcast::Receiver<TelemetryEnvelope> {
        self.telemetry_tx.subscribe()
    }

    #[allow(dead_code)]
    pub fn subscribe_alerts(&self) -> broadcast::Receiver<AlertEnvelope> {
        self.alert_tx.subscribe()
    }

    fn ensure_open(&self) -> SinkResult<()> {
        if self.closed.load(Ordering::Relaxed) {
            Err(SinkError::Closed)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Publisher for BroadcastPublisher {
    async fn publish_telemetry(&self, envelope: TelemetryEnvelope) -> SinkResult<()> {
        self.ensure_open()?;
        // A send error only means no subscriber is connected right now;
        // telemetry is fire-and-forget, so that is not a failure.
        let _ = self.telemetry_tx.send(envelope);
        Ok(())
    }

    async fn publish_alert(&self, envelope: AlertEnvelope) -> SinkResult<()> {
        self.ensure_open()?;
        let _ = self.alert_tx.send(envelope);
        Ok(())
    }

    async fn health_check(&self) -> SinkResult<()> {
        self.ensure_open()
    }

    async fn close(&self) -> SinkResult<()> {
        self.closed.store(true, Ordering::Relaxed);
        tracing::info!("Bus publisher closed");
        Ok(())
    }
}
