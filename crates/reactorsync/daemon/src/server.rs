//! Server setup and lifecycle management

use crate::api::create_router;
use crate::api::state::AppState;
use crate::config::DaemonConfig;
use crate::error::{DaemonError, DaemonResult};
use crate::publisher::BroadcastPublisher;
use crate::storage::PostgresStore;
use reactorsync_engine::{
    AnomalyTracker, CycleScheduler, FaultStore, HealthSink, Publisher, ReactorRegistry,
    TelemetryCoordinator, TelemetryStore,
};
use std::sync::Arc;
use tokio::net::TcpListener;

/// ReactorSync daemon server
pub struct Server {
    config: DaemonConfig,
    scheduler: Arc<CycleScheduler>,
}

impl Server {
    /// Connect the sinks and wire up the generation engine.
    pub async fn new(config: DaemonConfig) -> DaemonResult<Self> {
        let store = Arc::new(PostgresStore::connect(&config.database).await?);
        let publisher = Arc::new(BroadcastPublisher::new(config.generator.bus_capacity));

        let tracker = Arc::new(AnomalyTracker::new());
        let coordinator = TelemetryCoordinator::new(Arc::clone(&tracker));

        let scheduler = Arc::new(CycleScheduler::new(
            config.generator.scheduler(),
            coordinator,
            tracker,
            Arc::clone(&store) as Arc<dyn ReactorRegistry>,
            Arc::clone(&store) as Arc<dyn TelemetryStore>,
            Arc::clone(&store) as Arc<dyn FaultStore>,
            store as Arc<dyn HealthSink>,
            publisher as Arc<dyn Publisher>,
        ));

        Ok(Self { config, scheduler })
    }

    /// Run the generation loop and the admin API until shutdown.
    pub async fn run(self) -> DaemonResult<()> {
        let addr = self.config.server.listen_addr;

        let state = AppState::new(Arc::clone(&self.scheduler));
        let app = create_router(state, self.config.server.enable_cors);
        let listener = TcpListener::bind(addr).await?;

        tracing::info!(%addr, "ReactorSync daemon listening");

        let engine_scheduler = Arc::clone(&self.scheduler);
        let mut engine = tokio::spawn(async move { engine_scheduler.run().await });

        let serve = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());

        tokio::select! {
            result = serve => {
                result.map_err(|e| DaemonError::Server(e.to_string()))?;
                tracing::info!("ReactorSync daemon shutting down");

                self.scheduler.stop();
                match engine.await {
                    Ok(engine_result) => engine_result.map_err(DaemonError::Engine),
                    Err(e) => Err(DaemonError::Server(format!("engine task panicked: {}", e))),
                }
            }
            // The loop only exits on its own when startup wiring failed.
            result = &mut engine => match result {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => Err(DaemonError::Engine(e)),
                Err(e) => Err(DaemonError::Server(format!("engine task panicked: {}", e))),
            },
        }
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        }
    }
}
