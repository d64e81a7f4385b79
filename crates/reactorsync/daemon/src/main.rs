//! ReactorSync daemon - fleet telemetry generation service
//!
//! The daemon provides:
//! - a periodic physics-informed telemetry generation loop
//! - anomaly injection with automatic expiry
//! - health scoring and deduplicated fault detection
//! - an admin REST API for anomaly control and statistics

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod config;
mod error;
mod publisher;
mod server;
mod storage;

use crate::config::DaemonConfig;
use crate::error::DaemonError;
use server::Server;

/// ReactorSync daemon CLI
#[derive(Parser)]
#[command(name = "reactorsyncd")]
#[command(about = "ReactorSync daemon - fleet telemetry generation service", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "REACTORSYNC_CONFIG")]
    config: Option<String>,

    /// Listen address for the admin API
    #[arg(short, long, env = "REACTORSYNC_LISTEN_ADDR")]
    listen: Option<String>,

    /// Database connection URL
    #[arg(short, long, env = "REACTORSYNC_DATABASE_URL")]
    database_url: Option<String>,

    /// Seconds between generation cycles
    #[arg(short, long, env = "REACTORSYNC_INTERVAL_SECS")]
    interval: Option<u64>,

    /// Log level (falls back to the configured level)
    #[arg(long, env = "REACTORSYNC_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, env = "REACTORSYNC_LOG_JSON")]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration first so its logging section can back the CLI flags
    let mut config = DaemonConfig::load(cli.config.as_deref())
        .map_err(|e| DaemonError::Config(e.to_string()))?;

    // Initialize tracing: RUST_LOG wins, then --log-level, then the config
    let (level, json) = config.logging.resolve(cli.log_level.as_deref(), cli.json);
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| level.into());

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    // Override with CLI args
    if let Some(listen) = cli.listen {
        config.server.listen_addr = listen
            .parse()
            .map_err(|e| DaemonError::Config(format!("Invalid listen address: {}", e)))?;
    }
    if let Some(url) = cli.database_url {
        config.database.url = url;
    }
    if let Some(interval) = cli.interval {
        if interval == 0 {
            return Err(DaemonError::Config(
                "Generation interval must be at least 1 second".to_string(),
            )
            .into());
        }
        config.generator.interval_secs = interval;
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        listen = %config.server.listen_addr,
        interval_secs = config.generator.interval_secs,
        "Starting ReactorSync daemon"
    );

    // Create and run server
    let server = Server::new(config).await?;
    server.run().await?;
    Ok(())
}
