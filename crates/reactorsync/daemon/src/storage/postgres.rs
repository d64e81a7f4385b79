//! PostgreSQL sink implementation
//!
//! One pool-backed store implements all four engine sink traits: the fleet
//! registry read, the telemetry batch writer, the fault writer with the
//! dedupe lookup, and the health updater.

use crate::config::DatabaseConfig;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reactorsync_engine::{
    FaultStore, HealthSink, ReactorRegistry, SinkError, SinkResult, TelemetryStore,
};
use reactorsync_types::{
    FaultRecord, FaultType, Reactor, ReactorId, ReactorStatus, ReactorType, TelemetryReading,
};
use sqlx::{postgres::PgPoolOptions, PgPool, Row};
use std::time::Duration;

/// PostgreSQL-backed sink store
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Connect to PostgreSQL and initialize schema
    pub async fn connect(config: &DatabaseConfig) -> SinkResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .connect(&config.url)
            .await
            .map_err(|e| SinkError::Connection(e.to_string()))?;

        let store = Self { pool };
        store.initialize_schema().await?;
        Ok(store)
    }

    async fn initialize_schema(&self) -> SinkResult<()> {
        let statements = [
            r#"
            CREATE TABLE IF NOT EXISTS reactors (
                id BIGSERIAL PRIMARY KEY,
                name TEXT NOT NULL,
                type TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'healthy',
                health_score DOUBLE PRECISION NOT NULL DEFAULT 100,
                latitude DOUBLE PRECISION,
                longitude DOUBLE PRECISION
            );
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS telemetry (
                id BIGSERIAL PRIMARY KEY,
                reactor_id BIGINT NOT NULL REFERENCES reactors(id),
                timestamp TIMESTAMPTZ NOT NULL,
                neutron_flux DOUBLE PRECISION NOT NULL,
                core_temperature DOUBLE PRECISION NOT NULL,
                pressure DOUBLE PRECISION NOT NULL,
                vibration DOUBLE PRECISION NOT NULL,
                tritium_level DOUBLE PRECISION NOT NULL
            );
            "#,
            r#"CREATE INDEX IF NOT EXISTS telemetry_reactor_timestamp
               ON telemetry(reactor_id, timestamp DESC);"#,
            r#"
            CREATE TABLE IF NOT EXISTS faults (
                id BIGSERIAL PRIMARY KEY,
                reactor_id BIGINT NOT NULL REFERENCES reactors(id),
                fault_type TEXT NOT NULL,
                severity TEXT NOT NULL,
                description TEXT NOT NULL,
                timestamp TIMESTAMPTZ NOT NULL,
                resolved BOOLEAN NOT NULL DEFAULT FALSE
            );
            "#,
            r#"CREATE INDEX IF NOT EXISTS faults_reactor_type_timestamp
               ON faults(reactor_id, fault_type, timestamp DESC);"#,
        ];

        for stmt in statements {
            sqlx::query(stmt)
                .execute(&self.pool)
                .await
                .map_err(|e| SinkError::Query(e.to_string()))?;
        }

        Ok(())
    }

    fn reactor_from_row(row: &sqlx::postgres::PgRow) -> SinkResult<Reactor> {
        let id: i64 = row
            .try_get("id")
            .map_err(|e| SinkError::Query(e.to_string()))?;
        let type_text: String = row
            .try_get("type")
            .map_err(|e| SinkError::Query(e.to_string()))?;
        let status_text: String = row
            .try_get("status")
            .map_err(|e| SinkError::Query(e.to_string()))?;

        let reactor_type = match type_text.parse::<ReactorType>() {
            Ok(t) => t,
            Err(never) => match never {},
        };

        Ok(Reactor {
            id: ReactorId::new(id),
            name: row
                .try_get("name")
                .map_err(|e| SinkError::Query(e.to_string()))?,
            reactor_type,
            status: parse_status(&status_text),
            health_score: row
                .try_get("health_score")
                .map_err(|e| SinkError::Query(e.to_string()))?,
            latitude: row
                .try_get("latitude")
                .map_err(|e| SinkError::Query(e.to_string()))?,
            longitude: row
                .try_get("longitude")
                .map_err(|e| SinkError::Query(e.to_string()))?,
        })
    }
}

/// Status column values predate the generator and are free-form; anything
/// unrecognized reads as healthy until the first cycle overwrites it.
fn parse_status(s: &str) -> ReactorStatus {
    match s {
        "warning" => ReactorStatus::Warning,
        "unhealthy" => ReactorStatus::Unhealthy,
        _ => ReactorStatus::Healthy,
    }
}

#[async_trait]
impl ReactorRegistry for PostgresStore {
    async fn list_reactors(&self) -> SinkResult<Vec<Reactor>> {
        let rows = sqlx::query(
            "SELECT id, name, type, status, health_score, latitude, longitude
             FROM reactors ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| SinkError::Query(e.to_string()))?;

        rows.iter().map(Self::reactor_from_row).collect()
    }
}

#[async_trait]
impl TelemetryStore for PostgresStore {
    async fn ping(&self) -> SinkResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| SinkError::Connection(e.to_string()))?;
        Ok(())
    }

    async fn insert_batch(&self, readings: &[TelemetryReading]) -> SinkResult<usize> {
        let mut stored = 0usize;

        // Row-at-a-time so one bad row (say, a foreign key violation for a
        // reactor deleted mid-run) does not discard the rest of the batch.
        for reading in readings {
            let result = sqlx::query(
                r#"
                INSERT INTO telemetry
                    (reactor_id, timestamp, neutron_flux, core_temperature,
                     pressure, vibration, tritium_level)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(reading.reactor_id.as_i64())
            .bind(reading.timestamp)
            .bind(reading.neutron_flux)
            .bind(reading.core_temperature)
            .bind(reading.pressure)
            .bind(reading.vibration)
            .bind(reading.tritium_level)
            .execute(&self.pool)
            .await;

            match result {
                Ok(_) => stored += 1,
                Err(e) => {
                    tracing::warn!(
                        reactor_id = %reading.reactor_id,
                        error = %e,
                        "Telemetry row insert failed"
                    );
                }
            }
        }

        Ok(stored)
    }

    async fn close(&self) -> SinkResult<()> {
        self.pool.close().await;
        tracing::info!("Database connection pool closed");
        Ok(())
    }
}

#[async_trait]
impl FaultStore for PostgresStore {
    async fn has_recent_unresolved(
        &self,
        reactor_id: ReactorId,
        fault_type: FaultType,
        since: DateTime<Utc>,
    ) -> SinkResult<bool> {
        let row = sqlx::query(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM faults
                WHERE reactor_id = $1
                  AND fault_type = $2
                  AND resolved = FALSE
                  AND timestamp > $3
            ) AS present
            "#,
        )
        .bind(reactor_id.as_i64())
        .bind(fault_type.as_str())
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| SinkError::Query(e.to_string()))?;

        row.try_get("present")
            .map_err(|e| SinkError::Query(e.to_string()))
    }

    async fn insert_fault(&self, fault: &FaultRecord) -> SinkResult<()> {
        sqlx::query(
            r#"
            INSERT INTO faults (reactor_id, fault_type, severity, description, timestamp)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(fault.reactor_id.as_i64())
        .bind(fault.fault_type.as_str())
        .bind(fault.severity.as_str())
        .bind(&fault.description)
        .bind(fault.timestamp)
        .execute(&self.pool)
        .await
        .map_err(|e| SinkError::Query(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl HealthSink for PostgresStore {
    async fn update_health(
        &self,
        reactor_id: ReactorId,
        health_score: f64,
        status: ReactorStatus,
    ) -> SinkResult<()> {
        sqlx::query("UPDATE reactors SET health_score = $2, status = $3 WHERE id = $1")
            .bind(reactor_id.as_i64())
            .bind(health_score)
            .bind(status.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| SinkError::Query(e.to_string()))?;

        Ok(())
    }
}
