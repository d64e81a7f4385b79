//! Admin API handlers.

use crate::api::state::AppState;
use crate::error::{ApiError, ApiResult};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{Duration, Utc};
use reactorsync_engine::{AnomalySummary, StatsSnapshot};
use reactorsync_physics::{parse_severity, AnomalyType};
use reactorsync_types::ReactorId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Liveness probe.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Statistics snapshot, including active anomalies.
pub async fn get_stats(State(state): State<AppState>) -> Json<StatsSnapshot> {
    Json(state.scheduler.statistics().await)
}

/// All currently active injected anomalies.
pub async fn list_anomalies(State(state): State<AppState>) -> Json<Vec<AnomalySummary>> {
    let tracker = state.scheduler.tracker();
    Json(tracker.active_anomalies(Utc::now()).await)
}

#[derive(Debug, Deserialize)]
pub struct InjectAnomalyPayload {
    pub anomaly_type: String,
    pub severity: String,
    #[serde(default = "default_duration_minutes")]
    pub duration_minutes: i64,
}

fn default_duration_minutes() -> i64 {
    30
}

/// Activate an anomaly for a reactor, replacing any existing one.
pub async fn inject_anomaly(
    State(state): State<AppState>,
    Path(reactor_id): Path<i64>,
    Json(payload): Json<InjectAnomalyPayload>,
) -> ApiResult<StatusCode> {
    let anomaly_type = payload
        .anomaly_type
        .parse::<AnomalyType>()
        .map_err(|e| ApiError::Validation(e.to_string()))?;
    let severity =
        parse_severity(&payload.severity).map_err(|e| ApiError::Validation(e.to_string()))?;

    if payload.duration_minutes <= 0 {
        return Err(ApiError::Validation(format!(
            "duration_minutes must be positive, got {}",
            payload.duration_minutes
        )));
    }

    state
        .scheduler
        .tracker()
        .inject(
            ReactorId::new(reactor_id),
            anomaly_type,
            severity,
            Duration::minutes(payload.duration_minutes),
        )
        .await;

    Ok(StatusCode::NO_CONTENT)
}

/// Deactivate any anomaly for a reactor. Idempotent.
pub async fn clear_anomaly(
    State(state): State<AppState>,
    Path(reactor_id): Path<i64>,
) -> StatusCode {
    state
        .scheduler
        .tracker()
        .clear(ReactorId::new(reactor_id))
        .await;
    StatusCode::NO_CONTENT
}
