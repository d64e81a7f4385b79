//! API Router configuration

use super::handlers;
use super::state::AppState;
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the admin API router
pub fn create_router(state: AppState, enable_cors: bool) -> Router {
    let api_routes = Router::new()
        .route("/anomalies", get(handlers::list_anomalies))
        .route("/anomalies/:reactor_id", post(handlers::inject_anomaly))
        .route("/anomalies/:reactor_id", delete(handlers::clear_anomaly))
        .route("/stats", get(handlers::get_stats));

    let mut router = Router::new()
        .route("/healthz", get(handlers::health_check))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http());

    if enable_cors {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    router.with_state(state)
}
