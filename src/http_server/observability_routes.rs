//! Health and metrics routes

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use super::state::AppState;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
}

/// Build the health router
pub fn health_routes() -> Router {
    Router::new().route("/health", get(health))
}

/// Build the metrics router
pub fn observability_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/metrics", get(metrics))
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "statgate",
    })
}

async fn metrics(State(state): State<Arc<AppState>>) -> Json<crate::observability::metrics::MetricsSnapshot> {
    Json(state.pipeline.metrics.snapshot())
}
