//! Ingest-reporting routes
//!
//! Pushes a batch through the orchestrator and reports the commit
//! outcome under its own HTTP status: 200 committed, 204 off-season
//! empty, 422 schema/invariant violation, 503 everything else that
//! preserved LKG.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::identity::DatasetIdentity;
use crate::ingest::{FetchPayload, FixtureFetcher};

use super::state::AppState;

/// One pushed ingestion request
#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    pub sport: String,
    pub competition_level: String,
    pub season: String,
    pub dataset_type: String,
    #[serde(default)]
    pub qualifier: Option<String>,
    #[serde(default)]
    pub records: Vec<Value>,
    #[serde(default)]
    pub source_reported_unavailable: bool,
    #[serde(default)]
    pub schema_version: Option<String>,
    /// Tag recorded on the commit row
    #[serde(default = "default_source")]
    pub source: String,
}

fn default_source() -> String {
    "push".to_string()
}

#[derive(Debug, Serialize)]
struct SweepResponse {
    swept: usize,
}

#[derive(Debug, Serialize)]
struct IngestErrorResponse {
    code: String,
    message: String,
}

/// Build the ingest router
pub fn ingest_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/ingest", post(ingest))
        .route("/api/ingest/sweep", post(sweep))
        .with_state(state)
}

async fn ingest(
    State(state): State<Arc<AppState>>,
    Json(request): Json<IngestRequest>,
) -> Response {
    let identity = DatasetIdentity::new(
        request.sport,
        request.competition_level,
        request.season,
        request.dataset_type,
        request.qualifier,
    );

    let mut payload = FetchPayload {
        records: request.records,
        source_reported_unavailable: request.source_reported_unavailable,
        schema_version: None,
    };
    if let Some(version) = request.schema_version {
        payload = payload.with_schema_version(version);
    }
    let fetcher = FixtureFetcher::new(payload);

    match state
        .pipeline
        .orchestrator
        .ingest(&identity, &fetcher, &request.source)
        .await
    {
        Ok(outcome) => {
            let status = StatusCode::from_u16(outcome.http_status)
                .unwrap_or(StatusCode::SERVICE_UNAVAILABLE);
            if status == StatusCode::NO_CONTENT {
                return status.into_response();
            }
            (status, Json(outcome)).into_response()
        }
        Err(e) => {
            let status =
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::SERVICE_UNAVAILABLE);
            (
                status,
                Json(IngestErrorResponse {
                    code: e.code().to_string(),
                    message: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

async fn sweep(State(state): State<Arc<AppState>>) -> Response {
    match state.pipeline.orchestrator.sweep_stale_pending().await {
        Ok(swept) => (StatusCode::OK, Json(SweepResponse { swept })).into_response(),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(IngestErrorResponse {
                code: e.code().to_string(),
                message: e.to_string(),
            }),
        )
            .into_response(),
    }
}
