//! Admin routes
//!
//! Schema and identity registration (never done by ingestion), readiness
//! control, and dataset status introspection.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::commit_log::{CommitRecord, CurrentVersion};
use crate::identity::DatasetIdentity;
use crate::readiness::ReadinessRecord;
use crate::schema::{DatasetSchema, Invariant};

use super::state::AppState;

#[derive(Debug, Serialize)]
struct AdminError {
    code: String,
    message: String,
}

impl AdminError {
    fn response(status: u16, code: &str, message: impl Into<String>) -> Response {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (
            status,
            Json(AdminError {
                code: code.to_string(),
                message: message.into(),
            }),
        )
            .into_response()
    }
}

/// Identity registration request
#[derive(Debug, Deserialize)]
pub struct RegisterIdentityRequest {
    pub sport: String,
    pub competition_level: String,
    pub season: String,
    pub dataset_type: String,
    #[serde(default)]
    pub qualifier: Option<String>,
}

/// Schema registration request
#[derive(Debug, Deserialize)]
pub struct RegisterSchemaRequest {
    pub sport: String,
    pub competition_level: String,
    pub season: String,
    pub dataset_type: String,
    #[serde(default)]
    pub qualifier: Option<String>,
    pub schema_version: String,
    pub required_fields: Vec<String>,
    #[serde(default)]
    pub invariants: Vec<Invariant>,
    pub minimum_renderable_count: usize,
    #[serde(default)]
    pub sunset_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Readiness control request
#[derive(Debug, Deserialize)]
pub struct ReadinessActionRequest {
    /// "reset" or "unavailable"
    pub action: String,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
struct DatasetStatusResponse {
    pointer: Option<CurrentVersion>,
    readiness: Option<ReadinessRecord>,
    commits: Vec<CommitRecord>,
}

/// Build the admin router
pub fn admin_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/admin/identities", post(register_identity))
        .route("/api/admin/schemas", post(register_schema))
        .route("/api/admin/readiness/:scope", post(readiness_action))
        .route("/api/admin/datasets/:dataset_id/status", get(dataset_status))
        .with_state(state)
}

async fn register_identity(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterIdentityRequest>,
) -> Response {
    let identity = DatasetIdentity::new(
        request.sport,
        request.competition_level,
        request.season,
        request.dataset_type,
        request.qualifier,
    );

    match state.pipeline.identities.register(&identity).await {
        Ok(row) => (StatusCode::OK, Json(row)).into_response(),
        Err(e) => AdminError::response(e.status_code(), e.code(), e.to_string()),
    }
}

async fn register_schema(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterSchemaRequest>,
) -> Response {
    let identity = DatasetIdentity::new(
        request.sport,
        request.competition_level,
        request.season,
        request.dataset_type,
        request.qualifier,
    );
    let normalized = match identity.normalize(&state.pipeline.config) {
        Ok(normalized) => normalized,
        Err(e) => return AdminError::response(e.status_code(), e.code(), e.to_string()),
    };
    let (dataset_id, _) = normalized.compute_dataset_id();

    let schema = match DatasetSchema::new(
        dataset_id,
        request.schema_version,
        request.required_fields,
        request.invariants,
        request.minimum_renderable_count,
    ) {
        Ok(schema) => match request.sunset_at {
            Some(at) => schema.with_sunset(at),
            None => schema,
        },
        Err(e) => return AdminError::response(e.code().status_code(), e.code().code(), e.to_string()),
    };

    match state.pipeline.schemas.register(schema).await {
        Ok(schema) => (StatusCode::OK, Json(schema)).into_response(),
        Err(e) => AdminError::response(e.code().status_code(), e.code().code(), e.to_string()),
    }
}

async fn readiness_action(
    State(state): State<Arc<AppState>>,
    Path(scope): Path<String>,
    Json(request): Json<ReadinessActionRequest>,
) -> Response {
    let readiness = &state.pipeline.readiness;
    let reason = request.reason.unwrap_or_else(|| "admin action".to_string());

    let result = match request.action.as_str() {
        "reset" => readiness.admin_reset(&scope).await,
        "unavailable" => readiness.admin_unavailable(&scope, &reason).await,
        other => {
            return AdminError::response(
                400,
                "UNKNOWN_ACTION",
                format!("unknown readiness action '{}'", other),
            );
        }
    };

    match result {
        Ok(()) => match readiness.record(&scope).await {
            Ok(record) => (StatusCode::OK, Json(record)).into_response(),
            Err(e) => AdminError::response(503, e.code(), e.to_string()),
        },
        Err(e) => AdminError::response(503, e.code(), e.to_string()),
    }
}

async fn dataset_status(
    State(state): State<Arc<AppState>>,
    Path(dataset_id): Path<String>,
) -> Response {
    let dataset_id = crate::identity::DatasetId::from_raw(dataset_id);
    let pipeline = &state.pipeline;

    let pointer = match pipeline.commit_log.current_pointer(&dataset_id).await {
        Ok(pointer) => pointer,
        Err(e) => return AdminError::response(503, e.code(), e.to_string()),
    };
    let commits = match pipeline.commit_log.list_commits(&dataset_id).await {
        Ok(commits) => commits,
        Err(e) => return AdminError::response(503, e.code(), e.to_string()),
    };
    let readiness = pipeline
        .readiness
        .record(dataset_id.as_str())
        .await
        .unwrap_or(None);

    (
        StatusCode::OK,
        Json(DatasetStatusResponse {
            pointer,
            readiness,
            commits,
        }),
    )
        .into_response()
}
