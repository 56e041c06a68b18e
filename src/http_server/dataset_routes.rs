//! Dataset read routes
//!
//! The validated read surfaced over HTTP. Headers are derived from the
//! wire directive; the body is the standard response envelope. A 204
//! carries no body at all.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::identity::DatasetIdentity;
use crate::read::{ReadOutcome, ReadSource};
use crate::serve::{ApiResponse, CacheMeta, ResponseMeta, ResponseStatus};

use super::state::AppState;

/// Optional read qualifiers
#[derive(Debug, Deserialize)]
pub struct ReadQuery {
    #[serde(default)]
    pub qualifier: Option<String>,
}

/// Build the dataset router
pub fn dataset_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/api/datasets/:sport/:level/:season/:dataset_type",
            get(read_dataset),
        )
        .with_state(state)
}

async fn read_dataset(
    State(state): State<Arc<AppState>>,
    Path((sport, level, season, dataset_type)): Path<(String, String, String, String)>,
    Query(query): Query<ReadQuery>,
) -> Response {
    let identity = DatasetIdentity::new(sport, level, season, dataset_type, query.qualifier);
    let outcome = state.pipeline.reader.read(&identity).await;
    render_read(&state, outcome)
}

fn render_read(state: &AppState, outcome: ReadOutcome) -> Response {
    let status =
        StatusCode::from_u16(outcome.directive.http_status).unwrap_or(StatusCode::SERVICE_UNAVAILABLE);

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_str(&outcome.directive.cache_control)
            .unwrap_or_else(|_| HeaderValue::from_static("no-store")),
    );
    if let Some(retry_after) = outcome.directive.retry_after {
        headers.insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
    }
    if outcome.source != ReadSource::None {
        headers.insert(
            HeaderName::from_static("x-data-source"),
            HeaderValue::from_static(outcome.source.as_str()),
        );
    }
    if outcome.legacy {
        headers.insert(
            HeaderName::from_static("legacy-format"),
            HeaderValue::from_static("true"),
        );
    }

    // A 204 must not carry a body
    if status == StatusCode::NO_CONTENT {
        return (status, headers).into_response();
    }

    let response_status = match (&outcome.error, outcome.validation) {
        (Some(_), _) => ResponseStatus::Unavailable,
        (None, Some(validation)) => ResponseStatus::from(validation),
        (None, None) => ResponseStatus::Unavailable,
    };

    let body: ApiResponse = ApiResponse {
        status: response_status,
        data: outcome.data,
        meta: ResponseMeta {
            cache: CacheMeta {
                hit: false,
                ttl_seconds: outcome.directive.ttl_seconds,
                eligible: outcome.directive.cache_eligible,
            },
            quota: state.quota.take(),
            lifecycle: outcome.lifecycle,
            renderability: outcome.renderability,
        },
        error: outcome.error,
    };

    (status, headers, Json(body)).into_response()
}
