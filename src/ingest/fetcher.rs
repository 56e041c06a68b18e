//! Upstream fetcher seam
//!
//! Third-party data sources live behind this trait. The orchestrator
//! never retries a fetch; a failed fetch is a recorded attempt, not a
//! loop.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::identity::{DatasetId, DatasetIdentity};

/// What an upstream source returned
#[derive(Debug, Clone)]
pub struct FetchPayload {
    pub records: Vec<Value>,
    /// Source explicitly reported the dataset unavailable
    pub source_reported_unavailable: bool,
    /// Schema version the source claims the records conform to
    pub schema_version: Option<String>,
}

impl FetchPayload {
    pub fn records(records: Vec<Value>) -> Self {
        Self {
            records,
            source_reported_unavailable: false,
            schema_version: None,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            records: Vec::new(),
            source_reported_unavailable: true,
            schema_version: None,
        }
    }

    pub fn with_schema_version(mut self, version: impl Into<String>) -> Self {
        self.schema_version = Some(version.into());
        self
    }
}

/// Fetch failure
#[derive(Debug, Clone, Error)]
#[error("fetch failed: {0}")]
pub struct FetchError(pub String);

impl FetchError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// Upstream data source
#[async_trait]
pub trait DatasetFetcher: Send + Sync {
    async fn fetch(
        &self,
        dataset_id: &DatasetId,
        identity: &DatasetIdentity,
    ) -> Result<FetchPayload, FetchError>;
}

/// A fetcher that returns a fixed payload. Backs the one-shot CLI
/// ingest command and tests.
pub struct FixtureFetcher {
    payload: FetchPayload,
}

impl FixtureFetcher {
    pub fn new(payload: FetchPayload) -> Self {
        Self { payload }
    }
}

#[async_trait]
impl DatasetFetcher for FixtureFetcher {
    async fn fetch(
        &self,
        _dataset_id: &DatasetId,
        _identity: &DatasetIdentity,
    ) -> Result<FetchPayload, FetchError> {
        Ok(self.payload.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_fixture_fetcher_returns_payload() {
        let fetcher = FixtureFetcher::new(
            FetchPayload::records(vec![json!({"team": "a"})]).with_schema_version("1.0.0"),
        );
        let identity = DatasetIdentity::new("baseball", "mlb", "2026", "rankings", None);
        let (id, _) = identity.compute_dataset_id();

        let payload = fetcher.fetch(&id, &identity).await.unwrap();
        assert_eq!(payload.records.len(), 1);
        assert_eq!(payload.schema_version.as_deref(), Some("1.0.0"));
        assert!(!payload.source_reported_unavailable);
    }
}
