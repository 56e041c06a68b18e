//! Identity registry
//!
//! Keeps the `dataset_id ↔ tuple` mapping in the metadata store. Insertion
//! is race-safe: the store decides under one lock whether the tuple is
//! free, already ours, or claimed by a different id.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::PipelineConfig;
use crate::metadata::MetadataStore;

use super::errors::{IdentityError, IdentityResult};
use super::tuple::{DatasetId, DatasetIdentity, IDENTITY_SCHEMA_VERSION};

/// A registry row, mirroring the `dataset_identity` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityRow {
    pub dataset_id: DatasetId,
    pub identity: DatasetIdentity,
    pub identity_version: u32,
    pub canonical_identity: String,
    pub created_at: DateTime<Utc>,
    pub last_write_at: DateTime<Utc>,
    pub collision_attempts: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_collision_at: Option<DateTime<Utc>>,
}

/// Outcome of a race-safe identity insert
#[derive(Debug, Clone)]
pub enum RegisterOutcome {
    /// Tuple was free; the row was inserted
    Inserted(IdentityRow),
    /// Tuple already registered under the same id
    Existing(IdentityRow),
    /// Tuple already claimed by a different id; the store has bumped
    /// `collision_attempts` on the pre-existing row
    Conflict { existing: IdentityRow },
}

/// Identity registry over the metadata store
pub struct IdentityRegistry {
    store: Arc<dyn MetadataStore>,
    config: Arc<PipelineConfig>,
}

impl IdentityRegistry {
    pub fn new(store: Arc<dyn MetadataStore>, config: Arc<PipelineConfig>) -> Self {
        Self { store, config }
    }

    /// Normalize, derive the id, and insert if absent.
    ///
    /// A tuple already claimed by a different dataset id is a hard
    /// `IDENTITY_VIOLATION`; the pre-existing row keeps serving.
    pub async fn register(&self, identity: &DatasetIdentity) -> IdentityResult<IdentityRow> {
        let normalized = identity.normalize(&self.config)?;
        let (dataset_id, canonical_identity) = normalized.compute_dataset_id();
        let now = Utc::now();

        let row = IdentityRow {
            dataset_id: dataset_id.clone(),
            identity: normalized,
            identity_version: IDENTITY_SCHEMA_VERSION,
            canonical_identity,
            created_at: now,
            last_write_at: now,
            collision_attempts: 0,
            last_collision_at: None,
        };

        match self
            .store
            .register_identity(row)
            .await
            .map_err(|e| IdentityError::Store(e.to_string()))?
        {
            RegisterOutcome::Inserted(row) | RegisterOutcome::Existing(row) => Ok(row),
            RegisterOutcome::Conflict { existing } => Err(IdentityError::TupleClaimed {
                existing_id: existing.dataset_id.to_string(),
                computed_id: dataset_id.to_string(),
            }),
        }
    }

    /// Load the registered tuple for an id.
    pub async fn resolve(&self, dataset_id: &DatasetId) -> IdentityResult<IdentityRow> {
        self.store
            .identity(dataset_id)
            .await
            .map_err(|e| IdentityError::Store(e.to_string()))?
            .ok_or_else(|| IdentityError::NotRegistered(dataset_id.to_string()))
    }

    /// Load the registered tuple and assert it matches the caller's
    /// expectation field by field.
    pub async fn resolve_expecting(
        &self,
        dataset_id: &DatasetId,
        expected: &DatasetIdentity,
    ) -> IdentityResult<IdentityRow> {
        let row = self.resolve(dataset_id).await?;
        expected.assert_matches(&row.identity, dataset_id)?;
        Ok(row)
    }
}
