//! Snapshot documents and retention
//!
//! A snapshot is the full dataset payload plus its validation summary,
//! written after every successful promotion and read back for cold-start
//! recovery. `latest.json` is overwritten best-effort and never deleted;
//! per-version snapshots beyond the retention count are pruned.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::identity::{DatasetId, DatasetIdentity};
use crate::validation::ValidationStatus;

use super::errors::{ObjectError, ObjectResult};
use super::store::{ObjectMetadata, ObjectStore};

/// Validation summary carried in every snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotValidation {
    pub status: ValidationStatus,
    pub record_count: usize,
    pub expected_min: usize,
}

/// One stored snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotDocument {
    pub dataset_id: DatasetId,
    pub identity: DatasetIdentity,
    pub canonical_identity: String,
    pub version: u64,
    pub data: Vec<Value>,
    pub validation: SnapshotValidation,
    pub snapshot_at: DateTime<Utc>,
}

impl SnapshotDocument {
    /// Structural validation used by cold-start recovery: the identity
    /// must match the expected one and the summary must agree with the
    /// payload.
    pub fn validate_structure(&self, expected: &DatasetIdentity) -> Result<(), String> {
        expected
            .assert_matches(&self.identity, &self.dataset_id)
            .map_err(|e| e.to_string())?;
        if self.validation.record_count != self.data.len() {
            return Err(format!(
                "summary says {} records, payload has {}",
                self.validation.record_count,
                self.data.len()
            ));
        }
        Ok(())
    }

    /// Snapshot age at `now`
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.snapshot_at
    }
}

/// Snapshot reader/writer over the object store
pub struct SnapshotStore {
    store: Arc<dyn ObjectStore>,
    retain_versions: u64,
}

impl SnapshotStore {
    pub fn new(store: Arc<dyn ObjectStore>, retain_versions: u64) -> Self {
        Self {
            store,
            retain_versions,
        }
    }

    fn base_key(dataset_id: &DatasetId) -> String {
        format!("snapshots/{}", dataset_id)
    }

    fn version_key(dataset_id: &DatasetId, version: u64) -> String {
        format!("snapshots/{}/v{}.json", dataset_id, version)
    }

    fn latest_key(dataset_id: &DatasetId) -> String {
        format!("snapshots/{}/latest.json", dataset_id)
    }

    /// Write the per-version snapshot and overwrite `latest`, then prune
    /// versions beyond the retention count. Pruning is best-effort.
    pub async fn write(&self, document: &SnapshotDocument) -> ObjectResult<()> {
        let body =
            serde_json::to_vec(document).map_err(|e| ObjectError::Io(e.to_string()))?;
        let metadata = ObjectMetadata {
            dataset_id: document.dataset_id.clone(),
            version: document.version,
            record_count: document.validation.record_count,
            validation_status: document.validation.status,
        };

        self.store
            .put(
                &Self::version_key(&document.dataset_id, document.version),
                &body,
                &metadata,
            )
            .await?;

        // `latest` is best-effort; per-version is the durable record
        let _ = self
            .store
            .put(&Self::latest_key(&document.dataset_id), &body, &metadata)
            .await;

        self.prune(&document.dataset_id).await;
        Ok(())
    }

    async fn prune(&self, dataset_id: &DatasetId) {
        let Ok(keys) = self.store.list(&Self::base_key(dataset_id)).await else {
            return;
        };

        let mut versions: Vec<(u64, String)> = keys
            .into_iter()
            .filter_map(|key| {
                let name = key.rsplit('/').next()?;
                let version: u64 = name.strip_prefix('v')?.strip_suffix(".json")?.parse().ok()?;
                Some((version, key))
            })
            .collect();
        versions.sort_by(|a, b| b.0.cmp(&a.0));

        for (_, key) in versions.into_iter().skip(self.retain_versions as usize) {
            let _ = self.store.delete(&key).await;
        }
    }

    /// Latest snapshot, falling back through parse failure to `None`
    /// only when nothing is stored.
    pub async fn latest(&self, dataset_id: &DatasetId) -> ObjectResult<Option<SnapshotDocument>> {
        self.read_key(&Self::latest_key(dataset_id)).await
    }

    /// A specific per-version snapshot.
    pub async fn version(
        &self,
        dataset_id: &DatasetId,
        version: u64,
    ) -> ObjectResult<Option<SnapshotDocument>> {
        self.read_key(&Self::version_key(dataset_id, version)).await
    }

    async fn read_key(&self, key: &str) -> ObjectResult<Option<SnapshotDocument>> {
        let Some(stored) = self.store.get(key).await? else {
            return Ok(None);
        };
        let document = serde_json::from_slice(&stored.body)
            .map_err(|e| ObjectError::malformed(key, e.to_string()))?;
        Ok(Some(document))
    }
}
