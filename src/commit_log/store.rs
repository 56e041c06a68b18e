//! Commit log operations over the metadata store
//!
//! Thin, typed layer that maps store errors into the commit-log taxonomy
//! and enforces operation preconditions the orchestrator relies on.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::identity::DatasetId;
use crate::metadata::{MetadataError, MetadataStore};

use super::errors::{CommitLogError, CommitLogResult};
use super::pointer::CurrentVersion;
use super::record::CommitRecord;

/// Commit log facade
pub struct CommitLog {
    store: Arc<dyn MetadataStore>,
}

impl CommitLog {
    pub fn new(store: Arc<dyn MetadataStore>) -> Self {
        Self { store }
    }

    /// `MAX(version) + 1`, or 1 for a dataset with no history.
    pub async fn next_version(&self, dataset_id: &DatasetId) -> CommitLogResult<u64> {
        self.store
            .next_version(dataset_id)
            .await
            .map_err(map_store_error)
    }

    /// Insert a pending commit row.
    pub async fn create_pending_commit(&self, row: CommitRecord) -> CommitLogResult<()> {
        let dataset_id = row.dataset_id.clone();
        let version = row.version;
        self.store.insert_commit(row).await.map_err(|e| match e {
            MetadataError::Duplicate(_) => CommitLogError::DuplicateVersion {
                dataset_id: dataset_id.to_string(),
                version,
            },
            other => map_store_error(other),
        })
    }

    /// Atomic promotion: supersede + commit + pointer upsert.
    pub async fn promote_commit(
        &self,
        dataset_id: &DatasetId,
        version: u64,
        schema_version: Option<String>,
        schema_hash: Option<String>,
        committed_at: DateTime<Utc>,
    ) -> CommitLogResult<CurrentVersion> {
        self.store
            .promote_commit(dataset_id, version, schema_version, schema_hash, committed_at)
            .await
            .map_err(|e| match e {
                MetadataError::NotFound(_) => CommitLogError::CommitNotFound {
                    dataset_id: dataset_id.to_string(),
                    version,
                },
                MetadataError::InvalidTransition(_) => CommitLogError::InvalidTransition {
                    dataset_id: dataset_id.to_string(),
                    version,
                    status: "not pending",
                    operation: "promote",
                },
                other => map_store_error(other),
            })
    }

    /// Transition a pending row to rolled_back with the reason.
    pub async fn rollback_commit(
        &self,
        dataset_id: &DatasetId,
        version: u64,
        reason: &str,
    ) -> CommitLogResult<()> {
        self.store
            .rollback_commit(dataset_id, version, reason)
            .await
            .map_err(|e| match e {
                MetadataError::NotFound(_) => CommitLogError::CommitNotFound {
                    dataset_id: dataset_id.to_string(),
                    version,
                },
                MetadataError::InvalidTransition(_) => CommitLogError::InvalidTransition {
                    dataset_id: dataset_id.to_string(),
                    version,
                    status: "not pending",
                    operation: "rollback",
                },
                other => map_store_error(other),
            })
    }

    /// Flag the pointer as serving LKG with a non-empty reason.
    pub async fn mark_serving_lkg(
        &self,
        dataset_id: &DatasetId,
        lkg_version: u64,
        reason: &str,
    ) -> CommitLogResult<CurrentVersion> {
        self.store
            .set_serving_lkg(dataset_id, lkg_version, reason)
            .await
            .map_err(|e| match e {
                MetadataError::NotFound(_) | MetadataError::InvalidTransition(_) => {
                    CommitLogError::NoLkgCandidate(dataset_id.to_string())
                }
                other => map_store_error(other),
            })
    }

    /// Clear the LKG flag.
    pub async fn clear_lkg_status(
        &self,
        dataset_id: &DatasetId,
    ) -> CommitLogResult<Option<CurrentVersion>> {
        self.store
            .clear_serving_lkg(dataset_id)
            .await
            .map_err(map_store_error)
    }

    pub async fn current_pointer(
        &self,
        dataset_id: &DatasetId,
    ) -> CommitLogResult<Option<CurrentVersion>> {
        self.store
            .current_pointer(dataset_id)
            .await
            .map_err(map_store_error)
    }

    pub async fn latest_committed(
        &self,
        dataset_id: &DatasetId,
    ) -> CommitLogResult<Option<CommitRecord>> {
        self.store
            .latest_committed(dataset_id)
            .await
            .map_err(map_store_error)
    }

    pub async fn commit(
        &self,
        dataset_id: &DatasetId,
        version: u64,
    ) -> CommitLogResult<Option<CommitRecord>> {
        self.store
            .commit(dataset_id, version)
            .await
            .map_err(map_store_error)
    }

    pub async fn list_commits(
        &self,
        dataset_id: &DatasetId,
    ) -> CommitLogResult<Vec<CommitRecord>> {
        self.store
            .list_commits(dataset_id)
            .await
            .map_err(map_store_error)
    }

    /// Reap pending rows older than the cutoff.
    pub async fn sweep_stale_pending(
        &self,
        older_than: DateTime<Utc>,
    ) -> CommitLogResult<Vec<CommitRecord>> {
        self.store
            .sweep_stale_pending(older_than, "pending past reaper timeout")
            .await
            .map_err(map_store_error)
    }
}

fn map_store_error(e: MetadataError) -> CommitLogError {
    CommitLogError::Store(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::MemoryMetadataStore;
    use crate::validation::ValidationStatus;

    fn dataset_id() -> DatasetId {
        DatasetId::from_raw("0123456789abcdef")
    }

    fn log() -> CommitLog {
        CommitLog::new(Arc::new(MemoryMetadataStore::new()))
    }

    fn pending_row(version: u64) -> CommitRecord {
        CommitRecord::pending(
            dataset_id(),
            version,
            25,
            None,
            ValidationStatus::Valid,
            vec![],
            format!("statgate:{}:v{}", dataset_id(), version),
            "test",
        )
    }

    #[tokio::test]
    async fn test_versions_monotone() {
        let log = log();
        let id = dataset_id();

        for expected in 1..=3u64 {
            let version = log.next_version(&id).await.unwrap();
            assert_eq!(version, expected);
            log.create_pending_commit(pending_row(version)).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_duplicate_version_maps_to_conflict() {
        let log = log();
        log.create_pending_commit(pending_row(1)).await.unwrap();
        let err = log.create_pending_commit(pending_row(1)).await.unwrap_err();
        assert_eq!(err.code(), "VERSION_CONFLICT");
    }

    #[tokio::test]
    async fn test_promote_then_rollback_is_invalid() {
        let log = log();
        let id = dataset_id();
        log.create_pending_commit(pending_row(1)).await.unwrap();
        log.promote_commit(&id, 1, None, None, Utc::now())
            .await
            .unwrap();

        let err = log.rollback_commit(&id, 1, "too late").await.unwrap_err();
        assert_eq!(err.code(), "PROMOTE_FAILED");
    }

    #[tokio::test]
    async fn test_lkg_flow() {
        let log = log();
        let id = dataset_id();
        log.create_pending_commit(pending_row(1)).await.unwrap();
        log.promote_commit(&id, 1, None, None, Utc::now())
            .await
            .unwrap();

        let pointer = log
            .mark_serving_lkg(&id, 1, "upstream fetch failed")
            .await
            .unwrap();
        assert!(pointer.is_serving_lkg);
        assert!(pointer.invariants_hold());

        let pointer = log.clear_lkg_status(&id).await.unwrap().unwrap();
        assert!(!pointer.is_serving_lkg);
    }
}
