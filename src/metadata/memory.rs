//! In-memory metadata store
//!
//! Backs tests and single-process deployments. One `RwLock` guards all
//! five tables, which makes the multi-row operations (`promote_commit`,
//! `register_identity`) trivially atomic.
//!
//! `set_unavailable(true)` makes every call fail with a transient error,
//! for exercising the degraded read path.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::commit_log::{CommitRecord, CommitStatus, CurrentVersion};
use crate::identity::registry::{IdentityRow, RegisterOutcome};
use crate::identity::DatasetId;
use crate::readiness::state::ReadinessRecord;
use crate::schema::DatasetSchema;

use super::errors::{MetadataError, MetadataResult};
use super::store::MetadataStore;

#[derive(Default)]
struct Inner {
    identities: HashMap<DatasetId, IdentityRow>,
    /// canonical identity JSON → owning dataset id
    tuple_index: HashMap<String, DatasetId>,
    /// (dataset id, schema version) → schema row
    schemas: HashMap<(DatasetId, String), DatasetSchema>,
    /// (dataset id, version) → commit row; BTreeMap keeps version order
    commits: BTreeMap<(DatasetId, u64), CommitRecord>,
    pointers: HashMap<DatasetId, CurrentVersion>,
    readiness: HashMap<String, ReadinessRecord>,
}

/// In-memory metadata store
#[derive(Default)]
pub struct MemoryMetadataStore {
    inner: RwLock<Inner>,
    unavailable: AtomicBool,
}

impl MemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail with a transient error (test hook for the
    /// metadata-down path).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> MetadataResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(MetadataError::Unavailable(
                "metadata store marked unavailable".into(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl MetadataStore for MemoryMetadataStore {
    async fn register_identity(&self, row: IdentityRow) -> MetadataResult<RegisterOutcome> {
        self.check_available()?;
        let mut inner = self.inner.write().expect("metadata lock");

        if let Some(owner) = inner.tuple_index.get(&row.canonical_identity).cloned() {
            if owner == row.dataset_id {
                let existing = inner
                    .identities
                    .get_mut(&owner)
                    .ok_or_else(|| MetadataError::NotFound(format!("identity {}", owner)))?;
                existing.last_write_at = Utc::now();
                return Ok(RegisterOutcome::Existing(existing.clone()));
            }

            let existing = inner
                .identities
                .get_mut(&owner)
                .ok_or_else(|| MetadataError::NotFound(format!("identity {}", owner)))?;
            existing.collision_attempts += 1;
            existing.last_collision_at = Some(Utc::now());
            return Ok(RegisterOutcome::Conflict {
                existing: existing.clone(),
            });
        }

        inner
            .tuple_index
            .insert(row.canonical_identity.clone(), row.dataset_id.clone());
        inner.identities.insert(row.dataset_id.clone(), row.clone());
        Ok(RegisterOutcome::Inserted(row))
    }

    async fn identity(&self, dataset_id: &DatasetId) -> MetadataResult<Option<IdentityRow>> {
        self.check_available()?;
        let inner = self.inner.read().expect("metadata lock");
        Ok(inner.identities.get(dataset_id).cloned())
    }

    async fn register_schema(&self, schema: DatasetSchema) -> MetadataResult<()> {
        self.check_available()?;
        let mut inner = self.inner.write().expect("metadata lock");

        if schema.is_active {
            for ((id, _), row) in inner.schemas.iter_mut() {
                if id == &schema.dataset_id {
                    row.is_active = false;
                }
            }
        }

        inner.schemas.insert(
            (schema.dataset_id.clone(), schema.schema_version.clone()),
            schema,
        );
        Ok(())
    }

    async fn active_schema(
        &self,
        dataset_id: &DatasetId,
    ) -> MetadataResult<Option<DatasetSchema>> {
        self.check_available()?;
        let inner = self.inner.read().expect("metadata lock");
        Ok(inner
            .schemas
            .values()
            .find(|s| &s.dataset_id == dataset_id && s.is_active)
            .cloned())
    }

    async fn schema_version(
        &self,
        dataset_id: &DatasetId,
        schema_version: &str,
    ) -> MetadataResult<Option<DatasetSchema>> {
        self.check_available()?;
        let inner = self.inner.read().expect("metadata lock");
        Ok(inner
            .schemas
            .get(&(dataset_id.clone(), schema_version.to_string()))
            .cloned())
    }

    async fn next_version(&self, dataset_id: &DatasetId) -> MetadataResult<u64> {
        self.check_available()?;
        let inner = self.inner.read().expect("metadata lock");
        let max = inner
            .commits
            .range((dataset_id.clone(), 0)..=(dataset_id.clone(), u64::MAX))
            .map(|((_, version), _)| *version)
            .max()
            .unwrap_or(0);
        Ok(max + 1)
    }

    async fn insert_commit(&self, row: CommitRecord) -> MetadataResult<()> {
        self.check_available()?;
        let mut inner = self.inner.write().expect("metadata lock");
        let key = (row.dataset_id.clone(), row.version);
        if inner.commits.contains_key(&key) {
            return Err(MetadataError::Duplicate(format!(
                "commit ({}, v{})",
                row.dataset_id, row.version
            )));
        }
        inner.commits.insert(key, row);
        Ok(())
    }

    async fn commit(
        &self,
        dataset_id: &DatasetId,
        version: u64,
    ) -> MetadataResult<Option<CommitRecord>> {
        self.check_available()?;
        let inner = self.inner.read().expect("metadata lock");
        Ok(inner.commits.get(&(dataset_id.clone(), version)).cloned())
    }

    async fn latest_committed(
        &self,
        dataset_id: &DatasetId,
    ) -> MetadataResult<Option<CommitRecord>> {
        self.check_available()?;
        let inner = self.inner.read().expect("metadata lock");
        Ok(inner
            .commits
            .range((dataset_id.clone(), 0)..=(dataset_id.clone(), u64::MAX))
            .rev()
            .map(|(_, row)| row)
            .find(|row| row.status == CommitStatus::Committed)
            .cloned())
    }

    async fn list_commits(&self, dataset_id: &DatasetId) -> MetadataResult<Vec<CommitRecord>> {
        self.check_available()?;
        let inner = self.inner.read().expect("metadata lock");
        Ok(inner
            .commits
            .range((dataset_id.clone(), 0)..=(dataset_id.clone(), u64::MAX))
            .rev()
            .map(|(_, row)| row.clone())
            .collect())
    }

    async fn promote_commit(
        &self,
        dataset_id: &DatasetId,
        version: u64,
        schema_version: Option<String>,
        schema_hash: Option<String>,
        committed_at: DateTime<Utc>,
    ) -> MetadataResult<CurrentVersion> {
        self.check_available()?;
        let mut inner = self.inner.write().expect("metadata lock");

        let key = (dataset_id.clone(), version);
        let status = inner
            .commits
            .get(&key)
            .map(|row| row.status)
            .ok_or_else(|| {
                MetadataError::NotFound(format!("commit ({}, v{})", dataset_id, version))
            })?;
        if status != CommitStatus::Pending {
            return Err(MetadataError::InvalidTransition(format!(
                "commit ({}, v{}) is {}, cannot promote",
                dataset_id, version, status
            )));
        }

        // Supersede any currently committed row
        let range = (dataset_id.clone(), 0)..=(dataset_id.clone(), u64::MAX);
        let committed_keys: Vec<(DatasetId, u64)> = inner
            .commits
            .range(range)
            .filter(|(_, row)| row.status == CommitStatus::Committed)
            .map(|(key, _)| key.clone())
            .collect();
        for old_key in committed_keys {
            if let Some(row) = inner.commits.get_mut(&old_key) {
                row.status = CommitStatus::Superseded;
            }
        }

        // Commit the target
        if let Some(row) = inner.commits.get_mut(&key) {
            row.status = CommitStatus::Committed;
            row.committed_at = Some(committed_at);
            row.schema_version = schema_version.clone();
            row.schema_hash = schema_hash.clone();
        }

        // Upsert the pointer
        let pointer = CurrentVersion::promoted(
            dataset_id.clone(),
            version,
            committed_at,
            schema_version,
            schema_hash,
        );
        inner.pointers.insert(dataset_id.clone(), pointer.clone());

        Ok(pointer)
    }

    async fn rollback_commit(
        &self,
        dataset_id: &DatasetId,
        version: u64,
        reason: &str,
    ) -> MetadataResult<()> {
        self.check_available()?;
        let mut inner = self.inner.write().expect("metadata lock");
        let key = (dataset_id.clone(), version);
        let row = inner.commits.get_mut(&key).ok_or_else(|| {
            MetadataError::NotFound(format!("commit ({}, v{})", dataset_id, version))
        })?;
        if row.status != CommitStatus::Pending {
            return Err(MetadataError::InvalidTransition(format!(
                "commit ({}, v{}) is {}, cannot roll back",
                dataset_id, version, row.status
            )));
        }
        row.status = CommitStatus::RolledBack;
        row.rollback_reason = Some(reason.to_string());
        Ok(())
    }

    async fn set_serving_lkg(
        &self,
        dataset_id: &DatasetId,
        lkg_version: u64,
        reason: &str,
    ) -> MetadataResult<CurrentVersion> {
        self.check_available()?;
        let mut inner = self.inner.write().expect("metadata lock");
        let pointer = inner.pointers.get_mut(dataset_id).ok_or_else(|| {
            MetadataError::NotFound(format!("pointer for dataset {}", dataset_id))
        })?;
        if pointer.last_committed_version == 0 || lkg_version == 0 {
            return Err(MetadataError::InvalidTransition(format!(
                "dataset {} has no committed version to serve as LKG",
                dataset_id
            )));
        }
        pointer.is_serving_lkg = true;
        pointer.lkg_reason = Some(reason.to_string());
        Ok(pointer.clone())
    }

    async fn clear_serving_lkg(
        &self,
        dataset_id: &DatasetId,
    ) -> MetadataResult<Option<CurrentVersion>> {
        self.check_available()?;
        let mut inner = self.inner.write().expect("metadata lock");
        Ok(inner.pointers.get_mut(dataset_id).map(|pointer| {
            pointer.is_serving_lkg = false;
            pointer.lkg_reason = None;
            pointer.clone()
        }))
    }

    async fn current_pointer(
        &self,
        dataset_id: &DatasetId,
    ) -> MetadataResult<Option<CurrentVersion>> {
        self.check_available()?;
        let inner = self.inner.read().expect("metadata lock");
        Ok(inner.pointers.get(dataset_id).cloned())
    }

    async fn sweep_stale_pending(
        &self,
        older_than: DateTime<Utc>,
        reason: &str,
    ) -> MetadataResult<Vec<CommitRecord>> {
        self.check_available()?;
        let mut inner = self.inner.write().expect("metadata lock");
        let mut swept = Vec::new();
        for row in inner.commits.values_mut() {
            if row.status == CommitStatus::Pending && row.ingested_at < older_than {
                row.status = CommitStatus::RolledBack;
                row.rollback_reason = Some(reason.to_string());
                swept.push(row.clone());
            }
        }
        Ok(swept)
    }

    async fn readiness(&self, scope: &str) -> MetadataResult<Option<ReadinessRecord>> {
        self.check_available()?;
        let inner = self.inner.read().expect("metadata lock");
        Ok(inner.readiness.get(scope).cloned())
    }

    async fn upsert_readiness(&self, record: ReadinessRecord) -> MetadataResult<()> {
        self.check_available()?;
        let mut inner = self.inner.write().expect("metadata lock");
        inner.readiness.insert(record.scope.clone(), record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationStatus;

    fn dataset_id() -> DatasetId {
        DatasetId::from_raw("0123456789abcdef")
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
    async fn test_next_version_starts_at_one() {
        let store = MemoryMetadataStore::new();
        assert_eq!(store.next_version(&dataset_id()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_version_rejected() {
        let store = MemoryMetadataStore::new();
        store.insert_commit(pending_row(1)).await.unwrap();
        let result = store.insert_commit(pending_row(1)).await;
        assert!(matches!(result, Err(MetadataError::Duplicate(_))));
    }

    #[tokio::test]
    async fn test_promote_supersedes_previous() {
        let store = MemoryMetadataStore::new();
        let id = dataset_id();

        store.insert_commit(pending_row(1)).await.unwrap();
        store
            .promote_commit(&id, 1, None, None, Utc::now())
            .await
            .unwrap();

        store.insert_commit(pending_row(2)).await.unwrap();
        let pointer = store
            .promote_commit(&id, 2, None, None, Utc::now())
            .await
            .unwrap();

        assert_eq!(pointer.current_version, 2);
        assert!(!pointer.is_serving_lkg);

        let v1 = store.commit(&id, 1).await.unwrap().unwrap();
        assert_eq!(v1.status, CommitStatus::Superseded);
        let v2 = store.commit(&id, 2).await.unwrap().unwrap();
        assert_eq!(v2.status, CommitStatus::Committed);

        // Exactly one committed row
        let committed = store
            .list_commits(&id)
            .await
            .unwrap()
            .into_iter()
            .filter(|r| r.status == CommitStatus::Committed)
            .count();
        assert_eq!(committed, 1);
    }

    #[tokio::test]
    async fn test_promote_requires_pending() {
        let store = MemoryMetadataStore::new();
        let id = dataset_id();
        store.insert_commit(pending_row(1)).await.unwrap();
        store.rollback_commit(&id, 1, "bad data").await.unwrap();

        let result = store.promote_commit(&id, 1, None, None, Utc::now()).await;
        assert!(matches!(result, Err(MetadataError::InvalidTransition(_))));
    }

    #[tokio::test]
    async fn test_lkg_requires_committed_version() {
        let store = MemoryMetadataStore::new();
        let id = dataset_id();

        // No pointer at all
        assert!(store.set_serving_lkg(&id, 1, "fetch failed").await.is_err());

        store.insert_commit(pending_row(1)).await.unwrap();
        store
            .promote_commit(&id, 1, None, None, Utc::now())
            .await
            .unwrap();
        let pointer = store.set_serving_lkg(&id, 1, "fetch failed").await.unwrap();
        assert!(pointer.is_serving_lkg);
        assert_eq!(pointer.lkg_reason.as_deref(), Some("fetch failed"));

        let cleared = store.clear_serving_lkg(&id).await.unwrap().unwrap();
        assert!(!cleared.is_serving_lkg);
    }

    #[tokio::test]
    async fn test_sweep_stale_pending() {
        let store = MemoryMetadataStore::new();
        let id = dataset_id();
        store.insert_commit(pending_row(1)).await.unwrap();

        let swept = store
            .sweep_stale_pending(Utc::now() + chrono::Duration::seconds(1), "reaped")
            .await
            .unwrap();
        assert_eq!(swept.len(), 1);

        let row = store.commit(&id, 1).await.unwrap().unwrap();
        assert_eq!(row.status, CommitStatus::RolledBack);
        assert_eq!(row.rollback_reason.as_deref(), Some("reaped"));
    }

    #[tokio::test]
    async fn test_unavailable_store_fails_transiently() {
        let store = MemoryMetadataStore::new();
        store.set_unavailable(true);
        let err = store.next_version(&dataset_id()).await.unwrap_err();
        assert!(err.is_transient());
    }
}
