//! Metadata store contract

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::commit_log::{CommitRecord, CurrentVersion};
use crate::identity::registry::{IdentityRow, RegisterOutcome};
use crate::identity::DatasetId;
use crate::readiness::state::ReadinessRecord;
use crate::schema::DatasetSchema;

use super::errors::MetadataResult;

/// The five logical tables behind the pipeline.
///
/// Implementations must uphold:
/// - `(dataset_id, version)` uniqueness on commits
/// - at most one `committed` commit row per dataset
/// - at most one active schema per dataset
/// - tuple uniqueness on identities
#[async_trait]
pub trait MetadataStore: Send + Sync {
    // --- dataset_identity ---

    /// Race-safe identity insert. A tuple claimed by a different id bumps
    /// the existing row's collision counter and reports a conflict.
    async fn register_identity(&self, row: IdentityRow) -> MetadataResult<RegisterOutcome>;

    async fn identity(&self, dataset_id: &DatasetId) -> MetadataResult<Option<IdentityRow>>;

    // --- dataset_schema ---

    /// Insert a schema row. When the row is active, any prior active
    /// schema for the dataset is deactivated in the same operation.
    async fn register_schema(&self, schema: DatasetSchema) -> MetadataResult<()>;

    async fn active_schema(&self, dataset_id: &DatasetId)
        -> MetadataResult<Option<DatasetSchema>>;

    async fn schema_version(
        &self,
        dataset_id: &DatasetId,
        schema_version: &str,
    ) -> MetadataResult<Option<DatasetSchema>>;

    // --- dataset_commits ---

    /// `MAX(version) + 1`, or 1 when the dataset has no rows.
    async fn next_version(&self, dataset_id: &DatasetId) -> MetadataResult<u64>;

    /// Insert a commit row; duplicate `(dataset_id, version)` is an error.
    async fn insert_commit(&self, row: CommitRecord) -> MetadataResult<()>;

    async fn commit(
        &self,
        dataset_id: &DatasetId,
        version: u64,
    ) -> MetadataResult<Option<CommitRecord>>;

    /// The most recent row with status `committed`, if any.
    async fn latest_committed(
        &self,
        dataset_id: &DatasetId,
    ) -> MetadataResult<Option<CommitRecord>>;

    /// All rows for a dataset, newest version first.
    async fn list_commits(&self, dataset_id: &DatasetId) -> MetadataResult<Vec<CommitRecord>>;

    /// Atomic promotion: any existing committed row becomes superseded,
    /// the target pending row becomes committed, and the pointer row is
    /// upserted, all in one unit.
    async fn promote_commit(
        &self,
        dataset_id: &DatasetId,
        version: u64,
        schema_version: Option<String>,
        schema_hash: Option<String>,
        committed_at: DateTime<Utc>,
    ) -> MetadataResult<CurrentVersion>;

    /// Transition a pending row to rolled_back, storing the reason.
    async fn rollback_commit(
        &self,
        dataset_id: &DatasetId,
        version: u64,
        reason: &str,
    ) -> MetadataResult<()>;

    /// Flag the pointer row as serving LKG.
    async fn set_serving_lkg(
        &self,
        dataset_id: &DatasetId,
        lkg_version: u64,
        reason: &str,
    ) -> MetadataResult<CurrentVersion>;

    /// Clear the LKG flag, if a pointer row exists.
    async fn clear_serving_lkg(
        &self,
        dataset_id: &DatasetId,
    ) -> MetadataResult<Option<CurrentVersion>>;

    async fn current_pointer(
        &self,
        dataset_id: &DatasetId,
    ) -> MetadataResult<Option<CurrentVersion>>;

    /// Roll back pending rows older than the cutoff; returns the swept
    /// rows.
    async fn sweep_stale_pending(
        &self,
        older_than: DateTime<Utc>,
        reason: &str,
    ) -> MetadataResult<Vec<CommitRecord>>;

    // --- system_readiness ---

    async fn readiness(&self, scope: &str) -> MetadataResult<Option<ReadinessRecord>>;

    async fn upsert_readiness(&self, record: ReadinessRecord) -> MetadataResult<()>;
}
