//! Commit records
//!
//! One row per `(dataset_id, version)` ingestion attempt. At most one row
//! per dataset is `committed`; promotion moves the old committed row to
//! `superseded` in the same atomic unit that commits the new one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::DatasetId;
use crate::validation::ValidationStatus;

/// Lifecycle of a commit row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitStatus {
    /// Staged; not visible to readers
    Pending,
    /// The served version
    Committed,
    /// Failed validation or staging; never served
    RolledBack,
    /// A later version was committed over it
    Superseded,
}

impl CommitStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommitStatus::Pending => "pending",
            CommitStatus::Committed => "committed",
            CommitStatus::RolledBack => "rolled_back",
            CommitStatus::Superseded => "superseded",
        }
    }
}

impl std::fmt::Display for CommitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One ingestion attempt, mirroring the `dataset_commits` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitRecord {
    pub dataset_id: DatasetId,
    pub version: u64,
    pub status: CommitStatus,
    pub record_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_record_count: Option<usize>,
    pub validation_status: ValidationStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validation_errors: Vec<String>,
    pub ingested_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub committed_at: Option<DateTime<Utc>>,
    /// KV key the versioned blob was staged under
    pub kv_versioned_key: String,
    /// Tag of the upstream source this attempt fetched from
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rollback_reason: Option<String>,
}

impl CommitRecord {
    /// Build a fresh pending row for a staged version.
    #[allow(clippy::too_many_arguments)]
    pub fn pending(
        dataset_id: DatasetId,
        version: u64,
        record_count: usize,
        previous_record_count: Option<usize>,
        validation_status: ValidationStatus,
        validation_errors: Vec<String>,
        kv_versioned_key: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            dataset_id,
            version,
            status: CommitStatus::Pending,
            record_count,
            previous_record_count,
            validation_status,
            validation_errors,
            ingested_at: Utc::now(),
            committed_at: None,
            kv_versioned_key: kv_versioned_key.into(),
            source: source.into(),
            schema_version: None,
            schema_hash: None,
            rollback_reason: None,
        }
    }

    pub fn with_schema(
        mut self,
        schema_version: Option<String>,
        schema_hash: Option<String>,
    ) -> Self {
        self.schema_version = schema_version;
        self.schema_hash = schema_hash;
        self
    }

    pub fn is_committed(&self) -> bool {
        self.status == CommitStatus::Committed
    }
}
