//! Current version pointer
//!
//! One row per dataset, mirroring the `dataset_current_version` table.
//! This row is the authority for what readers are served. Invariants:
//! `current_version >= last_committed_version`, and `is_serving_lkg`
//! implies a committed version exists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::DatasetId;

/// Authoritative serving pointer for one dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentVersion {
    pub dataset_id: DatasetId,
    pub current_version: u64,
    pub last_committed_version: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_committed_at: Option<DateTime<Utc>>,
    pub is_serving_lkg: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lkg_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_schema_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_committed_schema_hash: Option<String>,
}

impl CurrentVersion {
    /// Fresh pointer row written at promotion.
    pub fn promoted(
        dataset_id: DatasetId,
        version: u64,
        committed_at: DateTime<Utc>,
        schema_version: Option<String>,
        schema_hash: Option<String>,
    ) -> Self {
        Self {
            dataset_id,
            current_version: version,
            last_committed_version: version,
            last_committed_at: Some(committed_at),
            is_serving_lkg: false,
            lkg_reason: None,
            current_schema_version: schema_version,
            last_committed_schema_hash: schema_hash,
        }
    }

    /// Row-level invariant check
    pub fn invariants_hold(&self) -> bool {
        if self.current_version < self.last_committed_version {
            return false;
        }
        if self.is_serving_lkg && self.last_committed_version == 0 {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset_id() -> DatasetId {
        DatasetId::from_raw("0123456789abcdef")
    }

    #[test]
    fn test_promoted_pointer() {
        let pointer = CurrentVersion::promoted(
            dataset_id(),
            4,
            Utc::now(),
            Some("1.2.0".into()),
            Some("deadbeefdeadbeef".into()),
        );
        assert_eq!(pointer.current_version, 4);
        assert_eq!(pointer.last_committed_version, 4);
        assert!(!pointer.is_serving_lkg);
        assert!(pointer.lkg_reason.is_none());
        assert!(pointer.invariants_hold());
    }

    #[test]
    fn test_lkg_without_commit_violates_invariant() {
        let pointer = CurrentVersion {
            dataset_id: dataset_id(),
            current_version: 0,
            last_committed_version: 0,
            last_committed_at: None,
            is_serving_lkg: true,
            lkg_reason: Some("fetch failed".into()),
            current_schema_version: None,
            last_committed_schema_hash: None,
        };
        assert!(!pointer.invariants_hold());
    }
}
