//! Commit outcomes
//!
//! Every completed ingestion attempt reports one of these, whether it
//! promoted a new version or preserved the last known good one.

use serde::{Deserialize, Serialize};

use crate::envelope::LifecycleState;
use crate::identity::DatasetId;
use crate::validation::ValidationStatus;

/// Result of one ingestion attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitOutcome {
    /// The attempt completed the pipeline without infrastructure failure
    pub success: bool,
    /// A new version was promoted and is now served
    pub committed: bool,
    pub dataset_id: DatasetId,
    /// Version this attempt staged, when it got far enough to allocate one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
    pub record_count: usize,
    /// Status for the ingest-reporting path
    pub http_status: u16,
    pub lifecycle: LifecycleState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationStatus>,
    pub is_serving_lkg: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Stable failure code when the attempt did not commit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl CommitOutcome {
    /// A promoted commit
    pub fn committed(
        dataset_id: DatasetId,
        version: u64,
        record_count: usize,
        http_status: u16,
        lifecycle: LifecycleState,
    ) -> Self {
        Self {
            success: true,
            committed: true,
            dataset_id,
            version: Some(version),
            record_count,
            http_status,
            lifecycle,
            validation: Some(ValidationStatus::Valid),
            is_serving_lkg: false,
            reason: None,
            error_code: None,
        }
    }

    /// An expected no-op, e.g. an off-season window. Nothing committed,
    /// nothing displaced.
    pub fn skipped(
        dataset_id: DatasetId,
        version: Option<u64>,
        record_count: usize,
        http_status: u16,
        lifecycle: LifecycleState,
        reason: impl Into<String>,
        error_code: &str,
    ) -> Self {
        Self {
            success: true,
            committed: false,
            dataset_id,
            version,
            record_count,
            http_status,
            lifecycle,
            validation: Some(ValidationStatus::Unavailable),
            is_serving_lkg: false,
            reason: Some(reason.into()),
            error_code: Some(error_code.to_string()),
        }
    }

    /// An attempt that completed without committing
    #[allow(clippy::too_many_arguments)]
    pub fn not_committed(
        dataset_id: DatasetId,
        version: Option<u64>,
        record_count: usize,
        http_status: u16,
        lifecycle: LifecycleState,
        validation: Option<ValidationStatus>,
        is_serving_lkg: bool,
        reason: impl Into<String>,
        error_code: &str,
    ) -> Self {
        Self {
            success: false,
            committed: false,
            dataset_id,
            version,
            record_count,
            http_status,
            lifecycle,
            validation,
            is_serving_lkg,
            reason: Some(reason.into()),
            error_code: Some(error_code.to_string()),
        }
    }
}
