//! Ingestion errors and stable failure codes
//!
//! Most failures complete the pipeline and are reported inside the
//! commit outcome under a stable code; `IngestError` is reserved for
//! requests the pipeline cannot express an outcome for.

use thiserror::Error;

use crate::identity::IdentityError;

/// Stable failure codes carried in commit outcomes and log events
pub mod codes {
    pub const NO_RULE_DEFINED: &str = "NO_RULE_DEFINED";
    pub const FETCH_FAILED: &str = "FETCH_FAILED";
    pub const SEMANTIC_INVALID: &str = "SEMANTIC_INVALID";
    pub const SCHEMA_INCOMPATIBLE: &str = "SCHEMA_INCOMPATIBLE";
    pub const INVARIANT_VIOLATION: &str = "INVARIANT_VIOLATION";
    pub const IDENTITY_VIOLATION: &str = "IDENTITY_VIOLATION";
    pub const STAGING_WRITE_FAILED: &str = "STAGING_WRITE_FAILED";
    pub const PROMOTE_FAILED: &str = "PROMOTE_FAILED";
    pub const SNAPSHOT_FAILED: &str = "SNAPSHOT_FAILED";
    pub const READINESS_BLOCKED: &str = "READINESS_BLOCKED";
    pub const LEGACY_ENVELOPE: &str = "LEGACY_ENVELOPE";
    pub const SOURCE_UNAVAILABLE: &str = "SOURCE_UNAVAILABLE";
    pub const OFF_SEASON: &str = "OFF_SEASON";
}

/// Result type for ingestion
pub type IngestResult<T> = Result<T, IngestError>;

/// Hard ingestion errors
#[derive(Debug, Error)]
pub enum IngestError {
    /// The requested identity was rejected or violated
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// The metadata store failed before the attempt could be recorded
    #[error("Metadata store unavailable: {0}")]
    Store(String),
}

impl IngestError {
    /// Stable error code for the wire
    pub fn code(&self) -> &'static str {
        match self {
            IngestError::Identity(e) => e.code(),
            IngestError::Store(_) => "METADATA_UNAVAILABLE",
        }
    }

    /// HTTP status for the ingest-reporting path
    pub fn status_code(&self) -> u16 {
        match self {
            IngestError::Identity(e) => e.status_code(),
            IngestError::Store(_) => 503,
        }
    }
}
