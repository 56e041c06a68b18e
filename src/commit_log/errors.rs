//! Commit log errors

use thiserror::Error;

/// Result type for commit log operations
pub type CommitLogResult<T> = Result<T, CommitLogError>;

/// Commit log errors
#[derive(Debug, Clone, Error)]
pub enum CommitLogError {
    #[error("Version {version} already exists for dataset {dataset_id}")]
    DuplicateVersion { dataset_id: String, version: u64 },

    #[error("No commit row for dataset {dataset_id} version {version}")]
    CommitNotFound { dataset_id: String, version: u64 },

    #[error("Commit {dataset_id} v{version} is {status}, cannot {operation}")]
    InvalidTransition {
        dataset_id: String,
        version: u64,
        status: &'static str,
        operation: &'static str,
    },

    #[error("Dataset {0} has no committed version to serve as LKG")]
    NoLkgCandidate(String),

    #[error("Metadata store error: {0}")]
    Store(String),
}

impl CommitLogError {
    /// Stable error code for the wire
    pub fn code(&self) -> &'static str {
        match self {
            CommitLogError::DuplicateVersion { .. } => "VERSION_CONFLICT",
            CommitLogError::CommitNotFound { .. } => "COMMIT_NOT_FOUND",
            CommitLogError::InvalidTransition { .. } => "PROMOTE_FAILED",
            CommitLogError::NoLkgCandidate(_) => "NO_LKG_CANDIDATE",
            CommitLogError::Store(_) => "METADATA_UNAVAILABLE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        let err = CommitLogError::InvalidTransition {
            dataset_id: "ab".into(),
            version: 2,
            status: "rolled_back",
            operation: "promote",
        };
        assert_eq!(err.code(), "PROMOTE_FAILED");
        assert!(err.to_string().contains("rolled_back"));
    }
}
