//! Metadata store errors

use thiserror::Error;

/// Result type for metadata operations
pub type MetadataResult<T> = Result<T, MetadataError>;

/// Metadata store errors
#[derive(Debug, Clone, Error)]
pub enum MetadataError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Unique constraint violated: {0}")]
    Duplicate(String),

    #[error("Row not found: {0}")]
    NotFound(String),

    #[error("Invalid row transition: {0}")]
    InvalidTransition(String),
}

impl MetadataError {
    /// Whether a retry might succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, MetadataError::Unavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_unavailable_is_transient() {
        assert!(MetadataError::Unavailable("timeout".into()).is_transient());
        assert!(!MetadataError::Duplicate("(ds, 3)".into()).is_transient());
        assert!(!MetadataError::NotFound("pointer".into()).is_transient());
    }
}
