//! KV surface errors

use thiserror::Error;

/// Result type for KV operations
pub type KvResult<T> = Result<T, KvError>;

/// KV surface errors
#[derive(Debug, Clone, Error)]
pub enum KvError {
    #[error("KV write failed for key '{key}': {reason}")]
    WriteFailed { key: String, reason: String },

    #[error("KV read failed for key '{key}': {reason}")]
    ReadFailed { key: String, reason: String },

    #[error("KV unavailable: {0}")]
    Unavailable(String),
}

impl KvError {
    pub fn write_failed(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::WriteFailed {
            key: key.into(),
            reason: reason.into(),
        }
    }

    pub fn read_failed(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ReadFailed {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Whether a retry might succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, KvError::Unavailable(_))
    }
}
