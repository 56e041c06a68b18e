//! Object store errors

use thiserror::Error;

/// Result type for object store operations
pub type ObjectResult<T> = Result<T, ObjectError>;

/// Object store errors
#[derive(Debug, Clone, Error)]
pub enum ObjectError {
    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid object key: {0}")]
    InvalidKey(String),

    #[error("Snapshot malformed at '{key}': {reason}")]
    Malformed { key: String, reason: String },

    #[error("I/O error: {0}")]
    Io(String),
}

impl ObjectError {
    pub fn malformed(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Whether a retry might succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, ObjectError::Io(_))
    }
}
