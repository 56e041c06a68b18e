//! Readiness errors

use std::fmt;

/// Readiness error type
#[derive(Debug, Clone)]
pub enum ReadinessError {
    /// A non-admin transition outside the state machine
    ForbiddenTransition {
        scope: String,
        from: &'static str,
        to: &'static str,
    },

    /// Metadata store could not be reached
    Store(String),
}

impl ReadinessError {
    pub fn store(reason: impl Into<String>) -> Self {
        Self::Store(reason.into())
    }

    /// Stable error code for the wire
    pub fn code(&self) -> &'static str {
        match self {
            ReadinessError::ForbiddenTransition { .. } => "READINESS_FORBIDDEN_TRANSITION",
            ReadinessError::Store(_) => "METADATA_UNAVAILABLE",
        }
    }
}

impl fmt::Display for ReadinessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadinessError::ForbiddenTransition { scope, from, to } => {
                write!(f, "forbidden readiness transition for {}: {} → {}", scope, from, to)
            }
            ReadinessError::Store(reason) => write!(f, "metadata store error: {}", reason),
        }
    }
}

impl std::error::Error for ReadinessError {}

/// Result type for readiness operations
pub type ReadinessResult<T> = Result<T, ReadinessError>;
