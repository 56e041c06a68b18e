//! Identity Errors

use thiserror::Error;

/// Result type for identity operations
pub type IdentityResult<T> = Result<T, IdentityError>;

/// Identity errors
#[derive(Debug, Clone, Error)]
pub enum IdentityError {
    #[error("Unknown sport: {0}")]
    UnknownSport(String),

    #[error("Unknown competition level: {0}")]
    UnknownCompetitionLevel(String),

    #[error("Unknown dataset type: {0}")]
    UnknownDatasetType(String),

    #[error("Identity field '{0}' is empty")]
    EmptyField(&'static str),

    /// A stored envelope or registry row disagrees with the requested
    /// identity. This is a hard error; the payload must not be served.
    #[error("Identity violation for dataset {dataset_id}: field '{field}' expected '{expected}', found '{found}'")]
    Violation {
        dataset_id: String,
        field: &'static str,
        expected: String,
        found: String,
    },

    /// A different dataset id already claims the same tuple.
    #[error("Identity violation: tuple already claimed by dataset {existing_id}, computed {computed_id}")]
    TupleClaimed {
        existing_id: String,
        computed_id: String,
    },

    #[error("Dataset {0} is not registered")]
    NotRegistered(String),

    #[error("Metadata store error: {0}")]
    Store(String),
}

impl IdentityError {
    /// Stable error code for the wire
    pub fn code(&self) -> &'static str {
        match self {
            IdentityError::UnknownSport(_)
            | IdentityError::UnknownCompetitionLevel(_)
            | IdentityError::UnknownDatasetType(_)
            | IdentityError::EmptyField(_) => "IDENTITY_REJECTED",
            IdentityError::Violation { .. } | IdentityError::TupleClaimed { .. } => {
                "IDENTITY_VIOLATION"
            }
            IdentityError::NotRegistered(_) => "IDENTITY_UNKNOWN",
            IdentityError::Store(_) => "METADATA_UNAVAILABLE",
        }
    }

    /// HTTP status for the wire
    pub fn status_code(&self) -> u16 {
        match self {
            IdentityError::UnknownSport(_)
            | IdentityError::UnknownCompetitionLevel(_)
            | IdentityError::UnknownDatasetType(_)
            | IdentityError::EmptyField(_) => 400,
            IdentityError::Violation { .. } | IdentityError::TupleClaimed { .. } => 503,
            IdentityError::NotRegistered(_) => 404,
            IdentityError::Store(_) => 503,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_violation_is_503() {
        let err = IdentityError::Violation {
            dataset_id: "ab".into(),
            field: "sport",
            expected: "baseball".into(),
            found: "football".into(),
        };
        assert_eq!(err.code(), "IDENTITY_VIOLATION");
        assert_eq!(err.status_code(), 503);
    }

    #[test]
    fn test_rejected_is_400() {
        assert_eq!(IdentityError::UnknownSport("chess".into()).status_code(), 400);
    }
}
