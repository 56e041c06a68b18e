//! Schema error types
//!
//! Error codes:
//! - SCHEMA_NOT_FOUND (404)
//! - SCHEMA_VERSION_NOT_FOUND (404)
//! - SCHEMA_SUNSET (422)
//! - SCHEMA_INCOMPATIBLE (422)
//! - INVARIANT_VIOLATION (422)
//! - SCHEMA_MALFORMED (422)
//! - METADATA_UNAVAILABLE (503)

use std::fmt;

/// Schema-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// No schema registered for the dataset
    SchemaNotFound,
    /// Requested schema version not registered
    SchemaVersionNotFound,
    /// Schema passed its sunset timestamp
    SchemaSunset,
    /// Data major version outside the dual-read window
    SchemaIncompatible,
    /// At least one record failed a field invariant
    InvariantViolation,
    /// Schema version string is not valid semver
    SchemaMalformed,
    /// Metadata store could not be reached
    MetadataUnavailable,
}

impl SchemaErrorCode {
    /// Stable string code for the wire
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::SchemaNotFound => "SCHEMA_NOT_FOUND",
            SchemaErrorCode::SchemaVersionNotFound => "SCHEMA_VERSION_NOT_FOUND",
            SchemaErrorCode::SchemaSunset => "SCHEMA_SUNSET",
            SchemaErrorCode::SchemaIncompatible => "SCHEMA_INCOMPATIBLE",
            SchemaErrorCode::InvariantViolation => "INVARIANT_VIOLATION",
            SchemaErrorCode::SchemaMalformed => "SCHEMA_MALFORMED",
            SchemaErrorCode::MetadataUnavailable => "METADATA_UNAVAILABLE",
        }
    }

    /// HTTP status on the write-reporting path
    pub fn status_code(&self) -> u16 {
        match self {
            SchemaErrorCode::SchemaNotFound | SchemaErrorCode::SchemaVersionNotFound => 404,
            SchemaErrorCode::SchemaSunset
            | SchemaErrorCode::SchemaIncompatible
            | SchemaErrorCode::InvariantViolation
            | SchemaErrorCode::SchemaMalformed => 422,
            SchemaErrorCode::MetadataUnavailable => 503,
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Details of a single record-level violation
#[derive(Debug, Clone)]
pub struct ViolationDetails {
    /// Index of the offending record in the batch
    pub record_index: usize,
    /// Field path
    pub field: String,
    /// Expected type or condition
    pub expected: String,
    /// Actual value or type found
    pub actual: String,
}

impl ViolationDetails {
    pub fn new(
        record_index: usize,
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self {
            record_index,
            field: field.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn missing_field(record_index: usize, field: impl Into<String>) -> Self {
        Self::new(record_index, field, "field to be present", "missing")
    }

    pub fn null_value(record_index: usize, field: impl Into<String>) -> Self {
        Self::new(record_index, field, "non-null value", "null")
    }
}

impl fmt::Display for ViolationDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "record {} field '{}': expected {}, got {}",
            self.record_index, self.field, self.expected, self.actual
        )
    }
}

/// Schema error with full context
#[derive(Debug, Clone)]
pub struct SchemaError {
    code: SchemaErrorCode,
    message: String,
    dataset_id: Option<String>,
    schema_version: Option<String>,
    details: Option<ViolationDetails>,
}

impl SchemaError {
    pub fn not_found(dataset_id: impl Into<String>) -> Self {
        let id = dataset_id.into();
        Self {
            code: SchemaErrorCode::SchemaNotFound,
            message: format!("no schema registered for dataset {}", id),
            dataset_id: Some(id),
            schema_version: None,
            details: None,
        }
    }

    pub fn version_not_found(dataset_id: impl Into<String>, version: impl Into<String>) -> Self {
        let id = dataset_id.into();
        let ver = version.into();
        Self {
            code: SchemaErrorCode::SchemaVersionNotFound,
            message: format!("schema version {} not registered for dataset {}", ver, id),
            dataset_id: Some(id),
            schema_version: Some(ver),
            details: None,
        }
    }

    pub fn sunset(dataset_id: impl Into<String>, version: impl Into<String>) -> Self {
        let id = dataset_id.into();
        let ver = version.into();
        Self {
            code: SchemaErrorCode::SchemaSunset,
            message: format!("schema {} for dataset {} is past sunset", ver, id),
            dataset_id: Some(id),
            schema_version: Some(ver),
            details: None,
        }
    }

    pub fn incompatible(
        dataset_id: impl Into<String>,
        data_version: impl Into<String>,
        active_version: impl Into<String>,
    ) -> Self {
        let id = dataset_id.into();
        let data = data_version.into();
        let active = active_version.into();
        Self {
            code: SchemaErrorCode::SchemaIncompatible,
            message: format!(
                "data schema {} is outside the dual-read window of active schema {} for dataset {}",
                data, active, id
            ),
            dataset_id: Some(id),
            schema_version: Some(data),
            details: None,
        }
    }

    pub fn invariant_violation(
        dataset_id: impl Into<String>,
        version: impl Into<String>,
        details: ViolationDetails,
    ) -> Self {
        let id = dataset_id.into();
        let ver = version.into();
        Self {
            code: SchemaErrorCode::InvariantViolation,
            message: format!("invariant violated: {}", details),
            dataset_id: Some(id),
            schema_version: Some(ver),
            details: Some(details),
        }
    }

    pub fn malformed(version: impl Into<String>, reason: impl Into<String>) -> Self {
        let ver = version.into();
        Self {
            code: SchemaErrorCode::SchemaMalformed,
            message: format!("schema version '{}' is not valid semver: {}", ver, reason.into()),
            dataset_id: None,
            schema_version: Some(ver),
            details: None,
        }
    }

    pub fn store(reason: impl Into<String>) -> Self {
        Self {
            code: SchemaErrorCode::MetadataUnavailable,
            message: reason.into(),
            dataset_id: None,
            schema_version: None,
            details: None,
        }
    }

    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn dataset_id(&self) -> Option<&str> {
        self.dataset_id.as_deref()
    }

    pub fn schema_version(&self) -> Option<&str> {
        self.schema_version.as_deref()
    }

    pub fn details(&self) -> Option<&ViolationDetails> {
        self.details.as_ref()
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for SchemaError {}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(SchemaErrorCode::SchemaIncompatible.code(), "SCHEMA_INCOMPATIBLE");
        assert_eq!(SchemaErrorCode::InvariantViolation.code(), "INVARIANT_VIOLATION");
        assert_eq!(SchemaErrorCode::SchemaSunset.code(), "SCHEMA_SUNSET");
    }

    #[test]
    fn test_write_path_violations_are_422() {
        assert_eq!(SchemaErrorCode::SchemaIncompatible.status_code(), 422);
        assert_eq!(SchemaErrorCode::InvariantViolation.status_code(), 422);
        assert_eq!(SchemaErrorCode::SchemaSunset.status_code(), 422);
        assert_eq!(SchemaErrorCode::MetadataUnavailable.status_code(), 503);
    }

    #[test]
    fn test_violation_details_display() {
        let details = ViolationDetails::new(3, "rating", "value in [0, 100]", "250");
        let display = format!("{}", details);
        assert!(display.contains("record 3"));
        assert!(display.contains("rating"));
        assert!(display.contains("250"));
    }
}
