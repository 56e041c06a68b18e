//! Schema type definitions
//!
//! A registered schema is a structural contract for one dataset: the
//! fields every record must carry, record-level invariants, a minimum
//! renderable count, and an activity/sunset lifecycle. Versions are
//! semver strings; the dual-read window spans the active major and the
//! major immediately below it.

use chrono::{DateTime, Utc};
use semver::Version;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::identity::DatasetId;

use super::errors::{SchemaError, SchemaResult};
use super::hash::compute_schema_hash;

/// Record-level invariant kinds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Invariant {
    /// Value must be present and non-null
    NonNull { field: String },
    /// Numeric value must lie in [min, max]
    Range { field: String, min: f64, max: f64 },
    /// Value must be one of the listed primitives
    Enum { field: String, values: Vec<Value> },
    /// String value must match the pattern
    Regex { field: String, pattern: String },
    /// String length must lie in [min, max]
    Length { field: String, min: usize, max: usize },
}

impl Invariant {
    /// The field this invariant constrains
    pub fn field(&self) -> &str {
        match self {
            Invariant::NonNull { field }
            | Invariant::Range { field, .. }
            | Invariant::Enum { field, .. }
            | Invariant::Regex { field, .. }
            | Invariant::Length { field, .. } => field,
        }
    }

    /// Kind name for error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Invariant::NonNull { .. } => "non_null",
            Invariant::Range { .. } => "range",
            Invariant::Enum { .. } => "enum",
            Invariant::Regex { .. } => "regex",
            Invariant::Length { .. } => "length",
        }
    }
}

/// Compatibility of an on-disk schema version with the active one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compatibility {
    Compatible,
    Incompatible,
    Unknown,
}

/// A registered schema, mirroring the `dataset_schema` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSchema {
    pub dataset_id: DatasetId,
    /// Semver version string
    pub schema_version: String,
    /// SHA-256 over the canonical schema form, 16 hex chars
    pub schema_hash: String,
    pub required_fields: Vec<String>,
    pub invariants: Vec<Invariant>,
    /// Record count below which the payload is not renderable
    pub minimum_renderable_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sunset_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

impl DatasetSchema {
    /// Build a schema, computing its hash from the canonical form.
    pub fn new(
        dataset_id: DatasetId,
        schema_version: impl Into<String>,
        required_fields: Vec<String>,
        invariants: Vec<Invariant>,
        minimum_renderable_count: usize,
    ) -> SchemaResult<Self> {
        let schema_version = schema_version.into();
        parse_version(&schema_version)?;

        let schema_hash = compute_schema_hash(&required_fields, &invariants);

        Ok(Self {
            dataset_id,
            schema_version,
            schema_hash,
            required_fields,
            invariants,
            minimum_renderable_count,
            sunset_at: None,
            created_at: Utc::now(),
            is_active: true,
        })
    }

    pub fn with_sunset(mut self, sunset_at: DateTime<Utc>) -> Self {
        self.sunset_at = Some(sunset_at);
        self
    }

    /// Parsed semver of this schema
    pub fn version(&self) -> SchemaResult<Version> {
        parse_version(&self.schema_version)
    }

    /// Major version component
    pub fn major(&self) -> SchemaResult<u64> {
        Ok(self.version()?.major)
    }

    /// Whether the schema is past its sunset timestamp
    pub fn is_sunset(&self, now: DateTime<Utc>) -> bool {
        matches!(self.sunset_at, Some(at) if at <= now)
    }

    /// Recompute the hash from the persisted fields. Must equal
    /// `schema_hash` bitwise; a mismatch means the row was tampered with
    /// or corrupted.
    pub fn recompute_hash(&self) -> String {
        compute_schema_hash(&self.required_fields, &self.invariants)
    }

    /// Dual-read compatibility of a data version against this (active)
    /// schema: same major, or one major behind.
    pub fn compatibility_of(&self, data_version: &str) -> Compatibility {
        let active = match self.version() {
            Ok(v) => v,
            Err(_) => return Compatibility::Unknown,
        };
        let data = match Version::parse(data_version) {
            Ok(v) => v,
            Err(_) => return Compatibility::Unknown,
        };

        if data.major == active.major || data.major + 1 == active.major {
            Compatibility::Compatible
        } else {
            Compatibility::Incompatible
        }
    }
}

fn parse_version(raw: &str) -> SchemaResult<Version> {
    Version::parse(raw).map_err(|e| SchemaError::malformed(raw, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn dataset_id() -> DatasetId {
        DatasetId::from_raw("0123456789abcdef")
    }

    fn sample_schema() -> DatasetSchema {
        DatasetSchema::new(
            dataset_id(),
            "2.1.0",
            vec!["team".into(), "rank".into()],
            vec![Invariant::Range {
                field: "rank".into(),
                min: 1.0,
                max: 500.0,
            }],
            10,
        )
        .unwrap()
    }

    #[test]
    fn test_invalid_semver_rejected() {
        let result = DatasetSchema::new(dataset_id(), "not-a-version", vec![], vec![], 0);
        assert!(result.is_err());
    }

    #[test]
    fn test_hash_recompute_matches() {
        let schema = sample_schema();
        assert_eq!(schema.schema_hash, schema.recompute_hash());
        assert_eq!(schema.schema_hash.len(), 16);
    }

    #[test]
    fn test_compatibility_window() {
        let schema = sample_schema(); // major 2
        assert_eq!(schema.compatibility_of("2.0.5"), Compatibility::Compatible);
        assert_eq!(schema.compatibility_of("1.9.0"), Compatibility::Compatible);
        assert_eq!(schema.compatibility_of("0.4.0"), Compatibility::Incompatible);
        assert_eq!(schema.compatibility_of("4.0.0"), Compatibility::Incompatible);
        assert_eq!(schema.compatibility_of("garbage"), Compatibility::Unknown);
    }

    #[test]
    fn test_sunset() {
        let now = Utc::now();
        let schema = sample_schema().with_sunset(now - Duration::hours(1));
        assert!(schema.is_sunset(now));

        let future = sample_schema().with_sunset(now + Duration::hours(1));
        assert!(!future.is_sunset(now));
    }

    #[test]
    fn test_invariant_field_accessor() {
        let inv = Invariant::Length {
            field: "name".into(),
            min: 1,
            max: 64,
        };
        assert_eq!(inv.field(), "name");
        assert_eq!(inv.kind_name(), "length");
    }
}
