//! Semantic classification of record batches
//!
//! Gate order:
//! 1. explicit source-reported unavailability (forces `unavailable`)
//! 2. season window (outside ⇒ `unavailable`, not `invalid`)
//! 3. density (record count ≥ rule minimum)
//! 4. structural spot-check of required fields over the first N records
//!
//! The spot-check covers at least five records, or the whole batch when
//! it is smaller.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::identity::DatasetId;
use crate::rules::SemanticRule;

use super::ValidationStatus;

/// Minimum number of records covered by the structural spot-check
const SPOT_CHECK_MIN: usize = 5;

/// Outcome of semantic classification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticReport {
    pub status: ValidationStatus,
    pub dataset_id: DatasetId,
    pub record_count: usize,
    pub expected_min: usize,
    pub passed_schema: bool,
    pub passed_density: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub validated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_errors: Option<Vec<String>>,
}

impl SemanticReport {
    pub fn is_valid(&self) -> bool {
        self.status == ValidationStatus::Valid
    }

    pub fn is_unavailable(&self) -> bool {
        self.status == ValidationStatus::Unavailable
    }
}

/// Semantic validator
pub struct SemanticValidator;

impl SemanticValidator {
    /// Classify a batch against its rule.
    ///
    /// `today` is passed in rather than read from the clock so season
    /// behavior is deterministic under test.
    pub fn classify(
        dataset_id: &DatasetId,
        rule: &SemanticRule,
        records: &[Value],
        today: NaiveDate,
        source_reported_unavailable: bool,
    ) -> SemanticReport {
        let record_count = records.len();
        let expected_min = rule.min_record_count;

        if source_reported_unavailable {
            return SemanticReport {
                status: ValidationStatus::Unavailable,
                dataset_id: dataset_id.clone(),
                record_count,
                expected_min,
                passed_schema: false,
                passed_density: false,
                reason: Some("source reported unavailable".into()),
                validated_at: Utc::now(),
                schema_errors: None,
            };
        }

        if let Some(window) = &rule.season_window {
            if !window.contains(today) {
                return SemanticReport {
                    status: ValidationStatus::Unavailable,
                    dataset_id: dataset_id.clone(),
                    record_count,
                    expected_min,
                    passed_schema: false,
                    passed_density: false,
                    reason: Some(format!(
                        "off-season: month {} outside window {}-{}",
                        today.format("%m"),
                        window.start_month,
                        window.end_month
                    )),
                    validated_at: Utc::now(),
                    schema_errors: None,
                };
            }
        }

        let passed_density = record_count >= expected_min;
        if !passed_density {
            return SemanticReport {
                status: ValidationStatus::Invalid,
                dataset_id: dataset_id.clone(),
                record_count,
                expected_min,
                passed_schema: false,
                passed_density: false,
                reason: Some(format!(
                    "insufficient density: {} records, expected at least {}",
                    record_count, expected_min
                )),
                validated_at: Utc::now(),
                schema_errors: None,
            };
        }

        let spot_check = record_count.min(SPOT_CHECK_MIN);
        let mut schema_errors = Vec::new();
        for (index, record) in records.iter().take(spot_check).enumerate() {
            check_required_fields(index, record, &rule.required_fields, &mut schema_errors);
        }

        if !schema_errors.is_empty() {
            return SemanticReport {
                status: ValidationStatus::Invalid,
                dataset_id: dataset_id.clone(),
                record_count,
                expected_min,
                passed_schema: false,
                passed_density: true,
                reason: Some("required fields missing or empty".into()),
                validated_at: Utc::now(),
                schema_errors: Some(schema_errors),
            };
        }

        SemanticReport {
            status: ValidationStatus::Valid,
            dataset_id: dataset_id.clone(),
            record_count,
            expected_min,
            passed_schema: true,
            passed_density: true,
            reason: None,
            validated_at: Utc::now(),
            schema_errors: None,
        }
    }
}

fn check_required_fields(
    index: usize,
    record: &Value,
    required: &[String],
    errors: &mut Vec<String>,
) {
    let Some(object) = record.as_object() else {
        errors.push(format!("record {} is not an object", index));
        return;
    };

    for field in required {
        match object.get(field) {
            None => errors.push(format!("record {} missing field '{}'", index, field)),
            Some(Value::Null) => errors.push(format!("record {} field '{}' is null", index, field)),
            Some(Value::String(s)) if s.trim().is_empty() => {
                errors.push(format!("record {} field '{}' is empty", index, field))
            }
            Some(_) => {}
        }
    }
}
