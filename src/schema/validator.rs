//! Structural validation of record batches
//!
//! Rejects the batch on any record-level violation. A sunset schema
//! rejects everything. The validator never mutates records and holds no
//! external resource; it is pure CPU.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde_json::Value;

use super::errors::{SchemaError, SchemaResult, ViolationDetails};
use super::types::{DatasetSchema, Invariant};

/// Validates record batches against a registered schema
pub struct SchemaValidator<'a> {
    schema: &'a DatasetSchema,
}

impl<'a> SchemaValidator<'a> {
    pub fn new(schema: &'a DatasetSchema) -> Self {
        Self { schema }
    }

    /// Validate a full batch. The first violation aborts the batch.
    pub fn validate_batch(&self, records: &[Value], now: DateTime<Utc>) -> SchemaResult<()> {
        if self.schema.is_sunset(now) {
            return Err(SchemaError::sunset(
                self.schema.dataset_id.as_str(),
                self.schema.schema_version.clone(),
            ));
        }

        for (index, record) in records.iter().enumerate() {
            self.validate_record(index, record)?;
        }

        Ok(())
    }

    fn validate_record(&self, index: usize, record: &Value) -> SchemaResult<()> {
        let object = record.as_object().ok_or_else(|| {
            SchemaError::invariant_violation(
                self.schema.dataset_id.as_str(),
                self.schema.schema_version.clone(),
                ViolationDetails::new(index, "$", "JSON object", value_kind(record)),
            )
        })?;

        for field in &self.schema.required_fields {
            match object.get(field) {
                None => {
                    return Err(self.violation(ViolationDetails::missing_field(index, field)));
                }
                Some(Value::Null) => {
                    return Err(self.violation(ViolationDetails::null_value(index, field)));
                }
                Some(_) => {}
            }
        }

        for invariant in &self.schema.invariants {
            self.check_invariant(index, object, invariant)?;
        }

        Ok(())
    }

    fn check_invariant(
        &self,
        index: usize,
        object: &serde_json::Map<String, Value>,
        invariant: &Invariant,
    ) -> SchemaResult<()> {
        let field = invariant.field();
        let value = object.get(field);

        match invariant {
            Invariant::NonNull { .. } => match value {
                None => Err(self.violation(ViolationDetails::missing_field(index, field))),
                Some(Value::Null) => {
                    Err(self.violation(ViolationDetails::null_value(index, field)))
                }
                Some(_) => Ok(()),
            },
            Invariant::Range { min, max, .. } => {
                let number = value.and_then(Value::as_f64).ok_or_else(|| {
                    self.violation(ViolationDetails::new(
                        index,
                        field,
                        "numeric value",
                        value.map(value_kind).unwrap_or("missing"),
                    ))
                })?;
                if number < *min || number > *max {
                    return Err(self.violation(ViolationDetails::new(
                        index,
                        field,
                        format!("value in [{}, {}]", min, max),
                        number.to_string(),
                    )));
                }
                Ok(())
            }
            Invariant::Enum { values, .. } => {
                let found = value.ok_or_else(|| {
                    self.violation(ViolationDetails::missing_field(index, field))
                })?;
                if values.contains(found) {
                    Ok(())
                } else {
                    Err(self.violation(ViolationDetails::new(
                        index,
                        field,
                        format!("one of {}", Value::Array(values.clone())),
                        found.to_string(),
                    )))
                }
            }
            Invariant::Regex { pattern, .. } => {
                let text = value.and_then(Value::as_str).ok_or_else(|| {
                    self.violation(ViolationDetails::new(
                        index,
                        field,
                        "string value",
                        value.map(value_kind).unwrap_or("missing"),
                    ))
                })?;
                let regex = Regex::new(pattern).map_err(|e| {
                    self.violation(ViolationDetails::new(
                        index,
                        field,
                        "valid pattern",
                        e.to_string(),
                    ))
                })?;
                if regex.is_match(text) {
                    Ok(())
                } else {
                    Err(self.violation(ViolationDetails::new(
                        index,
                        field,
                        format!("match for /{}/", pattern),
                        text.to_string(),
                    )))
                }
            }
            Invariant::Length { min, max, .. } => {
                let text = value.and_then(Value::as_str).ok_or_else(|| {
                    self.violation(ViolationDetails::new(
                        index,
                        field,
                        "string value",
                        value.map(value_kind).unwrap_or("missing"),
                    ))
                })?;
                let len = text.chars().count();
                if len < *min || len > *max {
                    return Err(self.violation(ViolationDetails::new(
                        index,
                        field,
                        format!("length in [{}, {}]", min, max),
                        len.to_string(),
                    )));
                }
                Ok(())
            }
        }
    }

    fn violation(&self, details: ViolationDetails) -> SchemaError {
        SchemaError::invariant_violation(
            self.schema.dataset_id.as_str(),
            self.schema.schema_version.clone(),
            details,
        )
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
