//! Deterministic schema hashing
//!
//! The hash is SHA-256 over a canonical JSON form of the contract (sorted
//! required fields, invariants sorted by their serialized form), truncated
//! to 16 hex characters. It is persisted with every commit so edge readers
//! can detect a contract mismatch without re-parsing the schema.

use sha2::{Digest, Sha256};

use crate::identity::tuple::hex_prefix;

use super::types::Invariant;

/// Compute the 16-hex-char hash of a schema's canonical form.
pub fn compute_schema_hash(required_fields: &[String], invariants: &[Invariant]) -> String {
    let mut fields: Vec<&String> = required_fields.iter().collect();
    fields.sort();

    let mut invariant_forms: Vec<String> = invariants
        .iter()
        .map(|inv| serde_json::to_string(inv).expect("invariant serializes"))
        .collect();
    invariant_forms.sort();

    let canonical = serde_json::json!({
        "invariants": invariant_forms,
        "required_fields": fields,
    });

    let digest = Sha256::digest(canonical.to_string().as_bytes());
    hex_prefix(&digest, 16)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invariants() -> Vec<Invariant> {
        vec![
            Invariant::NonNull {
                field: "team".into(),
            },
            Invariant::Range {
                field: "rank".into(),
                min: 1.0,
                max: 500.0,
            },
        ]
    }

    #[test]
    fn test_hash_is_deterministic() {
        let fields = vec!["team".to_string(), "rank".to_string()];
        let a = compute_schema_hash(&fields, &invariants());
        let b = compute_schema_hash(&fields, &invariants());
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
    }

    #[test]
    fn test_field_order_does_not_matter() {
        let forward = vec!["team".to_string(), "rank".to_string()];
        let reverse = vec!["rank".to_string(), "team".to_string()];
        assert_eq!(
            compute_schema_hash(&forward, &invariants()),
            compute_schema_hash(&reverse, &invariants())
        );
    }

    #[test]
    fn test_invariant_order_does_not_matter() {
        let fields = vec!["team".to_string()];
        let mut reversed = invariants();
        reversed.reverse();
        assert_eq!(
            compute_schema_hash(&fields, &invariants()),
            compute_schema_hash(&fields, &reversed)
        );
    }

    #[test]
    fn test_contract_change_changes_hash() {
        let fields = vec!["team".to_string()];
        let base = compute_schema_hash(&fields, &invariants());

        let mut widened = invariants();
        widened.push(Invariant::Length {
            field: "team".into(),
            min: 1,
            max: 64,
        });
        assert_ne!(base, compute_schema_hash(&fields, &widened));
    }
}
