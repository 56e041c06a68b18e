//! Safety envelope structure and parsing
//!
//! The envelope is immutable once written; the orchestrator writes a
//! fresh one on promote only to stamp `committed_at`. Identity travels
//! inside the meta so a reader can assert the blob answers the question
//! that was asked.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::identity::{DatasetId, DatasetIdentity, IdentityResult};
use crate::validation::ValidationStatus;

use super::lifecycle::LifecycleState;

/// Write-time truth frozen into every KV payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyMeta {
    /// HTTP status at the write moment; one of 200, 202, 204, 503
    pub http_status_at_write: u16,
    pub lifecycle_state: LifecycleState,
    pub record_count: usize,
    pub validation_status: ValidationStatus,
    pub dataset_id: DatasetId,
    /// Canonical JSON the dataset id was derived from
    pub canonical_identity: String,
    /// Full identity tuple for byte-for-byte assertion on read
    pub identity: DatasetIdentity,
    pub expected_min_count: usize,
    pub written_at: DateTime<Utc>,
    pub version: u64,
    pub is_lkg: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lkg_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub committed_at: Option<DateTime<Utc>>,
}

/// Envelope wrapping every payload on the KV surface
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyEnvelope<T = Value> {
    pub data: Vec<T>,
    pub meta: SafetyMeta,
}

impl<T: Serialize + DeserializeOwned> SafetyEnvelope<T> {
    pub fn new(data: Vec<T>, meta: SafetyMeta) -> Self {
        Self { data, meta }
    }

    /// Stamp the commit time, producing the envelope rewritten on promote.
    pub fn committed(mut self, committed_at: DateTime<Utc>) -> Self {
        self.meta.committed_at = Some(committed_at);
        self
    }

    /// Assert the envelope's identity against the requested one.
    pub fn assert_identity(&self, expected: &DatasetIdentity) -> IdentityResult<()> {
        expected.assert_matches(&self.meta.identity, &self.meta.dataset_id)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Result of parsing a KV payload
#[derive(Debug, Clone)]
pub enum ParsedPayload {
    /// A well-formed safety envelope
    Enveloped(SafetyEnvelope<Value>),
    /// A bare array without safety metadata; serve as stale until
    /// re-ingested
    Legacy(Vec<Value>),
}

/// Parse a raw KV payload, falling back to the legacy shape.
///
/// Anything that is neither an envelope nor a bare array is a parse
/// error, which the read path treats as a KV miss.
pub fn parse_payload(raw: &str) -> serde_json::Result<ParsedPayload> {
    if let Ok(envelope) = serde_json::from_str::<SafetyEnvelope<Value>>(raw) {
        return Ok(ParsedPayload::Enveloped(envelope));
    }
    let legacy: Vec<Value> = serde_json::from_str(raw)?;
    Ok(ParsedPayload::Legacy(legacy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn identity() -> DatasetIdentity {
        DatasetIdentity::new("baseball", "mlb", "2026", "rankings", None)
    }

    fn meta() -> SafetyMeta {
        let identity = identity();
        let (dataset_id, canonical_identity) = identity.compute_dataset_id();
        SafetyMeta {
            http_status_at_write: 200,
            lifecycle_state: LifecycleState::Live,
            record_count: 2,
            validation_status: ValidationStatus::Valid,
            dataset_id,
            canonical_identity,
            identity,
            expected_min_count: 2,
            written_at: Utc::now(),
            version: 1,
            is_lkg: false,
            lkg_reason: None,
            schema_version: Some("1.0.0".into()),
            schema_hash: Some("deadbeefdeadbeef".into()),
            committed_at: None,
        }
    }

    fn envelope() -> SafetyEnvelope<Value> {
        SafetyEnvelope::new(vec![json!({"team": "a"}), json!({"team": "b"})], meta())
    }

    #[test]
    fn test_round_trip() {
        let raw = envelope().to_json().unwrap();
        match parse_payload(&raw).unwrap() {
            ParsedPayload::Enveloped(parsed) => {
                assert_eq!(parsed.data.len(), 2);
                assert_eq!(parsed.meta.http_status_at_write, 200);
                assert_eq!(parsed.meta.lifecycle_state, LifecycleState::Live);
            }
            ParsedPayload::Legacy(_) => panic!("expected envelope"),
        }
    }

    #[test]
    fn test_bare_array_is_legacy() {
        let raw = r#"[{"team": "a"}, {"team": "b"}]"#;
        match parse_payload(raw).unwrap() {
            ParsedPayload::Legacy(data) => assert_eq!(data.len(), 2),
            ParsedPayload::Enveloped(_) => panic!("expected legacy"),
        }
    }

    #[test]
    fn test_garbage_is_error() {
        assert!(parse_payload("not json at all").is_err());
        assert!(parse_payload(r#"{"neither": "shape"}"#).is_err());
    }

    #[test]
    fn test_identity_assertion() {
        let envelope = envelope();
        assert!(envelope.assert_identity(&identity()).is_ok());

        let other = DatasetIdentity::new("football", "nfl", "2026", "rankings", None);
        assert!(envelope.assert_identity(&other).is_err());
    }

    #[test]
    fn test_committed_stamp() {
        let at = Utc::now();
        let committed = envelope().committed(at);
        assert_eq!(committed.meta.committed_at, Some(at));
    }
}
