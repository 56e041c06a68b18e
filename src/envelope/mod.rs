//! KV Safety Envelope
//!
//! Every payload written to the KV surface is wrapped with its write-time
//! truth: HTTP status, lifecycle, validation status, identity, and schema
//! info. Readers reconstruct correct wire semantics from the envelope
//! alone, without a second metadata lookup. A payload lacking the
//! envelope is legacy and serves as stale until re-ingested.

pub mod lifecycle;
pub mod safety;

pub use lifecycle::{http_status_at_write, lifecycle_at_write, LifecycleState};
pub use safety::{parse_payload, ParsedPayload, SafetyEnvelope, SafetyMeta};
