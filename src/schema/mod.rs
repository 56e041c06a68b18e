//! Schema Registry
//!
//! Versioned structural contracts per dataset: required fields, record
//! invariants, a deterministic schema hash, and an activity/sunset
//! lifecycle. At most one schema is active per dataset. Data written
//! under a major version more than one behind the active major is
//! incompatible and must never be promoted to the KV surface.

pub mod errors;
pub mod hash;
pub mod registry;
pub mod types;
pub mod validator;

pub use errors::{SchemaError, SchemaErrorCode, SchemaResult, ViolationDetails};
pub use hash::compute_schema_hash;
pub use registry::SchemaRegistry;
pub use types::{Compatibility, DatasetSchema, Invariant};
pub use validator::SchemaValidator;
