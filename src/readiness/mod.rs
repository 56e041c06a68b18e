//! Readiness Service
//!
//! The system-level gate consulted by every read before it touches the
//! KV surface. Cold starts, degraded states, and admin-disabled scopes
//! must not cache or serve uncertain payloads; the check result carries
//! the wire status that reflects reality.

pub mod errors;
pub mod service;
pub mod state;

pub use errors::{ReadinessError, ReadinessResult};
pub use service::{ReadinessCheck, ReadinessService};
pub use state::{ReadinessRecord, ReadinessState};
