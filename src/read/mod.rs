//! Validated Read
//!
//! The end-to-end read contract: readiness gate, pointer chase, envelope
//! assertion, object-store fallback, and wire mapping. The read path
//! owns no mutations; it reconstructs truth from what the orchestrator
//! persisted.

pub mod outcome;
pub mod reader;

pub use outcome::{ReadOutcome, ReadSource};
pub use reader::ValidatedReader;
