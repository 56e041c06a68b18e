//! Observability
//!
//! Structured JSON logging and exact operational counters for the
//! pipeline. One log line per event, deterministic key ordering,
//! counters only.

pub mod logger;
pub mod metrics;

pub use logger::{Logger, Severity};
pub use metrics::MetricsRegistry;
