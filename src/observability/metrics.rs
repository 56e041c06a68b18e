//! Metrics registry
//!
//! - Counters only (no gauges, no histograms)
//! - Monotonic increase
//! - Reset only on process start
//! - Thread-safe but lock-minimal

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Point-in-time counter values for the metrics endpoint
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub ingests_started: u64,
    pub ingests_committed: u64,
    pub ingests_rolled_back: u64,
    pub fetch_failures: u64,
    pub lkg_activations: u64,
    pub snapshots_written: u64,
    pub snapshot_failures: u64,
    pub snapshot_recoveries: u64,
    pub reads_served: u64,
    pub reads_blocked: u64,
    pub object_store_fallbacks: u64,
    pub identity_violations: u64,
    pub legacy_envelopes: u64,
    pub cache_eligible_responses: u64,
    pub pending_reaped: u64,
}

/// Metrics registry containing all pipeline counters
///
/// All counters use atomic operations with Relaxed ordering; eventual
/// consistency is fine for metrics.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    ingests_started: AtomicU64,
    ingests_committed: AtomicU64,
    ingests_rolled_back: AtomicU64,
    fetch_failures: AtomicU64,
    lkg_activations: AtomicU64,
    snapshots_written: AtomicU64,
    snapshot_failures: AtomicU64,
    snapshot_recoveries: AtomicU64,
    reads_served: AtomicU64,
    reads_blocked: AtomicU64,
    object_store_fallbacks: AtomicU64,
    identity_violations: AtomicU64,
    legacy_envelopes: AtomicU64,
    cache_eligible_responses: AtomicU64,
    pending_reaped: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_ingests_started(&self) {
        self.ingests_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_ingests_committed(&self) {
        self.ingests_committed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_ingests_rolled_back(&self) {
        self.ingests_rolled_back.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_fetch_failures(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_lkg_activations(&self) {
        self.lkg_activations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_snapshots_written(&self) {
        self.snapshots_written.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_snapshot_failures(&self) {
        self.snapshot_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_snapshot_recoveries(&self) {
        self.snapshot_recoveries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_reads_served(&self) {
        self.reads_served.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_reads_blocked(&self) {
        self.reads_blocked.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_object_store_fallbacks(&self) {
        self.object_store_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_identity_violations(&self) {
        self.identity_violations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_legacy_envelopes(&self) {
        self.legacy_envelopes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_cache_eligible_responses(&self) {
        self.cache_eligible_responses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_pending_reaped(&self, count: u64) {
        self.pending_reaped.fetch_add(count, Ordering::Relaxed);
    }

    /// Read all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            ingests_started: self.ingests_started.load(Ordering::Relaxed),
            ingests_committed: self.ingests_committed.load(Ordering::Relaxed),
            ingests_rolled_back: self.ingests_rolled_back.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            lkg_activations: self.lkg_activations.load(Ordering::Relaxed),
            snapshots_written: self.snapshots_written.load(Ordering::Relaxed),
            snapshot_failures: self.snapshot_failures.load(Ordering::Relaxed),
            snapshot_recoveries: self.snapshot_recoveries.load(Ordering::Relaxed),
            reads_served: self.reads_served.load(Ordering::Relaxed),
            reads_blocked: self.reads_blocked.load(Ordering::Relaxed),
            object_store_fallbacks: self.object_store_fallbacks.load(Ordering::Relaxed),
            identity_violations: self.identity_violations.load(Ordering::Relaxed),
            legacy_envelopes: self.legacy_envelopes.load(Ordering::Relaxed),
            cache_eligible_responses: self.cache_eligible_responses.load(Ordering::Relaxed),
            pending_reaped: self.pending_reaped.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_start_at_zero() {
        let metrics = MetricsRegistry::new();
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.ingests_started, 0);
        assert_eq!(snapshot.reads_served, 0);
    }

    #[test]
    fn test_counters_increment() {
        let metrics = MetricsRegistry::new();
        metrics.increment_ingests_started();
        metrics.increment_ingests_committed();
        metrics.increment_lkg_activations();
        metrics.add_pending_reaped(3);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.ingests_started, 1);
        assert_eq!(snapshot.ingests_committed, 1);
        assert_eq!(snapshot.lkg_activations, 1);
        assert_eq!(snapshot.pending_reaped, 3);
    }
}
