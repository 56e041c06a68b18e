//! Shared handler state

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};

use crate::pipeline::Pipeline;
use crate::serve::QuotaMeta;

use super::config::HttpServerConfig;

/// Per-process request quota with a rolling window
pub struct QuotaTracker {
    limit: i64,
    window: Duration,
    remaining: AtomicI64,
    reset_at: RwLock<DateTime<Utc>>,
}

impl QuotaTracker {
    pub fn new(limit: i64, window_seconds: u64) -> Self {
        let window = Duration::seconds(window_seconds as i64);
        Self {
            limit,
            window,
            remaining: AtomicI64::new(limit),
            reset_at: RwLock::new(Utc::now() + window),
        }
    }

    /// Consume one request and report the quota block for the response.
    pub fn take(&self) -> QuotaMeta {
        let now = Utc::now();
        {
            let mut reset_at = self.reset_at.write().expect("quota lock");
            if now >= *reset_at {
                *reset_at = now + self.window;
                self.remaining.store(self.limit, Ordering::SeqCst);
            }
        }

        let remaining = (self.remaining.fetch_sub(1, Ordering::SeqCst) - 1).max(0);
        let reset_at = *self.reset_at.read().expect("quota lock");
        QuotaMeta {
            remaining,
            reset_at,
        }
    }
}

/// State shared across all handlers
pub struct AppState {
    pub pipeline: Pipeline,
    pub quota: QuotaTracker,
}

impl AppState {
    pub fn new(pipeline: Pipeline, config: &HttpServerConfig) -> Self {
        Self {
            pipeline,
            quota: QuotaTracker::new(config.quota_limit, config.quota_window_seconds),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_decrements() {
        let tracker = QuotaTracker::new(10, 3600);
        assert_eq!(tracker.take().remaining, 9);
        assert_eq!(tracker.take().remaining, 8);
    }

    #[test]
    fn test_quota_floors_at_zero() {
        let tracker = QuotaTracker::new(1, 3600);
        tracker.take();
        assert_eq!(tracker.take().remaining, 0);
        assert_eq!(tracker.take().remaining, 0);
    }
}
