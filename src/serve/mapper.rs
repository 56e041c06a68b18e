//! Wire directive mapping
//!
//! Status mapping:
//! - `live` + `valid` ⇒ 200, `public, max-age=300, s-maxage=900`
//! - `initializing` ⇒ 202, `no-store`, `Retry-After: 30`
//! - `empty_valid` ⇒ 204, `no-store`
//! - `stale` / `unavailable` ⇒ 503, `no-store`, `Retry-After: 60`
//!
//! 422 belongs to the write-reporting endpoint and never passes through
//! this mapper.

use crate::envelope::LifecycleState;
use crate::validation::ValidationStatus;

/// Public cache TTL for live data, seconds
pub const CACHE_MAX_AGE_SECONDS: u32 = 300;
/// Shared (CDN) cache TTL for live data, seconds
pub const CACHE_S_MAXAGE_SECONDS: u32 = 900;
/// Retry hint while a scope is initializing, seconds
pub const RETRY_AFTER_INITIALIZING_SECONDS: u32 = 30;
/// Retry hint while a scope is degraded or unavailable, seconds
pub const RETRY_AFTER_UNAVAILABLE_SECONDS: u32 = 60;

/// Wire-ready directive for one response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireDirective {
    pub http_status: u16,
    pub cache_control: String,
    pub retry_after: Option<u32>,
    pub cache_eligible: bool,
    /// TTL surfaced in response meta; zero when not cache-eligible
    pub ttl_seconds: u32,
}

impl WireDirective {
    fn no_store(http_status: u16, retry_after: Option<u32>) -> Self {
        Self {
            http_status,
            cache_control: "no-store".into(),
            retry_after,
            cache_eligible: false,
            ttl_seconds: 0,
        }
    }
}

/// Map persisted truth to the wire.
pub fn map_wire(lifecycle: LifecycleState, validation: Option<ValidationStatus>) -> WireDirective {
    match (lifecycle, validation) {
        (LifecycleState::Live, Some(ValidationStatus::Valid)) => WireDirective {
            http_status: 200,
            cache_control: format!(
                "public, max-age={}, s-maxage={}",
                CACHE_MAX_AGE_SECONDS, CACHE_S_MAXAGE_SECONDS
            ),
            retry_after: None,
            cache_eligible: true,
            ttl_seconds: CACHE_MAX_AGE_SECONDS,
        },
        // Live without proven validity must not be cached
        (LifecycleState::Live, _) => {
            WireDirective::no_store(503, Some(RETRY_AFTER_UNAVAILABLE_SECONDS))
        }
        (LifecycleState::Initializing, _) => {
            WireDirective::no_store(202, Some(RETRY_AFTER_INITIALIZING_SECONDS))
        }
        (LifecycleState::EmptyValid, _) => WireDirective::no_store(204, None),
        (LifecycleState::Stale, _) | (LifecycleState::Unavailable, _) => {
            WireDirective::no_store(503, Some(RETRY_AFTER_UNAVAILABLE_SECONDS))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_live_valid_is_cacheable_200() {
        let directive = map_wire(LifecycleState::Live, Some(ValidationStatus::Valid));
        assert_eq!(directive.http_status, 200);
        assert!(directive.cache_eligible);
        assert!(directive.cache_control.contains("max-age=300"));
        assert!(directive.cache_control.contains("s-maxage=900"));
        assert_eq!(directive.ttl_seconds, 300);
        assert!(directive.retry_after.is_none());
    }

    #[test]
    fn test_live_without_valid_is_not_cacheable() {
        let directive = map_wire(LifecycleState::Live, Some(ValidationStatus::Invalid));
        assert_eq!(directive.http_status, 503);
        assert!(!directive.cache_eligible);
        assert_eq!(directive.cache_control, "no-store");

        let directive = map_wire(LifecycleState::Live, None);
        assert!(!directive.cache_eligible);
    }

    #[test]
    fn test_initializing_is_202_with_retry() {
        let directive = map_wire(LifecycleState::Initializing, None);
        assert_eq!(directive.http_status, 202);
        assert_eq!(directive.cache_control, "no-store");
        assert_eq!(directive.retry_after, Some(30));
    }

    #[test]
    fn test_empty_valid_is_204_no_store() {
        let directive = map_wire(
            LifecycleState::EmptyValid,
            Some(ValidationStatus::Unavailable),
        );
        assert_eq!(directive.http_status, 204);
        assert_eq!(directive.cache_control, "no-store");
        assert!(!directive.cache_eligible);
    }

    #[test]
    fn test_stale_and_unavailable_are_503() {
        for lifecycle in [LifecycleState::Stale, LifecycleState::Unavailable] {
            let directive = map_wire(lifecycle, Some(ValidationStatus::Valid));
            assert_eq!(directive.http_status, 503);
            assert_eq!(directive.cache_control, "no-store");
            assert_eq!(directive.retry_after, Some(60));
            assert!(!directive.cache_eligible);
        }
    }

    #[test]
    fn test_every_non_200_is_no_store() {
        let cases = [
            map_wire(LifecycleState::Initializing, None),
            map_wire(LifecycleState::EmptyValid, None),
            map_wire(LifecycleState::Stale, Some(ValidationStatus::Valid)),
            map_wire(LifecycleState::Unavailable, Some(ValidationStatus::Invalid)),
        ];
        for directive in cases {
            assert_ne!(directive.http_status, 200);
            assert_eq!(directive.cache_control, "no-store");
            assert!(!directive.cache_eligible);
        }
    }
}
