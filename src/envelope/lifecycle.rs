//! Lifecycle derivation
//!
//! `lifecycle_state` at write time is a pure function of the validation
//! result, the record count, and whether the dataset has a prior commit.
//! The read path overlays `stale` when serving LKG or a legacy payload.

use serde::{Deserialize, Serialize};

use crate::validation::ValidationStatus;

/// Dataset lifecycle label carried on every envelope and response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    /// No prior commit exists for this dataset
    Initializing,
    /// Validation passed and density met
    Live,
    /// Legacy envelope or LKG serving (older than current intended)
    Stale,
    /// Off-season with zero records; an empty payload is the truth
    EmptyValid,
    /// Invalid with no LKG, or explicit failure
    Unavailable,
}

impl LifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Initializing => "initializing",
            LifecycleState::Live => "live",
            LifecycleState::Stale => "stale",
            LifecycleState::EmptyValid => "empty_valid",
            LifecycleState::Unavailable => "unavailable",
        }
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Derive the lifecycle for the write moment.
///
/// `off_season` is true when the semantic gate classified the batch
/// unavailable because of the season window.
pub fn lifecycle_at_write(
    validation: ValidationStatus,
    record_count: usize,
    expected_min: usize,
    has_prior_commit: bool,
    off_season: bool,
) -> LifecycleState {
    match validation {
        ValidationStatus::Valid if record_count >= expected_min => LifecycleState::Live,
        ValidationStatus::Unavailable if off_season && record_count == 0 => {
            LifecycleState::EmptyValid
        }
        _ if !has_prior_commit => LifecycleState::Initializing,
        _ => LifecycleState::Unavailable,
    }
}

/// HTTP status frozen into the envelope at write time.
///
/// Only {200, 202, 204, 503} are ever written; 422 never reaches the KV
/// surface.
pub fn http_status_at_write(lifecycle: LifecycleState) -> u16 {
    match lifecycle {
        LifecycleState::Live => 200,
        LifecycleState::Initializing => 202,
        LifecycleState::EmptyValid => 204,
        LifecycleState::Stale | LifecycleState::Unavailable => 503,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_with_density_is_live() {
        let state = lifecycle_at_write(ValidationStatus::Valid, 25, 25, true, false);
        assert_eq!(state, LifecycleState::Live);
        assert_eq!(http_status_at_write(state), 200);
    }

    #[test]
    fn test_off_season_zero_records_is_empty_valid() {
        let state = lifecycle_at_write(ValidationStatus::Unavailable, 0, 25, true, true);
        assert_eq!(state, LifecycleState::EmptyValid);
        assert_eq!(http_status_at_write(state), 204);
    }

    #[test]
    fn test_no_prior_commit_is_initializing() {
        let state = lifecycle_at_write(ValidationStatus::Unavailable, 0, 25, false, false);
        assert_eq!(state, LifecycleState::Initializing);
        assert_eq!(http_status_at_write(state), 202);
    }

    #[test]
    fn test_invalid_with_prior_is_unavailable() {
        let state = lifecycle_at_write(ValidationStatus::Invalid, 10, 25, true, false);
        assert_eq!(state, LifecycleState::Unavailable);
        assert_eq!(http_status_at_write(state), 503);
    }

    #[test]
    fn test_first_valid_commit_is_live_not_initializing() {
        let state = lifecycle_at_write(ValidationStatus::Valid, 25, 25, false, false);
        assert_eq!(state, LifecycleState::Live);
    }

    #[test]
    fn test_stale_maps_to_503() {
        assert_eq!(http_status_at_write(LifecycleState::Stale), 503);
    }
}
