//! Readiness states and transitions
//!
//! Scope is usually a dataset id. Transitions:
//!
//! ```text
//! initializing ──(first valid commit)──► ready
//! ready ──(fetch/validate/commit fail)──► degraded
//! degraded ──(successful recommit)────► ready
//! any ──(explicit admin)──────────────► unavailable
//! any ──(admin reset)─────────────────► initializing
//! ```
//!
//! Cold start (no row) behaves as `initializing`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::{ReadinessError, ReadinessResult};

/// System-level readiness of a scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadinessState {
    Initializing,
    Ready,
    Degraded,
    Unavailable,
}

impl ReadinessState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadinessState::Initializing => "initializing",
            ReadinessState::Ready => "ready",
            ReadinessState::Degraded => "degraded",
            ReadinessState::Unavailable => "unavailable",
        }
    }

    /// Whether a non-admin transition to `next` is allowed.
    ///
    /// Admin transitions (to `unavailable`, or reset to `initializing`)
    /// are allowed from any state and bypass this check.
    pub fn can_transition_to(&self, next: ReadinessState) -> bool {
        matches!(
            (self, next),
            (ReadinessState::Initializing, ReadinessState::Ready)
                | (ReadinessState::Initializing, ReadinessState::Degraded)
                | (ReadinessState::Initializing, ReadinessState::Unavailable)
                | (ReadinessState::Ready, ReadinessState::Degraded)
                | (ReadinessState::Degraded, ReadinessState::Ready)
                | (ReadinessState::Ready, ReadinessState::Ready)
                | (ReadinessState::Degraded, ReadinessState::Degraded)
        )
    }
}

impl std::fmt::Display for ReadinessState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One row per scope, mirroring the `system_readiness` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessRecord {
    pub scope: String,
    pub readiness_state: ReadinessState,
    pub last_transition_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_validated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub live_ingestion_at: Option<DateTime<Utc>>,
}

impl ReadinessRecord {
    /// Fresh row for a scope that has never transitioned
    pub fn initializing(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            readiness_state: ReadinessState::Initializing,
            last_transition_at: Utc::now(),
            reason: None,
            snapshot_validated_at: None,
            live_ingestion_at: None,
        }
    }

    /// Apply a non-admin transition.
    pub fn transition(
        &mut self,
        next: ReadinessState,
        reason: Option<String>,
    ) -> ReadinessResult<()> {
        if !self.readiness_state.can_transition_to(next) {
            return Err(ReadinessError::ForbiddenTransition {
                scope: self.scope.clone(),
                from: self.readiness_state.as_str(),
                to: next.as_str(),
            });
        }
        self.readiness_state = next;
        self.last_transition_at = Utc::now();
        self.reason = reason;
        Ok(())
    }

    /// Admin transition: allowed from any state.
    pub fn admin_transition(&mut self, next: ReadinessState, reason: Option<String>) {
        self.readiness_state = next;
        self.last_transition_at = Utc::now();
        self.reason = reason;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initializing_to_ready() {
        let mut record = ReadinessRecord::initializing("scope");
        assert!(record.transition(ReadinessState::Ready, None).is_ok());
        assert_eq!(record.readiness_state, ReadinessState::Ready);
    }

    #[test]
    fn test_ready_to_degraded_and_back() {
        let mut record = ReadinessRecord::initializing("scope");
        record.transition(ReadinessState::Ready, None).unwrap();
        record
            .transition(ReadinessState::Degraded, Some("fetch failed".into()))
            .unwrap();
        assert_eq!(record.readiness_state, ReadinessState::Degraded);
        record.transition(ReadinessState::Ready, None).unwrap();
        assert_eq!(record.readiness_state, ReadinessState::Ready);
    }

    #[test]
    fn test_unavailable_requires_admin() {
        let mut record = ReadinessRecord::initializing("scope");
        record.transition(ReadinessState::Ready, None).unwrap();

        let result = record.transition(ReadinessState::Unavailable, None);
        assert!(result.is_err());

        record.admin_transition(ReadinessState::Unavailable, Some("maintenance".into()));
        assert_eq!(record.readiness_state, ReadinessState::Unavailable);
    }

    #[test]
    fn test_admin_reset_from_any_state() {
        let mut record = ReadinessRecord::initializing("scope");
        record.admin_transition(ReadinessState::Unavailable, None);
        record.admin_transition(ReadinessState::Initializing, None);
        assert_eq!(record.readiness_state, ReadinessState::Initializing);
    }

    #[test]
    fn test_degraded_cannot_jump_to_initializing() {
        let mut record = ReadinessRecord::initializing("scope");
        record.transition(ReadinessState::Ready, None).unwrap();
        record.transition(ReadinessState::Degraded, None).unwrap();
        assert!(record
            .transition(ReadinessState::Initializing, None)
            .is_err());
    }
}
