//! Semantic Validation
//!
//! Classifies a proposed record batch for a dataset as `valid`,
//! `invalid`, or `unavailable` against its semantic rule. Unavailable is
//! not a failure: an off-season dataset or a source that reported itself
//! down must never displace good data or poison caches.

pub mod semantic;

pub use semantic::{SemanticReport, SemanticValidator};

use serde::{Deserialize, Serialize};

/// Tri-state validation outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    Valid,
    Invalid,
    Unavailable,
}

impl ValidationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationStatus::Valid => "valid",
            ValidationStatus::Invalid => "invalid",
            ValidationStatus::Unavailable => "unavailable",
        }
    }
}

impl std::fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
