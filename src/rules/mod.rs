//! Semantic Rules
//!
//! Per-dataset publication requirements: the fields every record must
//! carry, the minimum record count, and an optional in-season month
//! window. Rules are process-local constants resolved from the typed
//! configuration at startup; ingestion never creates them.

pub mod season;
pub mod table;

pub use season::SeasonWindow;
pub use table::RuleTable;

use serde::{Deserialize, Serialize};

/// Publication requirements for one dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemanticRule {
    /// Field names every record must carry as non-null, non-empty values
    pub required_fields: Vec<String>,
    /// Record count below which the dataset is invalid
    pub min_record_count: usize,
    /// In-season window; outside it the dataset is unavailable, not invalid
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season_window: Option<SeasonWindow>,
}

impl SemanticRule {
    pub fn new(required_fields: Vec<String>, min_record_count: usize) -> Self {
        Self {
            required_fields,
            min_record_count,
            season_window: None,
        }
    }

    pub fn with_season(mut self, window: SeasonWindow) -> Self {
        self.season_window = Some(window);
        self
    }
}
