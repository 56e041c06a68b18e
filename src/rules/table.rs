//! Rule table
//!
//! Resolves configuration rule entries to dataset ids at load time. The
//! table is immutable once built; lookups are by `DatasetId`.

use std::collections::HashMap;

use crate::config::PipelineConfig;
use crate::identity::{DatasetId, DatasetIdentity};

use super::season::SeasonWindow;
use super::SemanticRule;

/// Immutable per-dataset rule lookup
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: HashMap<DatasetId, SemanticRule>,
}

impl RuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the table from configuration entries.
    ///
    /// Each entry's identity tuple is normalized and hashed; a tuple
    /// appearing twice is a configuration error.
    pub fn from_config(config: &PipelineConfig) -> Result<Self, String> {
        let mut rules = HashMap::new();

        for entry in &config.rules {
            let identity = DatasetIdentity::new(
                entry.sport.clone(),
                entry.competition_level.clone(),
                entry.season.clone(),
                entry.dataset_type.clone(),
                entry.qualifier.clone(),
            );
            let normalized = identity
                .normalize(config)
                .map_err(|e| format!("rule identity rejected: {}", e))?;
            let (dataset_id, _) = normalized.compute_dataset_id();

            let mut rule =
                SemanticRule::new(entry.required_fields.clone(), entry.min_record_count);
            if let (Some(start), Some(end)) = (entry.season_start_month, entry.season_end_month) {
                rule = rule.with_season(SeasonWindow::new(start, end));
            }

            if rules.insert(dataset_id.clone(), rule).is_some() {
                return Err(format!(
                    "duplicate rule for dataset {} ({}/{}/{}/{})",
                    dataset_id, entry.sport, entry.competition_level, entry.season, entry.dataset_type
                ));
            }
        }

        Ok(Self { rules })
    }

    /// Look up the rule for a dataset
    pub fn get(&self, dataset_id: &DatasetId) -> Option<&SemanticRule> {
        self.rules.get(dataset_id)
    }

    /// Insert a rule directly (admin/test path)
    pub fn insert(&mut self, dataset_id: DatasetId, rule: SemanticRule) {
        self.rules.insert(dataset_id, rule);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
