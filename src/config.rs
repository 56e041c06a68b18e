//! Pipeline Configuration
//!
//! Every tunable of the commit & serve pipeline lives in one typed struct
//! that is threaded explicitly through constructors. There are no ambient
//! singletons on the hot path.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A semantic-rule entry as written in the configuration file.
///
/// Rules are declared against the identity tuple; the rule table resolves
/// them to dataset ids at load time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleEntry {
    /// Sport (must appear in the sport allow-list)
    pub sport: String,
    /// Competition level (must appear in the level allow-list)
    pub competition_level: String,
    /// Season label, e.g. "2026"
    pub season: String,
    /// Dataset type (must appear in the type allow-list)
    pub dataset_type: String,
    /// Optional qualifier, e.g. a division or conference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualifier: Option<String>,
    /// Field names every record must carry
    pub required_fields: Vec<String>,
    /// Minimum record count below which the dataset is invalid
    pub min_record_count: usize,
    /// First month of the in-season window (1-12), if seasonal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season_start_month: Option<u32>,
    /// Last month of the in-season window (1-12), inclusive; may wrap the year
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season_end_month: Option<u32>,
}

/// Pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// TTL for staged (pending) versioned blobs, seconds (default: 300)
    #[serde(default = "default_pending_ttl")]
    pub pending_ttl_seconds: u64,

    /// TTL for committed versioned blobs, seconds (default: 3600)
    #[serde(default = "default_committed_ttl")]
    pub committed_ttl_seconds: u64,

    /// Oldest object-store snapshot accepted for cold-start recovery, seconds (default: 86400)
    #[serde(default = "default_snapshot_max_age")]
    pub snapshot_max_age_seconds: u64,

    /// Live versioned blobs to keep under KV keys (default: 2)
    #[serde(default = "default_versions_to_retain")]
    pub versions_to_retain: u64,

    /// Object-store snapshots to keep per dataset; `latest` is never deleted (default: 5)
    #[serde(default = "default_snapshot_retain")]
    pub snapshot_retain_versions: u64,

    /// Age past which served LKG data is reported stale rather than live, seconds (default: 21600)
    #[serde(default = "default_lkg_max_age")]
    pub lkg_max_age_seconds: u64,

    /// Deadline for any single external call (fetch, KV, object store, metadata), milliseconds (default: 10000)
    #[serde(default = "default_operation_deadline")]
    pub operation_deadline_ms: u64,

    /// Age past which a pending commit row is swept by the reaper, seconds (default: 900)
    #[serde(default = "default_reaper_timeout")]
    pub pending_reaper_timeout_seconds: u64,

    /// Prefix for all KV keys (default: "statgate")
    #[serde(default = "default_kv_prefix")]
    pub kv_prefix: String,

    /// Sports accepted by identity normalization
    #[serde(default = "default_sports")]
    pub allowed_sports: Vec<String>,

    /// Competition levels accepted by identity normalization
    #[serde(default = "default_levels")]
    pub allowed_competition_levels: Vec<String>,

    /// Dataset types accepted by identity normalization
    #[serde(default = "default_types")]
    pub allowed_dataset_types: Vec<String>,

    /// Semantic rule table
    #[serde(default)]
    pub rules: Vec<RuleEntry>,
}

fn default_pending_ttl() -> u64 {
    300
}

fn default_committed_ttl() -> u64 {
    3600
}

fn default_snapshot_max_age() -> u64 {
    86400
}

fn default_versions_to_retain() -> u64 {
    2
}

fn default_snapshot_retain() -> u64 {
    5
}

fn default_lkg_max_age() -> u64 {
    21600
}

fn default_operation_deadline() -> u64 {
    10_000
}

fn default_reaper_timeout() -> u64 {
    900
}

fn default_kv_prefix() -> String {
    "statgate".to_string()
}

fn default_sports() -> Vec<String> {
    vec![
        "baseball".to_string(),
        "football".to_string(),
        "basketball".to_string(),
        "track-field".to_string(),
    ]
}

fn default_levels() -> Vec<String> {
    vec![
        "mlb".to_string(),
        "nfl".to_string(),
        "nba".to_string(),
        "ncaa".to_string(),
        "high-school".to_string(),
        "perfect-game".to_string(),
    ]
}

fn default_types() -> Vec<String> {
    vec![
        "rankings".to_string(),
        "standings".to_string(),
        "scores".to_string(),
        "roster".to_string(),
        "projections".to_string(),
        "analytics".to_string(),
    ]
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            pending_ttl_seconds: default_pending_ttl(),
            committed_ttl_seconds: default_committed_ttl(),
            snapshot_max_age_seconds: default_snapshot_max_age(),
            versions_to_retain: default_versions_to_retain(),
            snapshot_retain_versions: default_snapshot_retain(),
            lkg_max_age_seconds: default_lkg_max_age(),
            operation_deadline_ms: default_operation_deadline(),
            pending_reaper_timeout_seconds: default_reaper_timeout(),
            kv_prefix: default_kv_prefix(),
            allowed_sports: default_sports(),
            allowed_competition_levels: default_levels(),
            allowed_dataset_types: default_types(),
            rules: Vec::new(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = fs::read_to_string(path)
            .map_err(|e| format!("failed to read config '{}': {}", path.display(), e))?;

        let config: PipelineConfig = serde_json::from_str(&content)
            .map_err(|e| format!("invalid config JSON '{}': {}", path.display(), e))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate knob sanity
    pub fn validate(&self) -> Result<(), String> {
        if self.pending_ttl_seconds == 0 {
            return Err("pending_ttl_seconds must be > 0".into());
        }
        if self.committed_ttl_seconds == 0 {
            return Err("committed_ttl_seconds must be > 0".into());
        }
        if self.committed_ttl_seconds < self.pending_ttl_seconds {
            return Err("committed_ttl_seconds must be >= pending_ttl_seconds".into());
        }
        if self.versions_to_retain < 2 {
            return Err("versions_to_retain must be >= 2 to permit rollback".into());
        }
        if self.kv_prefix.is_empty() {
            return Err("kv_prefix must not be empty".into());
        }
        if self.allowed_sports.is_empty()
            || self.allowed_competition_levels.is_empty()
            || self.allowed_dataset_types.is_empty()
        {
            return Err("identity allow-lists must not be empty".into());
        }
        for rule in &self.rules {
            if let (Some(start), Some(end)) = (rule.season_start_month, rule.season_end_month) {
                if !(1..=12).contains(&start) || !(1..=12).contains(&end) {
                    return Err(format!(
                        "rule for '{}/{}' has months outside 1-12",
                        rule.sport, rule.dataset_type
                    ));
                }
            }
            if rule.season_start_month.is_some() != rule.season_end_month.is_some() {
                return Err(format!(
                    "rule for '{}/{}' declares only one end of its season window",
                    rule.sport, rule.dataset_type
                ));
            }
        }
        Ok(())
    }

    /// Pending-blob TTL as a duration
    pub fn pending_ttl(&self) -> Duration {
        Duration::from_secs(self.pending_ttl_seconds)
    }

    /// Committed-blob TTL as a duration
    pub fn committed_ttl(&self) -> Duration {
        Duration::from_secs(self.committed_ttl_seconds)
    }

    /// Per-call deadline as a duration
    pub fn operation_deadline(&self) -> Duration {
        Duration::from_millis(self.operation_deadline_ms)
    }
}
