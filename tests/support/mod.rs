//! Shared test harness
//!
//! Wires a pipeline over in-memory metadata/KV stores and a tempdir
//! object store, with handles kept concrete so tests can inject
//! failures.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Datelike, Utc};
use serde_json::{json, Value};
use tempfile::TempDir;

use statgate::config::{PipelineConfig, RuleEntry};
use statgate::identity::{DatasetId, DatasetIdentity};
use statgate::ingest::{
    CommitOutcome, DatasetFetcher, FetchError, FetchPayload, FixtureFetcher,
};
use statgate::kv::MemoryKv;
use statgate::metadata::MemoryMetadataStore;
use statgate::object_store::LocalObjectStore;
use statgate::pipeline::Pipeline;

/// The dataset every test speaks about
pub fn identity() -> DatasetIdentity {
    DatasetIdentity::new("baseball", "mlb", "2026", "rankings", None)
}

pub fn dataset_id() -> DatasetId {
    identity().compute_dataset_id().0
}

/// Rule entry for the test dataset
pub fn rule_entry(min_record_count: usize, window: Option<(u32, u32)>) -> RuleEntry {
    RuleEntry {
        sport: "baseball".into(),
        competition_level: "mlb".into(),
        season: "2026".into(),
        dataset_type: "rankings".into(),
        qualifier: None,
        required_fields: vec!["team".into(), "rank".into()],
        min_record_count,
        season_start_month: window.map(|(start, _)| start),
        season_end_month: window.map(|(_, end)| end),
    }
}

/// Config with one rule for the test dataset
pub fn config_with_rule(min_record_count: usize, window: Option<(u32, u32)>) -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.rules.push(rule_entry(min_record_count, window));
    config
}

/// A single-month window guaranteed not to contain today
pub fn off_season_window() -> (u32, u32) {
    let next_month = Utc::now().month() % 12 + 1;
    (next_month, next_month)
}

/// Well-formed ranking records
pub fn records(count: usize) -> Vec<Value> {
    (0..count)
        .map(|i| json!({"team": format!("team-{}", i), "rank": i + 1}))
        .collect()
}

/// Pipeline plus concrete store handles
pub struct Harness {
    pub pipeline: Pipeline,
    pub metadata: Arc<MemoryMetadataStore>,
    pub kv: Arc<MemoryKv>,
    pub temp: TempDir,
}

impl Harness {
    pub fn new(config: PipelineConfig) -> Self {
        let temp = TempDir::new().unwrap();
        let metadata = Arc::new(MemoryMetadataStore::new());
        let kv = Arc::new(MemoryKv::new());
        let pipeline = Pipeline::assemble(
            config,
            metadata.clone(),
            kv.clone(),
            Arc::new(LocalObjectStore::new(temp.path().to_path_buf())),
        )
        .unwrap();
        Self {
            pipeline,
            metadata,
            kv,
            temp,
        }
    }

    /// Assemble a second pipeline (e.g. with a different rule table)
    /// over this harness's stores.
    pub fn sibling(&self, config: PipelineConfig) -> Pipeline {
        Pipeline::assemble(
            config,
            self.metadata.clone(),
            self.kv.clone(),
            Arc::new(LocalObjectStore::new(self.temp.path().to_path_buf())),
        )
        .unwrap()
    }

    /// Push a record batch through the orchestrator.
    pub async fn push(&self, batch: Vec<Value>) -> CommitOutcome {
        self.push_payload(FetchPayload::records(batch)).await
    }

    /// Push an arbitrary payload through the orchestrator.
    pub async fn push_payload(&self, payload: FetchPayload) -> CommitOutcome {
        let fetcher = FixtureFetcher::new(payload);
        self.pipeline
            .orchestrator
            .ingest(&identity(), &fetcher, "test")
            .await
            .unwrap()
    }
}

/// A fetcher whose upstream is down
pub struct FailingFetcher;

#[async_trait]
impl DatasetFetcher for FailingFetcher {
    async fn fetch(
        &self,
        _dataset_id: &DatasetId,
        _identity: &DatasetIdentity,
    ) -> Result<FetchPayload, FetchError> {
        Err(FetchError::new("upstream returned 500"))
    }
}
