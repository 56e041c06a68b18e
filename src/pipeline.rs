//! Pipeline assembly
//!
//! Wires the stores, registries, orchestrator, and reader from one
//! configuration. Everything is shared behind `Arc`; there is no global
//! state.

use std::path::PathBuf;
use std::sync::Arc;

use crate::commit_log::CommitLog;
use crate::config::PipelineConfig;
use crate::identity::IdentityRegistry;
use crate::ingest::IngestOrchestrator;
use crate::kv::{KvSurface, MemoryKv};
use crate::metadata::{MemoryMetadataStore, MetadataStore};
use crate::object_store::{LocalObjectStore, ObjectStore, SnapshotStore};
use crate::observability::MetricsRegistry;
use crate::read::ValidatedReader;
use crate::readiness::ReadinessService;
use crate::rules::RuleTable;
use crate::schema::SchemaRegistry;

/// A fully wired pipeline
pub struct Pipeline {
    pub config: Arc<PipelineConfig>,
    pub rules: Arc<RuleTable>,
    pub metadata: Arc<dyn MetadataStore>,
    pub identities: Arc<IdentityRegistry>,
    pub schemas: Arc<SchemaRegistry>,
    pub commit_log: Arc<CommitLog>,
    pub kv: Arc<dyn KvSurface>,
    pub snapshots: Arc<SnapshotStore>,
    pub readiness: Arc<ReadinessService>,
    pub metrics: Arc<MetricsRegistry>,
    pub orchestrator: Arc<IngestOrchestrator>,
    pub reader: Arc<ValidatedReader>,
}

impl Pipeline {
    /// Assemble a pipeline over explicit store implementations.
    pub fn assemble(
        config: PipelineConfig,
        metadata: Arc<dyn MetadataStore>,
        kv: Arc<dyn KvSurface>,
        objects: Arc<dyn ObjectStore>,
    ) -> Result<Self, String> {
        config.validate()?;
        let rules = Arc::new(RuleTable::from_config(&config)?);
        let config = Arc::new(config);

        let identities = Arc::new(IdentityRegistry::new(metadata.clone(), config.clone()));
        let schemas = Arc::new(SchemaRegistry::new(metadata.clone()));
        let commit_log = Arc::new(CommitLog::new(metadata.clone()));
        let snapshots = Arc::new(SnapshotStore::new(
            objects,
            config.snapshot_retain_versions,
        ));
        let readiness = Arc::new(ReadinessService::new(metadata.clone()));
        let metrics = Arc::new(MetricsRegistry::new());

        let orchestrator = Arc::new(IngestOrchestrator::new(
            config.clone(),
            rules.clone(),
            identities.clone(),
            schemas.clone(),
            commit_log.clone(),
            kv.clone(),
            snapshots.clone(),
            readiness.clone(),
            metrics.clone(),
        ));
        let reader = Arc::new(ValidatedReader::new(
            config.clone(),
            commit_log.clone(),
            schemas.clone(),
            kv.clone(),
            snapshots.clone(),
            readiness.clone(),
            metrics.clone(),
        ));

        Ok(Self {
            config,
            rules,
            metadata,
            identities,
            schemas,
            commit_log,
            kv,
            snapshots,
            readiness,
            metrics,
            orchestrator,
            reader,
        })
    }

    /// In-memory metadata and KV with a filesystem object store: the
    /// single-process deployment shape.
    pub fn local(config: PipelineConfig, data_dir: PathBuf) -> Result<Self, String> {
        Self::assemble(
            config,
            Arc::new(MemoryMetadataStore::new()),
            Arc::new(MemoryKv::new()),
            Arc::new(LocalObjectStore::new(data_dir)),
        )
    }
}
