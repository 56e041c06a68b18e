//! The ingestion pipeline
//!
//! One attempt walks `fetch → validate → stage → promote → snapshot →
//! cleanup`. The versioned blob is written before the pointer swaps, and
//! the commit-row transition happens in the same atomic store unit as the
//! pointer upsert, so readers observe the old committed version or the
//! new one and nothing in between.
//!
//! Failure policy: validation failures roll the staged version back and
//! preserve LKG. Transient infrastructure failures are retried once with
//! jittered backoff; persistent failures record the attempt and preserve
//! LKG. Snapshot failures never block promotion.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde_json::Value;
use uuid::Uuid;

use crate::commit_log::{CommitLog, CommitLogError, CommitRecord};
use crate::config::PipelineConfig;
use crate::envelope::{
    http_status_at_write, lifecycle_at_write, LifecycleState, SafetyEnvelope, SafetyMeta,
};
use crate::identity::{DatasetId, DatasetIdentity, IdentityRegistry};
use crate::kv::{dataset_prefix, pointer_key, pointer_value, versioned_key, KvSurface};
use crate::object_store::{SnapshotDocument, SnapshotStore, SnapshotValidation};
use crate::observability::{Logger, MetricsRegistry};
use crate::readiness::ReadinessService;
use crate::rules::RuleTable;
use crate::schema::{SchemaError, SchemaErrorCode, SchemaRegistry};
use crate::validation::{SemanticReport, SemanticValidator, ValidationStatus};

use super::errors::{codes, IngestError, IngestResult};
use super::fetcher::{DatasetFetcher, FetchPayload};
use super::outcome::CommitOutcome;

enum StageError {
    /// A concurrent attempt claimed this version number
    VersionConflict,
    Failed(String),
}

/// Drives dataset ingestion end to end. The only writer of commit rows
/// and KV pointers.
pub struct IngestOrchestrator {
    config: Arc<PipelineConfig>,
    rules: Arc<RuleTable>,
    identities: Arc<IdentityRegistry>,
    schemas: Arc<SchemaRegistry>,
    commit_log: Arc<CommitLog>,
    kv: Arc<dyn KvSurface>,
    snapshots: Arc<SnapshotStore>,
    readiness: Arc<ReadinessService>,
    metrics: Arc<MetricsRegistry>,
}

impl IngestOrchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: Arc<PipelineConfig>,
        rules: Arc<RuleTable>,
        identities: Arc<IdentityRegistry>,
        schemas: Arc<SchemaRegistry>,
        commit_log: Arc<CommitLog>,
        kv: Arc<dyn KvSurface>,
        snapshots: Arc<SnapshotStore>,
        readiness: Arc<ReadinessService>,
        metrics: Arc<MetricsRegistry>,
    ) -> Self {
        Self {
            config,
            rules,
            identities,
            schemas,
            commit_log,
            kv,
            snapshots,
            readiness,
            metrics,
        }
    }

    /// Run one ingestion attempt for a dataset.
    pub async fn ingest(
        &self,
        identity: &DatasetIdentity,
        fetcher: &dyn DatasetFetcher,
        source: &str,
    ) -> IngestResult<CommitOutcome> {
        let normalized = identity.normalize(&self.config)?;
        let (dataset_id, canonical_identity) = normalized.compute_dataset_id();
        let attempt = Uuid::new_v4().to_string();

        self.metrics.increment_ingests_started();
        Logger::info(
            "ingest_started",
            &[
                ("attempt", &attempt),
                ("dataset_id", dataset_id.as_str()),
                ("source", source),
            ],
        );

        // Keep the registry row current; a tuple claimed by a different
        // id is a hard stop.
        self.identities.register(&normalized).await?;

        // Step 1: resolve the rule
        let Some(rule) = self.rules.get(&dataset_id).cloned() else {
            Logger::warn(
                "ingest_no_rule",
                &[("attempt", &attempt), ("dataset_id", dataset_id.as_str())],
            );
            return Ok(CommitOutcome::not_committed(
                dataset_id,
                None,
                0,
                503,
                LifecycleState::Unavailable,
                Some(ValidationStatus::Unavailable),
                false,
                "no semantic rule defined for dataset",
                codes::NO_RULE_DEFINED,
            ));
        };

        // Step 2: allocate a version and load the LKG candidate
        let mut version = self
            .commit_log
            .next_version(&dataset_id)
            .await
            .map_err(|e| IngestError::Store(e.to_string()))?;
        let lkg = self
            .commit_log
            .latest_committed(&dataset_id)
            .await
            .map_err(|e| IngestError::Store(e.to_string()))?;
        let has_prior = lkg.is_some();
        let previous_record_count = lkg.as_ref().map(|row| row.record_count);

        // Step 3: fetch under the operation deadline. Fetch errors never
        // touch KV or the pointer.
        let payload = match tokio::time::timeout(
            self.config.operation_deadline(),
            fetcher.fetch(&dataset_id, &normalized),
        )
        .await
        {
            Ok(Ok(payload)) => payload,
            Ok(Err(e)) => {
                return Ok(self
                    .fail_without_staging(
                        &dataset_id,
                        version,
                        previous_record_count,
                        lkg.as_ref(),
                        &e.to_string(),
                        codes::FETCH_FAILED,
                        source,
                        &attempt,
                    )
                    .await);
            }
            Err(_) => {
                return Ok(self
                    .fail_without_staging(
                        &dataset_id,
                        version,
                        previous_record_count,
                        lkg.as_ref(),
                        "fetch deadline exceeded",
                        codes::FETCH_FAILED,
                        source,
                        &attempt,
                    )
                    .await);
            }
        };

        // Step 4: semantic validation
        let today = Utc::now().date_naive();
        let report = SemanticValidator::classify(
            &dataset_id,
            &rule,
            &payload.records,
            today,
            payload.source_reported_unavailable,
        );
        let off_season = rule
            .season_window
            .map(|w| !w.contains(today))
            .unwrap_or(false);

        // Step 5: schema validation, only worth running on a
        // semantically valid batch
        let schema_result = if report.is_valid() {
            self.schemas
                .validate_batch(&dataset_id, &payload.records, payload.schema_version.as_deref())
                .await
        } else {
            Ok(None)
        };

        let (schema_version_info, schema_hash_info) = match &schema_result {
            Ok(Some(schema)) => (
                Some(schema.schema_version.clone()),
                Some(schema.schema_hash.clone()),
            ),
            _ => (payload.schema_version.clone(), None),
        };

        // Step 6: write-moment lifecycle and status
        let lifecycle = lifecycle_at_write(
            report.status,
            report.record_count,
            report.expected_min,
            has_prior,
            off_season,
        );

        // Step 7: stage the envelope and open the pending row. A version
        // conflict means a concurrent attempt won the number; re-allocate
        // once and restage.
        let prefix = dataset_prefix(&self.config.kv_prefix, &dataset_id);
        let mut staged = self
            .stage(
                &dataset_id,
                &normalized,
                &canonical_identity,
                &prefix,
                version,
                &payload,
                &report,
                lifecycle,
                &schema_version_info,
                &schema_hash_info,
                previous_record_count,
                source,
            )
            .await;
        if matches!(staged, Err(StageError::VersionConflict)) {
            version = self
                .commit_log
                .next_version(&dataset_id)
                .await
                .map_err(|e| IngestError::Store(e.to_string()))?;
            staged = self
                .stage(
                    &dataset_id,
                    &normalized,
                    &canonical_identity,
                    &prefix,
                    version,
                    &payload,
                    &report,
                    lifecycle,
                    &schema_version_info,
                    &schema_hash_info,
                    previous_record_count,
                    source,
                )
                .await;
        }
        let (versioned_blob_key, envelope) = match staged {
            Ok(staged) => staged,
            Err(stage_error) => {
                let reason = match stage_error {
                    StageError::Failed(reason) => reason,
                    StageError::VersionConflict => {
                        "version conflict persisted across re-allocation".to_string()
                    }
                };
                let is_serving_lkg = self.preserve_lkg(&dataset_id, lkg.as_ref(), &reason).await;
                self.metrics.increment_ingests_rolled_back();
                Logger::error(
                    "ingest_staging_failed",
                    &[
                        ("attempt", &attempt),
                        ("dataset_id", dataset_id.as_str()),
                        ("reason", &reason),
                    ],
                );
                return Ok(CommitOutcome::not_committed(
                    dataset_id,
                    Some(version),
                    report.record_count,
                    503,
                    if is_serving_lkg {
                        LifecycleState::Stale
                    } else {
                        LifecycleState::Unavailable
                    },
                    Some(report.status),
                    is_serving_lkg,
                    reason,
                    codes::STAGING_WRITE_FAILED,
                ));
            }
        };

        // Step 8: decide
        if report.is_valid() && schema_result.is_ok() {
            return Ok(self
                .promote(
                    &dataset_id,
                    &normalized,
                    &canonical_identity,
                    &prefix,
                    version,
                    &versioned_blob_key,
                    envelope,
                    &payload,
                    &report,
                    schema_version_info,
                    schema_hash_info,
                    lkg.as_ref(),
                    &attempt,
                )
                .await);
        }

        if let Err(schema_error) = schema_result {
            return Ok(self
                .reject_for_schema(
                    &dataset_id,
                    version,
                    &report,
                    schema_error,
                    lkg.as_ref(),
                    &attempt,
                )
                .await);
        }

        // Semantic validation was not `valid`
        Ok(self
            .reject_for_semantics(
                &dataset_id,
                version,
                &report,
                lifecycle,
                off_season,
                lkg.as_ref(),
                &attempt,
            )
            .await)
    }

    /// Roll pending rows past the reaper timeout back. Returns the swept
    /// count.
    pub async fn sweep_stale_pending(&self) -> IngestResult<usize> {
        let cutoff = Utc::now()
            - chrono::Duration::seconds(self.config.pending_reaper_timeout_seconds as i64);
        let swept = self
            .commit_log
            .sweep_stale_pending(cutoff)
            .await
            .map_err(|e| IngestError::Store(e.to_string()))?;

        if !swept.is_empty() {
            self.metrics.add_pending_reaped(swept.len() as u64);
            for row in &swept {
                Logger::warn(
                    "pending_commit_reaped",
                    &[
                        ("dataset_id", row.dataset_id.as_str()),
                        ("version", &row.version.to_string()),
                    ],
                );
            }
        }
        Ok(swept.len())
    }

    // --- pipeline stages ---

    #[allow(clippy::too_many_arguments)]
    async fn stage(
        &self,
        dataset_id: &DatasetId,
        identity: &DatasetIdentity,
        canonical_identity: &str,
        prefix: &str,
        version: u64,
        payload: &FetchPayload,
        report: &SemanticReport,
        lifecycle: LifecycleState,
        schema_version: &Option<String>,
        schema_hash: &Option<String>,
        previous_record_count: Option<usize>,
        source: &str,
    ) -> Result<(String, SafetyEnvelope<Value>), StageError> {
        let key = versioned_key(prefix, version);

        let meta = SafetyMeta {
            http_status_at_write: http_status_at_write(lifecycle),
            lifecycle_state: lifecycle,
            record_count: report.record_count,
            validation_status: report.status,
            dataset_id: dataset_id.clone(),
            canonical_identity: canonical_identity.to_string(),
            identity: identity.clone(),
            expected_min_count: report.expected_min,
            written_at: Utc::now(),
            version,
            is_lkg: false,
            lkg_reason: None,
            schema_version: schema_version.clone(),
            schema_hash: schema_hash.clone(),
            committed_at: None,
        };
        let envelope = SafetyEnvelope::new(payload.records.clone(), meta);
        let raw = envelope
            .to_json()
            .map_err(|e| StageError::Failed(format!("envelope serialization: {}", e)))?;

        self.kv_put_with_retry(&key, raw, Some(self.config.pending_ttl()))
            .await
            .map_err(StageError::Failed)?;

        let row = CommitRecord::pending(
            dataset_id.clone(),
            version,
            report.record_count,
            previous_record_count,
            report.status,
            report.schema_errors.clone().unwrap_or_default(),
            key.clone(),
            source,
        )
        .with_schema(schema_version.clone(), schema_hash.clone());

        match self.commit_log.create_pending_commit(row).await {
            Ok(()) => Ok((key, envelope)),
            Err(CommitLogError::DuplicateVersion { .. }) => Err(StageError::VersionConflict),
            Err(e) => Err(StageError::Failed(e.to_string())),
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn promote(
        &self,
        dataset_id: &DatasetId,
        identity: &DatasetIdentity,
        canonical_identity: &str,
        prefix: &str,
        version: u64,
        versioned_blob_key: &str,
        envelope: SafetyEnvelope<Value>,
        payload: &FetchPayload,
        report: &SemanticReport,
        schema_version: Option<String>,
        schema_hash: Option<String>,
        lkg: Option<&CommitRecord>,
        attempt: &str,
    ) -> CommitOutcome {
        let committed_at = Utc::now();

        if let Err(reason) = self
            .promote_with_retry(dataset_id, version, schema_version, schema_hash, committed_at)
            .await
        {
            let _ = self
                .commit_log
                .rollback_commit(dataset_id, version, &reason)
                .await;
            let is_serving_lkg = self.preserve_lkg(dataset_id, lkg, &reason).await;
            self.metrics.increment_ingests_rolled_back();
            Logger::error(
                "ingest_promote_failed",
                &[
                    ("attempt", attempt),
                    ("dataset_id", dataset_id.as_str()),
                    ("reason", &reason),
                    ("version", &version.to_string()),
                ],
            );
            return CommitOutcome::not_committed(
                dataset_id.clone(),
                Some(version),
                report.record_count,
                503,
                if is_serving_lkg {
                    LifecycleState::Stale
                } else {
                    LifecycleState::Unavailable
                },
                Some(report.status),
                is_serving_lkg,
                reason,
                codes::PROMOTE_FAILED,
            );
        }

        // Re-write the blob with committed_at stamped and the extended
        // committed TTL, then swap the pointer.
        let committed_envelope = envelope.committed(committed_at);
        match committed_envelope.to_json() {
            Ok(raw) => {
                if let Err(reason) = self
                    .kv_put_with_retry(
                        versioned_blob_key,
                        raw,
                        Some(self.config.committed_ttl()),
                    )
                    .await
                {
                    // The staged blob still serves until its pending TTL
                    // lapses; the snapshot covers recovery after that.
                    Logger::warn(
                        "committed_blob_rewrite_failed",
                        &[
                            ("dataset_id", dataset_id.as_str()),
                            ("reason", &reason),
                            ("version", &version.to_string()),
                        ],
                    );
                }
            }
            Err(e) => {
                Logger::warn(
                    "committed_blob_rewrite_failed",
                    &[
                        ("dataset_id", dataset_id.as_str()),
                        ("reason", &e.to_string()),
                        ("version", &version.to_string()),
                    ],
                );
            }
        }

        if let Err(reason) = self
            .kv_put_with_retry(&pointer_key(prefix), pointer_value(version), None)
            .await
        {
            // Commit log names the new version; the mirror still points
            // at the old blob. Reads stay consistent on the old version
            // until the next successful swap.
            let _ = self.readiness.mark_degraded(dataset_id.as_str(), &reason).await;
            self.metrics.increment_ingests_rolled_back();
            Logger::error(
                "pointer_swap_failed",
                &[
                    ("attempt", attempt),
                    ("dataset_id", dataset_id.as_str()),
                    ("reason", &reason),
                    ("version", &version.to_string()),
                ],
            );
            return CommitOutcome::not_committed(
                dataset_id.clone(),
                Some(version),
                report.record_count,
                503,
                LifecycleState::Stale,
                Some(report.status),
                false,
                reason,
                codes::PROMOTE_FAILED,
            );
        }

        if let Err(e) = self.readiness.mark_live_ingestion(dataset_id.as_str()).await {
            Logger::warn(
                "readiness_transition_failed",
                &[("dataset_id", dataset_id.as_str()), ("reason", &e.to_string())],
            );
        }

        // Snapshot for cold-start recovery; never blocks the commit
        let document = SnapshotDocument {
            dataset_id: dataset_id.clone(),
            identity: identity.clone(),
            canonical_identity: canonical_identity.to_string(),
            version,
            data: payload.records.clone(),
            validation: SnapshotValidation {
                status: report.status,
                record_count: report.record_count,
                expected_min: report.expected_min,
            },
            snapshot_at: committed_at,
        };
        match self.snapshots.write(&document).await {
            Ok(()) => self.metrics.increment_snapshots_written(),
            Err(e) => {
                self.metrics.increment_snapshot_failures();
                Logger::warn(
                    "snapshot_write_failed",
                    &[
                        ("code", codes::SNAPSHOT_FAILED),
                        ("dataset_id", dataset_id.as_str()),
                        ("reason", &e.to_string()),
                    ],
                );
            }
        }

        // Cleanup: keep the current and at least the previous version
        // live under versioned keys
        if version > self.config.versions_to_retain {
            let stale_version = version - self.config.versions_to_retain;
            let _ = self.kv.delete(&versioned_key(prefix, stale_version)).await;
        }

        self.metrics.increment_ingests_committed();
        Logger::info(
            "ingest_committed",
            &[
                ("attempt", attempt),
                ("dataset_id", dataset_id.as_str()),
                ("record_count", &report.record_count.to_string()),
                ("version", &version.to_string()),
            ],
        );

        CommitOutcome::committed(
            dataset_id.clone(),
            version,
            report.record_count,
            200,
            LifecycleState::Live,
        )
    }

    async fn reject_for_schema(
        &self,
        dataset_id: &DatasetId,
        version: u64,
        report: &SemanticReport,
        schema_error: SchemaError,
        lkg: Option<&CommitRecord>,
        attempt: &str,
    ) -> CommitOutcome {
        let reason = schema_error.to_string();
        let _ = self
            .commit_log
            .rollback_commit(dataset_id, version, &reason)
            .await;
        let is_serving_lkg = self.preserve_lkg(dataset_id, lkg, &reason).await;
        self.metrics.increment_ingests_rolled_back();

        let code = match schema_error.code() {
            SchemaErrorCode::SchemaIncompatible | SchemaErrorCode::SchemaSunset => {
                codes::SCHEMA_INCOMPATIBLE
            }
            _ => codes::INVARIANT_VIOLATION,
        };
        Logger::warn(
            "ingest_schema_rejected",
            &[
                ("attempt", attempt),
                ("code", code),
                ("dataset_id", dataset_id.as_str()),
                ("reason", &reason),
                ("version", &version.to_string()),
            ],
        );

        CommitOutcome::not_committed(
            dataset_id.clone(),
            Some(version),
            report.record_count,
            422,
            if is_serving_lkg {
                LifecycleState::Stale
            } else {
                LifecycleState::Unavailable
            },
            Some(ValidationStatus::Invalid),
            is_serving_lkg,
            reason,
            code,
        )
    }

    #[allow(clippy::too_many_arguments)]
    async fn reject_for_semantics(
        &self,
        dataset_id: &DatasetId,
        version: u64,
        report: &SemanticReport,
        lifecycle: LifecycleState,
        off_season: bool,
        lkg: Option<&CommitRecord>,
        attempt: &str,
    ) -> CommitOutcome {
        let reason = report
            .reason
            .clone()
            .unwrap_or_else(|| "validation did not pass".to_string());
        let _ = self
            .commit_log
            .rollback_commit(dataset_id, version, &reason)
            .await;
        self.metrics.increment_ingests_rolled_back();

        if report.is_unavailable() && off_season {
            // Off-season is the expected quiet state: no LKG
            // displacement, no readiness transition downward.
            Logger::info(
                "ingest_off_season",
                &[
                    ("attempt", attempt),
                    ("dataset_id", dataset_id.as_str()),
                    ("version", &version.to_string()),
                ],
            );
            let http_status = if report.record_count == 0 { 204 } else { 503 };
            return CommitOutcome::skipped(
                dataset_id.clone(),
                Some(version),
                report.record_count,
                http_status,
                lifecycle,
                reason,
                codes::OFF_SEASON,
            );
        }

        let is_serving_lkg = self.preserve_lkg(dataset_id, lkg, &reason).await;

        let code = if report.is_unavailable() {
            codes::SOURCE_UNAVAILABLE
        } else {
            codes::SEMANTIC_INVALID
        };
        Logger::warn(
            "ingest_rejected",
            &[
                ("attempt", attempt),
                ("code", code),
                ("dataset_id", dataset_id.as_str()),
                ("reason", &reason),
                ("version", &version.to_string()),
            ],
        );

        CommitOutcome::not_committed(
            dataset_id.clone(),
            Some(version),
            report.record_count,
            503,
            if is_serving_lkg {
                LifecycleState::Stale
            } else {
                LifecycleState::Unavailable
            },
            Some(report.status),
            is_serving_lkg,
            reason,
            code,
        )
    }

    // --- failure plumbing ---

    /// Fetch-stage failure: record the attempt in the commit log, leave
    /// KV and the pointer untouched, preserve LKG.
    #[allow(clippy::too_many_arguments)]
    async fn fail_without_staging(
        &self,
        dataset_id: &DatasetId,
        version: u64,
        previous_record_count: Option<usize>,
        lkg: Option<&CommitRecord>,
        reason: &str,
        code: &str,
        source: &str,
        attempt: &str,
    ) -> CommitOutcome {
        self.metrics.increment_fetch_failures();

        let row = CommitRecord::pending(
            dataset_id.clone(),
            version,
            0,
            previous_record_count,
            ValidationStatus::Unavailable,
            vec![],
            String::new(),
            source,
        );
        if self.commit_log.create_pending_commit(row).await.is_ok() {
            let _ = self
                .commit_log
                .rollback_commit(dataset_id, version, reason)
                .await;
        }

        let is_serving_lkg = self.preserve_lkg(dataset_id, lkg, reason).await;
        Logger::error(
            "ingest_fetch_failed",
            &[
                ("attempt", attempt),
                ("code", code),
                ("dataset_id", dataset_id.as_str()),
                ("reason", reason),
            ],
        );

        CommitOutcome::not_committed(
            dataset_id.clone(),
            Some(version),
            0,
            503,
            if is_serving_lkg {
                LifecycleState::Stale
            } else {
                LifecycleState::Unavailable
            },
            Some(ValidationStatus::Unavailable),
            is_serving_lkg,
            reason,
            code,
        )
    }

    /// Flag LKG and degrade readiness when good data exists; mark the
    /// scope unavailable otherwise. Returns whether LKG is now serving.
    async fn preserve_lkg(
        &self,
        dataset_id: &DatasetId,
        lkg: Option<&CommitRecord>,
        reason: &str,
    ) -> bool {
        match lkg {
            Some(record) => {
                match self
                    .commit_log
                    .mark_serving_lkg(dataset_id, record.version, reason)
                    .await
                {
                    Ok(_) => {
                        self.metrics.increment_lkg_activations();
                        Logger::warn(
                            "lkg_activated",
                            &[
                                ("dataset_id", dataset_id.as_str()),
                                ("lkg_version", &record.version.to_string()),
                                ("reason", reason),
                            ],
                        );
                    }
                    Err(e) => {
                        Logger::error(
                            "lkg_mark_failed",
                            &[
                                ("dataset_id", dataset_id.as_str()),
                                ("reason", &e.to_string()),
                            ],
                        );
                    }
                }
                if let Err(e) = self.readiness.mark_degraded(dataset_id.as_str(), reason).await {
                    Logger::warn(
                        "readiness_transition_failed",
                        &[
                            ("dataset_id", dataset_id.as_str()),
                            ("reason", &e.to_string()),
                        ],
                    );
                }
                true
            }
            None => {
                if let Err(e) = self
                    .readiness
                    .mark_unavailable_on_failure(dataset_id.as_str(), reason)
                    .await
                {
                    Logger::warn(
                        "readiness_transition_failed",
                        &[
                            ("dataset_id", dataset_id.as_str()),
                            ("reason", &e.to_string()),
                        ],
                    );
                }
                false
            }
        }
    }

    // --- retry plumbing ---

    async fn kv_put_with_retry(
        &self,
        key: &str,
        value: String,
        ttl: Option<Duration>,
    ) -> Result<(), String> {
        let deadline = self.config.operation_deadline();

        match tokio::time::timeout(deadline, self.kv.put(key, value.clone(), ttl)).await {
            Ok(Ok(())) => return Ok(()),
            Ok(Err(e)) if !e.is_transient() => return Err(e.to_string()),
            Ok(Err(_)) | Err(_) => {}
        }

        tokio::time::sleep(jittered_backoff()).await;

        match tokio::time::timeout(deadline, self.kv.put(key, value, ttl)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => Err(format!("kv put '{}' exceeded deadline", key)),
        }
    }

    async fn promote_with_retry(
        &self,
        dataset_id: &DatasetId,
        version: u64,
        schema_version: Option<String>,
        schema_hash: Option<String>,
        committed_at: DateTime<Utc>,
    ) -> Result<(), String> {
        match self
            .commit_log
            .promote_commit(
                dataset_id,
                version,
                schema_version.clone(),
                schema_hash.clone(),
                committed_at,
            )
            .await
        {
            Ok(_) => return Ok(()),
            Err(CommitLogError::Store(_)) => {}
            Err(e) => return Err(e.to_string()),
        }

        tokio::time::sleep(jittered_backoff()).await;

        self.commit_log
            .promote_commit(dataset_id, version, schema_version, schema_hash, committed_at)
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}

fn jittered_backoff() -> Duration {
    Duration::from_millis(rand::thread_rng().gen_range(25..125))
}
