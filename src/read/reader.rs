//! The validated read path
//!
//! Order of operations:
//! 1. readiness gate (with cold-start snapshot recovery)
//! 2. pointer chase: KV pointer, then last committed key from the log
//! 3. envelope parse, legacy fallback
//! 4. identity assertion
//! 5. wire mapping from persisted fields, renderability attached
//! 6. object-store fallback on KV miss or parse failure
//! 7. degraded readiness forces `no-store` + 503 even when a blob serves

use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::commit_log::CommitLog;
use crate::config::PipelineConfig;
use crate::envelope::{parse_payload, LifecycleState, ParsedPayload};
use crate::identity::{DatasetId, DatasetIdentity};
use crate::ingest::codes;
use crate::kv::{dataset_prefix, parse_pointer, pointer_key, versioned_key, KvSurface};
use crate::object_store::{SnapshotDocument, SnapshotStore};
use crate::observability::{Logger, MetricsRegistry};
use crate::readiness::{ReadinessCheck, ReadinessService, ReadinessState};
use crate::schema::{DatasetSchema, SchemaRegistry};
use crate::serve::{derive_renderability, map_wire, ApiError, Renderability, WireDirective};
use crate::validation::ValidationStatus;

use super::outcome::{ReadOutcome, ReadSource};

/// Validated reader over the persisted surfaces
pub struct ValidatedReader {
    config: Arc<PipelineConfig>,
    commit_log: Arc<CommitLog>,
    schemas: Arc<SchemaRegistry>,
    kv: Arc<dyn KvSurface>,
    snapshots: Arc<SnapshotStore>,
    readiness: Arc<ReadinessService>,
    metrics: Arc<MetricsRegistry>,
}

impl ValidatedReader {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: Arc<PipelineConfig>,
        commit_log: Arc<CommitLog>,
        schemas: Arc<SchemaRegistry>,
        kv: Arc<dyn KvSurface>,
        snapshots: Arc<SnapshotStore>,
        readiness: Arc<ReadinessService>,
        metrics: Arc<MetricsRegistry>,
    ) -> Self {
        Self {
            config,
            commit_log,
            schemas,
            kv,
            snapshots,
            readiness,
            metrics,
        }
    }

    /// Serve one dataset read. Never fails: every branch produces a
    /// wire-ready outcome.
    pub async fn read(&self, identity: &DatasetIdentity) -> ReadOutcome {
        let normalized = match identity.normalize(&self.config) {
            Ok(normalized) => normalized,
            Err(e) => {
                return ReadOutcome {
                    dataset_id: None,
                    directive: no_store_directive(e.status_code(), None),
                    lifecycle: LifecycleState::Unavailable,
                    validation: None,
                    renderability: unknown_renderability(),
                    data: None,
                    record_count: 0,
                    version: None,
                    source: ReadSource::None,
                    is_serving_lkg: false,
                    legacy: false,
                    error: Some(ApiError {
                        code: e.code().to_string(),
                        message: e.to_string(),
                    }),
                };
            }
        };
        let (dataset_id, _) = normalized.compute_dataset_id();

        // Step 1: readiness gate
        let check = self.readiness.check(dataset_id.as_str()).await;
        if !check.allow_kv_read {
            if check.state == ReadinessState::Initializing {
                // Cold start: a fresh enough snapshot can bring the scope
                // straight to ready.
                let max_age = Duration::seconds(self.config.snapshot_max_age_seconds as i64);
                if let Ok(Some(snapshot)) = self
                    .readiness
                    .try_snapshot_recovery(&dataset_id, &normalized, &self.snapshots, max_age)
                    .await
                {
                    self.metrics.increment_snapshot_recoveries();
                    Logger::info(
                        "snapshot_recovery",
                        &[
                            ("dataset_id", dataset_id.as_str()),
                            ("version", &snapshot.version.to_string()),
                        ],
                    );
                    return self
                        .serve_snapshot(&dataset_id, &normalized, snapshot, &check)
                        .await;
                }
            }

            self.metrics.increment_reads_blocked();
            let lifecycle = match check.state {
                ReadinessState::Initializing => LifecycleState::Initializing,
                _ => LifecycleState::Unavailable,
            };
            let retry_after = Some(if check.http_status == 202 { 30 } else { 60 });
            return ReadOutcome {
                dataset_id: Some(dataset_id),
                directive: no_store_directive(check.http_status, retry_after),
                lifecycle,
                validation: None,
                renderability: unknown_renderability(),
                data: None,
                record_count: 0,
                version: None,
                source: ReadSource::None,
                is_serving_lkg: false,
                legacy: false,
                error: Some(ApiError {
                    code: codes::READINESS_BLOCKED.to_string(),
                    message: check
                        .reason
                        .clone()
                        .unwrap_or_else(|| format!("scope is {}", check.state)),
                }),
            };
        }

        // Step 2: pointer chase
        let prefix = dataset_prefix(&self.config.kv_prefix, &dataset_id);
        let version = match self.resolve_version(&dataset_id, &prefix).await {
            Some(version) => version,
            None => {
                // Nothing committed anywhere the KV mirror knows about
                return self
                    .snapshot_fallback(&dataset_id, &normalized, &check, None)
                    .await;
            }
        };

        // Step 3: versioned blob
        let raw = match self.kv.get(&versioned_key(&prefix, version)).await {
            Ok(Some(raw)) => raw,
            Ok(None) | Err(_) => {
                return self
                    .snapshot_fallback(&dataset_id, &normalized, &check, Some(version))
                    .await;
            }
        };

        match parse_payload(&raw) {
            Ok(ParsedPayload::Enveloped(envelope)) => {
                // Step 4: identity assertion
                if let Err(violation) = envelope.assert_identity(&normalized) {
                    self.metrics.increment_identity_violations();
                    Logger::error(
                        "identity_violation",
                        &[
                            ("dataset_id", dataset_id.as_str()),
                            ("detail", &violation.to_string()),
                            ("version", &version.to_string()),
                        ],
                    );
                    return ReadOutcome {
                        dataset_id: Some(dataset_id),
                        directive: no_store_directive(503, Some(60)),
                        lifecycle: LifecycleState::Unavailable,
                        validation: None,
                        renderability: unknown_renderability(),
                        data: None,
                        record_count: 0,
                        version: Some(version),
                        source: ReadSource::Kv,
                        is_serving_lkg: false,
                        legacy: false,
                        error: Some(ApiError {
                            code: codes::IDENTITY_VIOLATION.to_string(),
                            message: violation.to_string(),
                        }),
                    };
                }

                // Step 5: wire mapping from persisted fields
                let pointer = self.commit_log.current_pointer(&dataset_id).await.ok().flatten();
                let is_serving_lkg = pointer
                    .as_ref()
                    .map(|p| p.is_serving_lkg)
                    .unwrap_or(false);
                let lifecycle = if is_serving_lkg {
                    LifecycleState::Stale
                } else {
                    envelope.meta.lifecycle_state
                };
                let validation = envelope.meta.validation_status;

                let active = self.active_schema(&dataset_id).await;
                let renderability = derive_renderability(
                    active.as_ref(),
                    envelope.meta.schema_version.as_deref(),
                );

                // Renderability is informational only; the directive is
                // derived from lifecycle and validation alone
                let mut directive = map_wire(lifecycle, Some(validation));
                // Step 7: degraded readiness forces no-store + 503
                if check.state == ReadinessState::Degraded {
                    directive = no_store_directive(503, Some(60));
                }

                self.metrics.increment_reads_served();
                if directive.cache_eligible {
                    self.metrics.increment_cache_eligible_responses();
                }

                let record_count = envelope.meta.record_count;
                ReadOutcome {
                    dataset_id: Some(dataset_id),
                    directive,
                    lifecycle,
                    validation: Some(validation),
                    renderability,
                    data: Some(envelope.data),
                    record_count,
                    version: Some(version),
                    source: ReadSource::Kv,
                    is_serving_lkg,
                    legacy: false,
                    error: None,
                }
            }
            Ok(ParsedPayload::Legacy(data)) => {
                // Legacy payloads serve as stale until re-ingested
                self.metrics.increment_legacy_envelopes();
                self.metrics.increment_reads_served();
                Logger::warn(
                    "legacy_envelope_served",
                    &[
                        ("dataset_id", dataset_id.as_str()),
                        ("version", &version.to_string()),
                    ],
                );
                let record_count = data.len();
                ReadOutcome {
                    dataset_id: Some(dataset_id),
                    directive: no_store_directive(503, Some(60)),
                    lifecycle: LifecycleState::Stale,
                    validation: None,
                    renderability: unknown_renderability(),
                    data: Some(data),
                    record_count,
                    version: Some(version),
                    source: ReadSource::Kv,
                    is_serving_lkg: false,
                    legacy: true,
                    error: Some(ApiError {
                        code: codes::LEGACY_ENVELOPE.to_string(),
                        message: "payload lacks safety metadata; re-ingest to refresh".into(),
                    }),
                }
            }
            Err(_) => {
                // Step 6: parse failure falls back to the object store
                self.snapshot_fallback(&dataset_id, &normalized, &check, Some(version))
                    .await
            }
        }
    }

    /// KV pointer first, then the last committed version from the log.
    async fn resolve_version(&self, dataset_id: &DatasetId, prefix: &str) -> Option<u64> {
        if let Ok(Some(value)) = self.kv.get(&pointer_key(prefix)).await {
            if let Some(version) = parse_pointer(&value) {
                return Some(version);
            }
        }
        match self.commit_log.latest_committed(dataset_id).await {
            Ok(Some(row)) => Some(row.version),
            _ => None,
        }
    }

    async fn active_schema(&self, dataset_id: &DatasetId) -> Option<DatasetSchema> {
        self.schemas.active(dataset_id).await.ok().flatten()
    }

    /// Object-store fallback: `latest`, then the last committed version
    /// key.
    async fn snapshot_fallback(
        &self,
        dataset_id: &DatasetId,
        expected: &DatasetIdentity,
        check: &ReadinessCheck,
        version_hint: Option<u64>,
    ) -> ReadOutcome {
        let snapshot = match self.snapshots.latest(dataset_id).await {
            Ok(Some(snapshot)) => Some(snapshot),
            _ => match version_hint {
                Some(version) => self
                    .snapshots
                    .version(dataset_id, version)
                    .await
                    .ok()
                    .flatten(),
                None => None,
            },
        };

        let Some(snapshot) = snapshot else {
            self.metrics.increment_reads_blocked();
            return ReadOutcome {
                dataset_id: Some(dataset_id.clone()),
                directive: no_store_directive(503, Some(60)),
                lifecycle: LifecycleState::Unavailable,
                validation: None,
                renderability: unknown_renderability(),
                data: None,
                record_count: 0,
                version: version_hint,
                source: ReadSource::None,
                is_serving_lkg: false,
                legacy: false,
                error: Some(ApiError {
                    code: "NO_SERVABLE_DATA".to_string(),
                    message: "no KV payload and no object-store snapshot".into(),
                }),
            };
        };

        self.metrics.increment_object_store_fallbacks();
        self.serve_snapshot(dataset_id, expected, snapshot, check).await
    }

    async fn serve_snapshot(
        &self,
        dataset_id: &DatasetId,
        expected: &DatasetIdentity,
        snapshot: SnapshotDocument,
        check: &ReadinessCheck,
    ) -> ReadOutcome {
        if let Err(reason) = snapshot.validate_structure(expected) {
            // Defies its own summary; do not serve it
            return ReadOutcome {
                dataset_id: Some(dataset_id.clone()),
                directive: no_store_directive(503, Some(60)),
                lifecycle: LifecycleState::Unavailable,
                validation: None,
                renderability: unknown_renderability(),
                data: None,
                record_count: 0,
                version: Some(snapshot.version),
                source: ReadSource::ObjectStore,
                is_serving_lkg: false,
                legacy: false,
                error: Some(ApiError {
                    code: "SNAPSHOT_MALFORMED".to_string(),
                    message: reason,
                }),
            };
        }

        let max_age = Duration::seconds(self.config.snapshot_max_age_seconds as i64);
        let fresh = snapshot.age(Utc::now()) <= max_age;
        let lifecycle = if fresh && snapshot.validation.status == ValidationStatus::Valid {
            LifecycleState::Live
        } else {
            LifecycleState::Stale
        };

        let mut directive = map_wire(lifecycle, Some(snapshot.validation.status));
        if check.state == ReadinessState::Degraded {
            directive = no_store_directive(503, Some(60));
        }

        self.metrics.increment_reads_served();
        if directive.cache_eligible {
            self.metrics.increment_cache_eligible_responses();
        }

        let record_count = snapshot.data.len();
        ReadOutcome {
            dataset_id: Some(dataset_id.clone()),
            directive,
            lifecycle,
            validation: Some(snapshot.validation.status),
            renderability: unknown_renderability(),
            data: Some(snapshot.data),
            record_count,
            version: Some(snapshot.version),
            source: ReadSource::ObjectStore,
            is_serving_lkg: false,
            legacy: false,
            error: None,
        }
    }
}

fn no_store_directive(http_status: u16, retry_after: Option<u32>) -> WireDirective {
    WireDirective {
        http_status,
        cache_control: "no-store".into(),
        retry_after,
        cache_eligible: false,
        ttl_seconds: 0,
    }
}

fn unknown_renderability() -> Renderability {
    derive_renderability(None, None)
}
