//! Readiness checks, transitions, and snapshot recovery

use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::identity::{DatasetId, DatasetIdentity};
use crate::metadata::MetadataStore;
use crate::object_store::SnapshotStore;

use super::errors::{ReadinessError, ReadinessResult};
use super::state::{ReadinessRecord, ReadinessState};

/// What a read is allowed to do right now
#[derive(Debug, Clone)]
pub struct ReadinessCheck {
    pub state: ReadinessState,
    pub is_ready: bool,
    pub allow_kv_read: bool,
    pub allow_cache: bool,
    /// One of 200, 202, 503
    pub http_status: u16,
    pub reason: Option<String>,
}

impl ReadinessCheck {
    fn for_state(state: ReadinessState, reason: Option<String>) -> Self {
        match state {
            ReadinessState::Ready => Self {
                state,
                is_ready: true,
                allow_kv_read: true,
                allow_cache: true,
                http_status: 200,
                reason,
            },
            ReadinessState::Initializing => Self {
                state,
                is_ready: false,
                allow_kv_read: false,
                allow_cache: false,
                http_status: 202,
                reason,
            },
            ReadinessState::Degraded => Self {
                state,
                is_ready: false,
                allow_kv_read: true,
                allow_cache: false,
                http_status: 503,
                reason,
            },
            ReadinessState::Unavailable => Self {
                state,
                is_ready: false,
                allow_kv_read: false,
                allow_cache: false,
                http_status: 503,
                reason,
            },
        }
    }
}

/// Readiness service over the metadata store
pub struct ReadinessService {
    store: Arc<dyn MetadataStore>,
}

impl ReadinessService {
    pub fn new(store: Arc<dyn MetadataStore>) -> Self {
        Self { store }
    }

    /// Check a scope. Never fails: a missing row behaves as
    /// `initializing`; an unreachable metadata store behaves as
    /// `degraded` so reads may still attempt LKG but must not be cached.
    pub async fn check(&self, scope: &str) -> ReadinessCheck {
        match self.store.readiness(scope).await {
            Ok(Some(record)) => {
                ReadinessCheck::for_state(record.readiness_state, record.reason.clone())
            }
            Ok(None) => ReadinessCheck::for_state(
                ReadinessState::Initializing,
                Some("no readiness record; cold start".into()),
            ),
            Err(e) => ReadinessCheck::for_state(
                ReadinessState::Degraded,
                Some(format!("metadata store unreachable: {}", e)),
            ),
        }
    }

    /// Raw record for a scope (admin/status surface).
    pub async fn record(&self, scope: &str) -> ReadinessResult<Option<ReadinessRecord>> {
        self.store
            .readiness(scope)
            .await
            .map_err(|e| ReadinessError::store(e.to_string()))
    }

    /// A successful commit: transition to `ready` and stamp
    /// `live_ingestion_at`.
    pub async fn mark_live_ingestion(&self, scope: &str) -> ReadinessResult<()> {
        let mut record = self.load_or_init(scope).await?;
        record.transition(ReadinessState::Ready, None)?;
        record.live_ingestion_at = Some(Utc::now());
        self.save(record).await
    }

    /// A fetch/validate/commit failure while good data exists.
    pub async fn mark_degraded(&self, scope: &str, reason: &str) -> ReadinessResult<()> {
        let mut record = self.load_or_init(scope).await?;
        record.transition(ReadinessState::Degraded, Some(reason.to_string()))?;
        self.save(record).await
    }

    /// A failure with nothing to fall back to. Only meaningful from
    /// `initializing`; later states keep their LKG and degrade instead.
    /// Idempotent when the scope is already unavailable.
    pub async fn mark_unavailable_on_failure(
        &self,
        scope: &str,
        reason: &str,
    ) -> ReadinessResult<()> {
        let mut record = self.load_or_init(scope).await?;
        if record.readiness_state == ReadinessState::Unavailable {
            return Ok(());
        }
        record.transition(ReadinessState::Unavailable, Some(reason.to_string()))?;
        self.save(record).await
    }

    /// Admin: take the scope out of service.
    pub async fn admin_unavailable(&self, scope: &str, reason: &str) -> ReadinessResult<()> {
        let mut record = self.load_or_init(scope).await?;
        record.admin_transition(ReadinessState::Unavailable, Some(reason.to_string()));
        self.save(record).await
    }

    /// Admin: reset the scope to cold start.
    pub async fn admin_reset(&self, scope: &str) -> ReadinessResult<()> {
        let mut record = self.load_or_init(scope).await?;
        record.admin_transition(ReadinessState::Initializing, Some("admin reset".into()));
        record.snapshot_validated_at = None;
        record.live_ingestion_at = None;
        self.save(record).await
    }

    /// Cold-start recovery: when the scope is `initializing` and a
    /// structurally valid object-store snapshot younger than `max_age`
    /// exists, transition straight to `ready` and stamp
    /// `snapshot_validated_at`.
    ///
    /// Returns the recovered snapshot when the transition happened.
    pub async fn try_snapshot_recovery(
        &self,
        dataset_id: &DatasetId,
        expected: &DatasetIdentity,
        snapshots: &SnapshotStore,
        max_age: Duration,
    ) -> ReadinessResult<Option<crate::object_store::SnapshotDocument>> {
        let scope = dataset_id.as_str();
        let state = match self.store.readiness(scope).await {
            Ok(Some(record)) => record.readiness_state,
            Ok(None) => ReadinessState::Initializing,
            Err(e) => return Err(ReadinessError::store(e.to_string())),
        };
        if state != ReadinessState::Initializing {
            return Ok(None);
        }

        let Ok(Some(snapshot)) = snapshots.latest(dataset_id).await else {
            return Ok(None);
        };
        if snapshot.validate_structure(expected).is_err() {
            return Ok(None);
        }
        if snapshot.age(Utc::now()) > max_age {
            return Ok(None);
        }

        let mut record = self.load_or_init(scope).await?;
        record.transition(
            ReadinessState::Ready,
            Some("recovered from object-store snapshot".into()),
        )?;
        record.snapshot_validated_at = Some(Utc::now());
        self.save(record).await?;
        Ok(Some(snapshot))
    }

    async fn load_or_init(&self, scope: &str) -> ReadinessResult<ReadinessRecord> {
        match self.store.readiness(scope).await {
            Ok(Some(record)) => Ok(record),
            Ok(None) => Ok(ReadinessRecord::initializing(scope)),
            Err(e) => Err(ReadinessError::store(e.to_string())),
        }
    }

    async fn save(&self, record: ReadinessRecord) -> ReadinessResult<()> {
        self.store
            .upsert_readiness(record)
            .await
            .map_err(|e| ReadinessError::store(e.to_string()))
    }
}
