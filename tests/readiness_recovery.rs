//! Readiness gating and cold-start recovery
//!
//! Off-season ingestion is a quiet no-op, cold starts answer 202 until
//! data exists, a fresh object-store snapshot short-circuits
//! initializing straight to ready, and admin transitions gate reads.

mod support;

use chrono::{Duration, Utc};
use serde_json::json;
use statgate::envelope::LifecycleState;
use statgate::object_store::{SnapshotDocument, SnapshotValidation};
use statgate::read::ReadSource;
use statgate::readiness::ReadinessState;
use statgate::validation::ValidationStatus;
use support::{
    config_with_rule, dataset_id, identity, off_season_window, records, Harness,
};

/// Off-season ingestion of zero records: 204 empty_valid, readiness not
/// downgraded, no LKG flip.
#[tokio::test]
async fn test_off_season_zero_records() {
    let harness = Harness::new(config_with_rule(25, Some(off_season_window())));

    let outcome = harness.push(vec![]).await;
    assert!(outcome.success);
    assert!(!outcome.committed);
    assert_eq!(outcome.http_status, 204);
    assert_eq!(outcome.lifecycle, LifecycleState::EmptyValid);
    assert!(!outcome.is_serving_lkg);
    assert_eq!(outcome.error_code.as_deref(), Some("OFF_SEASON"));

    // No readiness transition downward
    let record = harness
        .pipeline
        .readiness
        .record(dataset_id().as_str())
        .await
        .unwrap();
    assert!(record.is_none());
}

/// An off-season ingestion never displaces a committed version.
#[tokio::test]
async fn test_off_season_does_not_displace_lkg() {
    // Commit in a season-less configuration, then ingest through a
    // pipeline whose rule is currently off-season, over the same stores.
    let harness = Harness::new(config_with_rule(25, None));
    harness.push(records(25)).await;

    let off_season = harness.sibling(config_with_rule(25, Some(off_season_window())));
    let fetcher = statgate::ingest::FixtureFetcher::new(
        statgate::ingest::FetchPayload::records(vec![]),
    );
    let outcome = off_season
        .orchestrator
        .ingest(&identity(), &fetcher, "test")
        .await
        .unwrap();

    assert!(!outcome.committed);
    assert_eq!(outcome.http_status, 204);

    let pointer = harness
        .pipeline
        .commit_log
        .current_pointer(&dataset_id())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(pointer.current_version, 1);
    assert!(!pointer.is_serving_lkg);

    assert_eq!(
        harness.pipeline.readiness.check(dataset_id().as_str()).await.state,
        ReadinessState::Ready
    );
}

/// Cold start with no snapshot: reads answer 202 no-store with a retry
/// hint.
#[tokio::test]
async fn test_cold_start_read_is_202() {
    let harness = Harness::new(config_with_rule(25, None));

    let read = harness.pipeline.reader.read(&identity()).await;
    assert_eq!(read.directive.http_status, 202);
    assert_eq!(read.directive.cache_control, "no-store");
    assert_eq!(read.directive.retry_after, Some(30));
    assert_eq!(read.lifecycle, LifecycleState::Initializing);
    assert!(read.data.is_none());
    assert_eq!(read.error.unwrap().code, "READINESS_BLOCKED");
}

/// Cold start with a 6-hour-old valid snapshot: readiness transitions
/// to ready and the first read serves 200 live from the object store.
#[tokio::test]
async fn test_cold_start_snapshot_recovery() {
    let harness = Harness::new(config_with_rule(25, None));

    let identity_tuple = identity();
    let (dataset_id, canonical_identity) = identity_tuple.compute_dataset_id();
    harness
        .pipeline
        .snapshots
        .write(&SnapshotDocument {
            dataset_id: dataset_id.clone(),
            identity: identity_tuple.clone(),
            canonical_identity,
            version: 4,
            data: records(25),
            validation: SnapshotValidation {
                status: ValidationStatus::Valid,
                record_count: 25,
                expected_min: 25,
            },
            snapshot_at: Utc::now() - Duration::hours(6),
        })
        .await
        .unwrap();

    let read = harness.pipeline.reader.read(&identity_tuple).await;
    assert_eq!(read.directive.http_status, 200);
    assert_eq!(read.lifecycle, LifecycleState::Live);
    assert_eq!(read.source, ReadSource::ObjectStore);
    assert_eq!(read.data.unwrap().len(), 25);

    let record = harness
        .pipeline
        .readiness
        .record(dataset_id.as_str())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.readiness_state, ReadinessState::Ready);
    assert!(record.snapshot_validated_at.is_some());
}

/// A snapshot past the age bound does not recover the scope.
#[tokio::test]
async fn test_stale_snapshot_does_not_recover() {
    let harness = Harness::new(config_with_rule(25, None));

    let identity_tuple = identity();
    let (dataset_id, canonical_identity) = identity_tuple.compute_dataset_id();
    harness
        .pipeline
        .snapshots
        .write(&SnapshotDocument {
            dataset_id,
            identity: identity_tuple.clone(),
            canonical_identity,
            version: 4,
            data: vec![json!({"team": "a", "rank": 1})],
            validation: SnapshotValidation {
                status: ValidationStatus::Valid,
                record_count: 1,
                expected_min: 1,
            },
            snapshot_at: Utc::now() - Duration::hours(48),
        })
        .await
        .unwrap();

    let read = harness.pipeline.reader.read(&identity_tuple).await;
    assert_eq!(read.directive.http_status, 202);
    assert!(read.data.is_none());
}

/// Admin unavailable blocks reads; admin reset returns the scope to
/// cold start.
#[tokio::test]
async fn test_admin_gating() {
    let harness = Harness::new(config_with_rule(25, None));
    harness.push(records(25)).await;

    harness
        .pipeline
        .readiness
        .admin_unavailable(dataset_id().as_str(), "maintenance window")
        .await
        .unwrap();

    let read = harness.pipeline.reader.read(&identity()).await;
    assert_eq!(read.directive.http_status, 503);
    assert!(read.data.is_none());
    assert_eq!(read.error.unwrap().code, "READINESS_BLOCKED");

    harness
        .pipeline
        .readiness
        .admin_reset(dataset_id().as_str())
        .await
        .unwrap();
    assert_eq!(
        harness.pipeline.readiness.check(dataset_id().as_str()).await.state,
        ReadinessState::Initializing
    );
}

/// The pending reaper rolls stale pending rows back.
#[tokio::test]
async fn test_pending_reaper() {
    let mut config = config_with_rule(25, None);
    config.pending_reaper_timeout_seconds = 0;
    let harness = Harness::new(config);

    // Open a pending row directly, as a crashed attempt would leave it
    let row = statgate::commit_log::CommitRecord::pending(
        dataset_id(),
        7,
        0,
        None,
        ValidationStatus::Unavailable,
        vec![],
        "statgate:orphan:v7",
        "crashed-attempt",
    );
    harness
        .pipeline
        .commit_log
        .create_pending_commit(row)
        .await
        .unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    let swept = harness.pipeline.orchestrator.sweep_stale_pending().await.unwrap();
    assert_eq!(swept, 1);

    let row = harness
        .pipeline
        .commit_log
        .commit(&dataset_id(), 7)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.status, statgate::commit_log::CommitStatus::RolledBack);
}
