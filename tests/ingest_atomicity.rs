//! Ingestion atomicity
//!
//! - Cold start: first ingestion commits v1, swaps the pointer, writes a
//!   snapshot, and transitions readiness to ready
//! - Versions are strictly increasing; a refetch of identical data still
//!   produces a new version
//! - Reads only ever observe committed versions whose envelope matches
//!   the served payload

mod support;

use statgate::commit_log::CommitStatus;
use statgate::envelope::LifecycleState;
use statgate::kv::{dataset_prefix, pointer_key, KvSurface};
use statgate::read::ReadSource;
use statgate::readiness::ReadinessState;
use support::{config_with_rule, dataset_id, identity, records, Harness};

/// Cold start, first ingestion: empty metadata store, 25 well-formed
/// records against a rule requiring 25.
#[tokio::test]
async fn test_cold_start_first_ingestion() {
    let harness = Harness::new(config_with_rule(25, None));

    let outcome = harness.push(records(25)).await;
    assert!(outcome.success);
    assert!(outcome.committed);
    assert_eq!(outcome.version, Some(1));
    assert_eq!(outcome.record_count, 25);
    assert_eq!(outcome.http_status, 200);
    assert_eq!(outcome.lifecycle, LifecycleState::Live);

    // Pointer is "v1"
    let prefix = dataset_prefix(&harness.pipeline.config.kv_prefix, &dataset_id());
    let pointer = harness.kv.get(&pointer_key(&prefix)).await.unwrap();
    assert_eq!(pointer.as_deref(), Some("v1"));

    // Readiness transitioned initializing → ready
    let check = harness.pipeline.readiness.check(dataset_id().as_str()).await;
    assert_eq!(check.state, ReadinessState::Ready);

    // Snapshot written
    let snapshot = harness
        .pipeline
        .snapshots
        .latest(&dataset_id())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(snapshot.version, 1);
    assert_eq!(snapshot.data.len(), 25);

    // Read: 200, live, cache-eligible, served count matches data length
    let outcome = harness.pipeline.reader.read(&identity()).await;
    assert_eq!(outcome.directive.http_status, 200);
    assert_eq!(outcome.lifecycle, LifecycleState::Live);
    assert!(outcome.directive.cache_eligible);
    assert_eq!(outcome.source, ReadSource::Kv);
    let data = outcome.data.unwrap();
    assert_eq!(data.len(), 25);
    assert_eq!(outcome.record_count, data.len());
}

/// An identity-equal refetch still produces a new version and snapshot;
/// the commit log is the source of truth.
#[tokio::test]
async fn test_identical_refetch_gets_new_version() {
    let harness = Harness::new(config_with_rule(25, None));

    let first = harness.push(records(25)).await;
    let second = harness.push(records(25)).await;
    assert_eq!(first.version, Some(1));
    assert_eq!(second.version, Some(2));
    assert!(second.committed);

    let prefix = dataset_prefix(&harness.pipeline.config.kv_prefix, &dataset_id());
    let pointer = harness.kv.get(&pointer_key(&prefix)).await.unwrap();
    assert_eq!(pointer.as_deref(), Some("v2"));

    let snapshot = harness
        .pipeline
        .snapshots
        .latest(&dataset_id())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(snapshot.version, 2);

    // v1 superseded, v2 committed; exactly one committed row
    let commits = harness
        .pipeline
        .commit_log
        .list_commits(&dataset_id())
        .await
        .unwrap();
    let committed: Vec<_> = commits
        .iter()
        .filter(|row| row.status == CommitStatus::Committed)
        .collect();
    assert_eq!(committed.len(), 1);
    assert_eq!(committed[0].version, 2);
    assert!(commits
        .iter()
        .any(|row| row.version == 1 && row.status == CommitStatus::Superseded));
}

/// Version numbers are strictly increasing and unique across attempts,
/// including failed ones.
#[tokio::test]
async fn test_versions_monotone_across_outcomes() {
    let harness = Harness::new(config_with_rule(25, None));

    harness.push(records(25)).await;
    harness.push(records(3)).await; // density shortfall, rolled back
    harness.push(records(25)).await;

    let commits = harness
        .pipeline
        .commit_log
        .list_commits(&dataset_id())
        .await
        .unwrap();
    let mut versions: Vec<u64> = commits.iter().map(|row| row.version).collect();
    assert_eq!(versions, vec![3, 2, 1]);
    versions.dedup();
    assert_eq!(versions.len(), 3);
}

/// A failed attempt after a good commit never changes what a reader
/// observes.
#[tokio::test]
async fn test_reader_never_observes_rolled_back_version() {
    let harness = Harness::new(config_with_rule(25, None));

    harness.push(records(25)).await;
    let failed = harness.push(records(2)).await;
    assert!(!failed.committed);

    let outcome = harness.pipeline.reader.read(&identity()).await;
    assert_eq!(outcome.version, Some(1));
    assert_eq!(outcome.data.unwrap().len(), 25);

    let rolled_back = harness
        .pipeline
        .commit_log
        .commit(&dataset_id(), failed.version.unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(rolled_back.status, CommitStatus::RolledBack);
}
