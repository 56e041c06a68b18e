//! Last-Known-Good preservation
//!
//! Any failure after a committed version exists leaves the served
//! version unchanged, flips `is_serving_lkg` with a non-empty reason,
//! and degrades readiness. Recovery on the next good commit clears the
//! flag.

mod support;

use statgate::envelope::LifecycleState;
use statgate::kv::{dataset_prefix, pointer_key, KvSurface};
use statgate::readiness::ReadinessState;
use support::{config_with_rule, dataset_id, identity, records, FailingFetcher, Harness};

/// Density shortfall with LKG: v1 with 25 records serves; a new
/// ingestion of 10 records rolls back and v1 keeps serving as stale.
#[tokio::test]
async fn test_density_shortfall_preserves_lkg() {
    let harness = Harness::new(config_with_rule(25, None));
    harness.push(records(25)).await;

    let outcome = harness.push(records(10)).await;
    assert!(!outcome.committed);
    assert_eq!(outcome.http_status, 503);
    assert!(outcome.is_serving_lkg);
    assert_eq!(outcome.lifecycle, LifecycleState::Stale);
    assert_eq!(outcome.error_code.as_deref(), Some("SEMANTIC_INVALID"));

    // Pointer remains v1 with the LKG flag and reason set
    let pointer = harness
        .pipeline
        .commit_log
        .current_pointer(&dataset_id())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(pointer.current_version, 1);
    assert!(pointer.is_serving_lkg);
    let reason = pointer.lkg_reason.unwrap();
    assert!(!reason.is_empty());
    assert!(reason.contains("insufficient density"));

    // Read: 503 no-store, stale, previous data still served
    let read = harness.pipeline.reader.read(&identity()).await;
    assert_eq!(read.directive.http_status, 503);
    assert_eq!(read.directive.cache_control, "no-store");
    assert_eq!(read.lifecycle, LifecycleState::Stale);
    assert!(read.is_serving_lkg);
    assert_eq!(read.data.unwrap().len(), 25);
}

/// A failed fetch records the attempt but never touches KV or the
/// pointer.
#[tokio::test]
async fn test_fetch_failure_preserves_lkg() {
    let harness = Harness::new(config_with_rule(25, None));
    harness.push(records(25)).await;

    let prefix = dataset_prefix(&harness.pipeline.config.kv_prefix, &dataset_id());
    let pointer_before = harness.kv.get(&pointer_key(&prefix)).await.unwrap();

    let outcome = harness
        .pipeline
        .orchestrator
        .ingest(&identity(), &FailingFetcher, "test")
        .await
        .unwrap();
    assert!(!outcome.committed);
    assert_eq!(outcome.error_code.as_deref(), Some("FETCH_FAILED"));
    assert!(outcome.is_serving_lkg);

    let pointer_after = harness.kv.get(&pointer_key(&prefix)).await.unwrap();
    assert_eq!(pointer_before, pointer_after);

    assert_eq!(
        harness.pipeline.readiness.check(dataset_id().as_str()).await.state,
        ReadinessState::Degraded
    );
}

/// A fetch failure with no prior commit marks the scope unavailable;
/// there is nothing to fall back to.
#[tokio::test]
async fn test_cold_start_fetch_failure_is_unavailable() {
    let harness = Harness::new(config_with_rule(25, None));

    let outcome = harness
        .pipeline
        .orchestrator
        .ingest(&identity(), &FailingFetcher, "test")
        .await
        .unwrap();
    assert!(!outcome.committed);
    assert!(!outcome.is_serving_lkg);
    assert_eq!(outcome.lifecycle, LifecycleState::Unavailable);

    let check = harness.pipeline.readiness.check(dataset_id().as_str()).await;
    assert_eq!(check.state, ReadinessState::Unavailable);
    assert!(!check.allow_kv_read);

    let read = harness.pipeline.reader.read(&identity()).await;
    assert_eq!(read.directive.http_status, 503);
    assert!(read.data.is_none());
}

/// A successful recommit clears the LKG flag and restores ready.
#[tokio::test]
async fn test_recommit_clears_lkg() {
    let harness = Harness::new(config_with_rule(25, None));
    harness.push(records(25)).await;
    harness.push(records(5)).await; // degrade

    let outcome = harness.push(records(30)).await;
    assert!(outcome.committed);
    assert_eq!(outcome.version, Some(3));

    let pointer = harness
        .pipeline
        .commit_log
        .current_pointer(&dataset_id())
        .await
        .unwrap()
        .unwrap();
    assert!(!pointer.is_serving_lkg);
    assert!(pointer.lkg_reason.is_none());
    assert_eq!(pointer.current_version, 3);

    assert_eq!(
        harness.pipeline.readiness.check(dataset_id().as_str()).await.state,
        ReadinessState::Ready
    );

    let read = harness.pipeline.reader.read(&identity()).await;
    assert_eq!(read.directive.http_status, 200);
    assert!(read.directive.cache_eligible);
    assert_eq!(read.data.unwrap().len(), 30);
}

/// No read is cache-eligible unless it is 200 + live + valid.
#[tokio::test]
async fn test_cache_eligibility_contract() {
    let harness = Harness::new(config_with_rule(25, None));

    // Blocked cold-start read
    let blocked = harness.pipeline.reader.read(&identity()).await;
    assert!(!blocked.directive.cache_eligible);
    assert_eq!(blocked.directive.cache_control, "no-store");

    // Live read
    harness.push(records(25)).await;
    let live = harness.pipeline.reader.read(&identity()).await;
    assert!(live.directive.cache_eligible);
    assert_eq!(live.directive.http_status, 200);
    assert_eq!(live.lifecycle, LifecycleState::Live);

    // Degraded read
    harness.push(records(1)).await;
    let stale = harness.pipeline.reader.read(&identity()).await;
    assert!(!stale.directive.cache_eligible);
    assert_eq!(stale.directive.cache_control, "no-store");
    assert_ne!(stale.directive.http_status, 200);
}
