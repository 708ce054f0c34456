use super::*;
use crate::audit::{AuditRecord, InMemoryAuditSink};
use crate::cluster::{InMemoryCluster, ScalableResource};
use crate::job::{AuditStatus, TargetResult};
use async_trait::async_trait;
use opsgate_core::StoreKind;
use parking_lot::Mutex;
use proptest::prelude::*;
use std::time::Duration;

const LATENCY: Duration = Duration::from_millis(500);

fn targets(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| (*n).to_string()).collect()
}

fn cluster_with(names: &[&str]) -> Arc<InMemoryCluster> {
    let cluster = InMemoryCluster::new().with_latency(LATENCY);
    for name in names {
        cluster.add_target(name, ["api"]);
    }
    Arc::new(cluster)
}

fn orchestrator(
    cluster: Arc<dyn ClusterClient>,
    audit: Arc<dyn AuditSink>,
    max_concurrent: usize,
) -> BatchOrchestrator {
    let config = BatchConfig::default().with_max_concurrent(max_concurrent);
    BatchOrchestrator::new(cluster, audit, config).unwrap()
}

struct FailingAuditSink;

#[async_trait]
impl AuditSink for FailingAuditSink {
    async fn record(&self, _record: AuditRecord) -> Result<()> {
        Err(Error::store_unavailable(StoreKind::Audit, "insert", "disk full"))
    }
}

/// Notes when each target starts; panics on the target named "boom"
#[derive(Default)]
struct RecordingCluster {
    starts: Mutex<Vec<(String, Instant)>>,
}

#[async_trait]
impl ClusterClient for RecordingCluster {
    async fn list_scalable(&self, target: &str) -> Result<Vec<ScalableResource>> {
        self.starts.lock().push((target.to_string(), Instant::now()));
        if target == "boom" {
            panic!("cluster client bug");
        }
        Ok(vec![ScalableResource::new("api", 0)])
    }

    async fn set_replicas(&self, _target: &str, _resource: &str, _replicas: i32) -> Result<()> {
        Ok(())
    }
}

#[test]
fn submit_outside_a_runtime_is_refused() {
    let cluster = cluster_with(&["a"]);
    let audit = Arc::new(InMemoryAuditSink::new());
    let orchestrator = orchestrator(cluster.clone(), audit.clone(), 2);

    let err = orchestrator
        .submit(targets(&["a"]), "scale_up", "ops")
        .unwrap_err();
    assert_eq!(err.code(), "configuration_error");
    assert_eq!(cluster.calls(), 0);
    assert!(audit.is_empty());
}

#[tokio::test(start_paused = true)]
async fn never_exceeds_concurrency_limit() {
    let names: Vec<String> = (0..10).map(|i| format!("ns-{i}")).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let cluster = cluster_with(&refs);
    let audit = Arc::new(InMemoryAuditSink::new());
    let orchestrator = orchestrator(cluster.clone(), audit.clone(), 3);

    let accepted = orchestrator.submit(names.clone(), "scale_up", "alice").unwrap();
    let summary = accepted.handle.wait().await.unwrap();

    assert_eq!(summary.success_count(), 10);
    assert_eq!(cluster.peak_in_flight(), 3);
    assert_eq!(audit.len(), 10);
    for name in &names {
        assert_eq!(cluster.replicas(name, "api"), Some(1));
    }
}

#[tokio::test(start_paused = true)]
async fn one_failing_target_leaves_siblings_alone() {
    let cluster = cluster_with(&["a", "b", "c"]);
    cluster.fail_target("b");
    let audit = Arc::new(InMemoryAuditSink::new());
    let orchestrator = orchestrator(cluster.clone(), audit.clone(), 2);

    let accepted = orchestrator
        .submit(targets(&["a", "b", "c"]), "scale_down", "alice")
        .unwrap();
    assert_eq!(accepted.total, 3);
    let summary = accepted.handle.wait().await.unwrap();

    assert_eq!((summary.success_count(), summary.failed_count()), (2, 1));
    assert_eq!(summary.success, vec!["a", "c"]);
    assert_eq!(summary.failed[0].target, "b");
    assert_eq!(summary.outcomes[1].audit, AuditStatus::Skipped);

    let records = audit.records();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.target != "b" && r.actor == "alice"));
    assert!(records.iter().all(|r| r.action == ScaleAction::ScaleDown));
}

#[tokio::test(start_paused = true)]
async fn invalid_action_is_rejected_before_anything_runs() {
    let cluster = cluster_with(&["a", "b"]);
    let audit = Arc::new(InMemoryAuditSink::new());
    let orchestrator = orchestrator(cluster.clone(), audit.clone(), 2);

    for action in ["invalid_action", ""] {
        let err = orchestrator
            .submit(targets(&["a", "b"]), action, "alice")
            .unwrap_err();
        assert_eq!(err.code(), "validation_error");
    }

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(cluster.calls(), 0);
    assert!(audit.is_empty());
}

#[tokio::test(start_paused = true)]
async fn empty_target_list_completes_immediately() {
    let cluster = cluster_with(&[]);
    let orchestrator = orchestrator(cluster.clone(), Arc::new(InMemoryAuditSink::new()), 2);

    let accepted = orchestrator.submit(Vec::new(), "scale_up", "alice").unwrap();
    assert_eq!(accepted.total, 0);
    let summary = accepted.handle.wait().await.unwrap();

    assert_eq!(summary.total_count, 0);
    assert!(summary.outcomes.is_empty());
    assert_eq!(accepted.handle.status().state, JobState::Completed);
    assert_eq!(cluster.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn stalled_call_times_out_and_fails_only_that_target() {
    let cluster = cluster_with(&["fast", "slow"]);
    cluster.stall_target("slow");
    let audit = Arc::new(InMemoryAuditSink::new());
    let orchestrator = orchestrator(cluster.clone(), audit.clone(), 2);
    let started = Instant::now();

    let summary = orchestrator
        .submit(targets(&["fast", "slow"]), "scale_up", "alice")
        .unwrap()
        .handle
        .wait()
        .await
        .unwrap();

    assert_eq!(summary.success, vec!["fast"]);
    assert!(summary.failed[0].reason.contains("timed out"));
    assert!(started.elapsed() >= Duration::from_secs(30));
    assert_eq!(audit.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn first_resource_failure_stops_the_target() {
    let cluster = Arc::new(InMemoryCluster::new());
    cluster.add_target("a", ["x", "y"]);
    cluster.fail_resource("a", "x");
    let orchestrator = orchestrator(cluster.clone(), Arc::new(InMemoryAuditSink::new()), 1);

    let summary = orchestrator
        .submit(targets(&["a"]), "scale_up", "alice")
        .unwrap()
        .handle
        .wait()
        .await
        .unwrap();

    assert_eq!(summary.failed_count(), 1);
    assert_eq!(cluster.replicas("a", "y"), Some(0));
}

#[tokio::test(start_paused = true)]
async fn audit_failure_keeps_target_successful() {
    let cluster = cluster_with(&["a", "b"]);
    let orchestrator = orchestrator(cluster, Arc::new(FailingAuditSink), 2);

    let summary = orchestrator
        .submit(targets(&["a", "b"]), "scale_up", "alice")
        .unwrap()
        .handle
        .wait()
        .await
        .unwrap();

    assert_eq!(summary.success_count(), 2);
    assert_eq!(summary.audits_written(), 0);
    assert!(summary.outcomes.iter().all(|o| o.audit == AuditStatus::Failed));
}

#[tokio::test(start_paused = true)]
async fn panicking_worker_is_counted_as_failed() {
    let cluster = Arc::new(RecordingCluster::default());
    let orchestrator = orchestrator(cluster, Arc::new(InMemoryAuditSink::new()), 2);

    let summary = orchestrator
        .submit(targets(&["a", "boom", "c"]), "scale_up", "alice")
        .unwrap()
        .handle
        .wait()
        .await
        .unwrap();

    assert_eq!(summary.total_count, 3);
    assert_eq!(summary.success, vec!["a", "c"]);
    assert_eq!(summary.failed[0].target, "boom");
    assert!(matches!(
        summary.outcomes[1].result,
        TargetResult::Failed { ref reason } if reason.contains("without reporting")
    ));
}

#[tokio::test(start_paused = true)]
async fn starts_are_paced_and_in_input_order() {
    let cluster = Arc::new(RecordingCluster::default());
    let orchestrator = orchestrator(cluster.clone(), Arc::new(InMemoryAuditSink::new()), 10);

    orchestrator
        .submit(targets(&["a", "b", "c", "d"]), "scale_up", "alice")
        .unwrap()
        .handle
        .wait()
        .await
        .unwrap();

    let starts = cluster.starts.lock().clone();
    let order: Vec<&str> = starts.iter().map(|(t, _)| t.as_str()).collect();
    assert_eq!(order, vec!["a", "b", "c", "d"]);
    for pair in starts.windows(2) {
        assert!(pair[1].1 - pair[0].1 >= Duration::from_millis(100));
    }
}

#[tokio::test(start_paused = true)]
async fn dropping_the_handle_does_not_cancel() {
    let cluster = cluster_with(&["a", "b"]);
    let audit = Arc::new(InMemoryAuditSink::new());
    let orchestrator = orchestrator(cluster.clone(), audit.clone(), 2);

    drop(orchestrator.submit(targets(&["a", "b"]), "scale_up", "alice").unwrap());
    tokio::time::sleep(Duration::from_secs(10)).await;

    assert_eq!(audit.len(), 2);
    assert_eq!(cluster.replicas("b", "api"), Some(1));
}

#[tokio::test(start_paused = true)]
async fn status_tracks_progress() {
    let cluster = cluster_with(&["a", "b", "c"]);
    let orchestrator = orchestrator(cluster, Arc::new(InMemoryAuditSink::new()), 1);

    let accepted = orchestrator
        .submit(targets(&["a", "b", "c"]), "scale_up", "alice")
        .unwrap();
    let initial = accepted.handle.status();
    assert_eq!(initial.state, JobState::Running);
    assert_eq!(initial.total, 3);
    assert!(accepted.handle.summary().is_none());

    accepted.handle.wait().await.unwrap();
    let done = accepted.handle.status();
    assert_eq!(done.state, JobState::Completed);
    assert_eq!(done.completed, 3);
}

#[tokio::test]
async fn single_target_collects_resource_failures() {
    let cluster = Arc::new(InMemoryCluster::new());
    cluster.add_target("shop-service", ["api", "worker", "cron"]);
    cluster.fail_resource("shop-service", "worker");
    let audit = Arc::new(InMemoryAuditSink::new());
    let orchestrator = orchestrator(cluster.clone(), audit.clone(), 5);

    let report = orchestrator
        .scale_target("shop-service", "scale_up", "alice")
        .await
        .unwrap();

    assert_eq!(report.replicas, 1);
    assert_eq!(report.updated, vec!["api", "cron"]);
    assert_eq!(report.failed[0].resource, "worker");
    assert_eq!(report.audit, AuditStatus::Written);
    assert_eq!(audit.len(), 1);
    assert_eq!(cluster.replicas("shop-service", "cron"), Some(1));
}

#[tokio::test]
async fn single_target_rejects_bad_input_and_listing_failure() {
    let cluster = Arc::new(InMemoryCluster::new());
    cluster.add_target("a", ["api"]);
    cluster.fail_target("a");
    let audit = Arc::new(InMemoryAuditSink::new());
    let orchestrator = orchestrator(cluster, audit.clone(), 5);

    let blank = orchestrator.scale_target(" ", "scale_up", "alice").await.unwrap_err();
    assert_eq!(blank.code(), "validation_error");
    let bad_action = orchestrator.scale_target("a", "restart", "alice").await.unwrap_err();
    assert_eq!(bad_action.code(), "validation_error");
    let listing = orchestrator.scale_target("a", "scale_up", "alice").await.unwrap_err();
    assert_eq!(listing.code(), "downstream_unavailable");
    assert!(audit.is_empty());
}

#[test]
fn zero_concurrency_config_is_refused() {
    let result = BatchOrchestrator::new(
        Arc::new(InMemoryCluster::new()),
        Arc::new(InMemoryAuditSink::new()),
        BatchConfig::default().with_max_concurrent(0),
    );
    assert!(result.is_err());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn every_target_is_tallied_exactly_once(
        outcomes in prop::collection::vec(any::<bool>(), 0..16),
        limit in 1usize..5,
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .start_paused(true)
            .build()
            .unwrap();

        let summary = runtime.block_on(async {
            let cluster = Arc::new(InMemoryCluster::new().with_latency(LATENCY));
            let names: Vec<String> = (0..outcomes.len()).map(|i| format!("t{i}")).collect();
            for (name, ok) in names.iter().zip(&outcomes) {
                cluster.add_target(name, ["api"]);
                if !ok {
                    cluster.fail_target(name);
                }
            }
            let orchestrator =
                orchestrator(cluster.clone(), Arc::new(InMemoryAuditSink::new()), limit);
            let summary = orchestrator
                .submit(names, "scale_up", "prop")
                .unwrap()
                .handle
                .wait()
                .await
                .unwrap();
            (summary, cluster.peak_in_flight())
        });
        let (summary, peak) = summary;

        let expected_ok = outcomes.iter().filter(|ok| **ok).count();
        prop_assert_eq!(summary.success_count(), expected_ok);
        prop_assert_eq!(summary.success_count() + summary.failed_count(), outcomes.len());
        prop_assert_eq!(summary.outcomes.len(), outcomes.len());
        prop_assert!(peak <= limit);
    }
}
