//! Orchestrator lifecycle integration tests.
//!
//! These tests verify the item lifecycle through the orchestrator:
//! pending -> acquiring -> publishing -> completed | failed

use std::sync::Arc;
use std::time::Duration;

use trendrelay_core::{
    testing::{fixtures, MockDestinationClient, MockSourceClient},
    DestinationCredentials, ErrorKind, ItemStatus, OrchestratorConfig, PlatformError,
    RetryConfig, SessionConfig, SourceCredentials, TransferOrchestrator, TransferOutcome,
};

/// Test helper to create all dependencies for orchestrator testing.
struct TestHarness {
    source: Arc<MockSourceClient>,
    destination: Arc<MockDestinationClient>,
}

impl TestHarness {
    fn new() -> Self {
        Self {
            source: Arc::new(MockSourceClient::new()),
            destination: Arc::new(MockDestinationClient::new()),
        }
    }

    fn config() -> OrchestratorConfig {
        OrchestratorConfig {
            auto_poll_interval_ms: 20,
            discovery_interval_secs: 0,
            call_timeout_secs: 5,
            rate_limit_cooldown_secs: 60,
            retry: RetryConfig {
                max_attempts: 3,
                initial_backoff_ms: 1,
                max_backoff_ms: 5,
            },
            ..Default::default()
        }
    }

    fn create_orchestrator(&self, config: OrchestratorConfig) -> Arc<TransferOrchestrator> {
        Arc::new(TransferOrchestrator::new(
            config,
            Arc::clone(&self.source) as Arc<dyn trendrelay_core::SourceClient>,
            Arc::clone(&self.destination) as Arc<dyn trendrelay_core::DestinationClient>,
        ))
    }

    /// Orchestrator whose queue already holds the given ids, in order.
    async fn seeded(&self, ids: &[&str]) -> Arc<TransferOrchestrator> {
        self.source
            .set_trending(ids.iter().map(|id| fixtures::item(id)).collect())
            .await;
        let orchestrator = self.create_orchestrator(Self::config());
        orchestrator
            .discover(&SourceCredentials::new("test-key"))
            .await
            .expect("discovery failed");
        orchestrator
    }

    fn session() -> SessionConfig {
        SessionConfig::new(DestinationCredentials::new("test-token"))
    }
}

async fn wait_for_status(
    orchestrator: &TransferOrchestrator,
    item_id: &str,
    expected: ItemStatus,
    timeout: Duration,
) -> bool {
    let start = std::time::Instant::now();
    while start.elapsed() < timeout {
        if let Some(item) = orchestrator.item(item_id).await {
            if item.status == expected {
                return true;
            }
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

// =============================================================================
// Discovery
// =============================================================================

#[tokio::test]
async fn test_discovery_preserves_upstream_order_and_labels() {
    let harness = TestHarness::new();
    harness
        .source
        .set_trending(vec![
            fixtures::item_with_views("a", "First", 999),
            fixtures::item_with_views("b", "Second", 1500),
            fixtures::item_with_views("c", "Third", 2_300_000),
        ])
        .await;
    let orchestrator = harness.create_orchestrator(TestHarness::config());

    let items = orchestrator
        .discover(&SourceCredentials::new("key"))
        .await
        .unwrap();

    let ids: Vec<_> = items.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
    let labels: Vec<_> = items.iter().map(|i| i.view_count_label.as_str()).collect();
    assert_eq!(labels, vec!["999", "1.5K", "2.3M"]);
    assert!(items.iter().all(|i| i.status == ItemStatus::Pending));
}

#[tokio::test]
async fn test_rediscovery_never_touches_existing_items() {
    let harness = TestHarness::new();
    let orchestrator = harness.seeded(&["a", "b"]).await;

    orchestrator
        .transfer("a", &DestinationCredentials::new("token"))
        .await
        .unwrap();

    harness
        .source
        .set_trending(vec![fixtures::item("c"), fixtures::item("a")])
        .await;
    let items = orchestrator
        .discover(&SourceCredentials::new("key"))
        .await
        .unwrap();

    assert_eq!(items[0].id, "c");
    assert_eq!(items[1].status, ItemStatus::Completed);

    let ids: Vec<_> = orchestrator
        .items()
        .await
        .into_iter()
        .map(|i| i.id)
        .collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn test_discovery_blank_key_is_invalid_input() {
    let harness = TestHarness::new();
    let orchestrator = harness.create_orchestrator(TestHarness::config());

    let err = orchestrator
        .discover(&SourceCredentials::new(""))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert_eq!(harness.source.list_count(), 0);
}

#[tokio::test]
async fn test_discovery_auth_failure_surfaces_kind() {
    let harness = TestHarness::new();
    harness
        .source
        .push_list_error(PlatformError::Auth("API key not valid".to_string()))
        .await;
    let orchestrator = harness.create_orchestrator(TestHarness::config());

    let err = orchestrator
        .discover(&SourceCredentials::new("bad"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Auth);
    assert!(orchestrator.items().await.is_empty());
}

// =============================================================================
// Manual transfers
// =============================================================================

#[tokio::test]
async fn test_successful_transfer_records_three_events() {
    let harness = TestHarness::new();
    let orchestrator = harness.seeded(&["a", "b"]).await;

    let outcome = orchestrator
        .transfer("a", &DestinationCredentials::new("token"))
        .await
        .unwrap();

    let result = match outcome {
        TransferOutcome::Completed { result, .. } => result,
        other => panic!("unexpected outcome: {:?}", other),
    };

    let item = orchestrator.item("a").await.unwrap();
    assert_eq!(item.status, ItemStatus::Completed);
    assert_eq!(item.publish_result.as_ref(), Some(&result));

    // B is untouched until selected.
    assert_eq!(
        orchestrator.item("b").await.unwrap().status,
        ItemStatus::Pending
    );

    let events = orchestrator.events().await;
    let phases: Vec<_> = events.iter().map(|e| e.phase).collect();
    assert_eq!(
        phases,
        vec![
            ItemStatus::Completed,
            ItemStatus::Publishing,
            ItemStatus::Acquiring
        ]
    );
    assert!(events.iter().all(|e| e.item_id == "a"));
    assert!(events[0].message.contains(&result.remote_id));
    assert!(events[0].id > events[1].id && events[1].id > events[2].id);
}

#[tokio::test]
async fn test_not_found_on_resolve_never_publishes() {
    let harness = TestHarness::new();
    let orchestrator = harness.seeded(&["c"]).await;
    harness.source.fail_item("c", ErrorKind::NotFound).await;

    let outcome = orchestrator
        .transfer("c", &DestinationCredentials::new("token"))
        .await
        .unwrap();

    match outcome {
        TransferOutcome::Failed { failure, .. } => assert_eq!(failure.kind, ErrorKind::NotFound),
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(
        orchestrator.item("c").await.unwrap().status,
        ItemStatus::Failed
    );

    let events = orchestrator.events().await;
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].phase, ItemStatus::Failed);
    assert_eq!(events[0].error_kind, Some(ErrorKind::NotFound));
    assert_eq!(events[1].phase, ItemStatus::Acquiring);
    assert_eq!(harness.destination.publish_count().await, 0);
}

#[tokio::test]
async fn test_transfer_of_completed_item_is_noop() {
    let harness = TestHarness::new();
    let orchestrator = harness.seeded(&["a"]).await;
    let credentials = DestinationCredentials::new("token");

    orchestrator.transfer("a", &credentials).await.unwrap();
    let events_before = orchestrator.events().await.len();

    let outcome = orchestrator.transfer("a", &credentials).await.unwrap();
    assert_eq!(
        outcome,
        TransferOutcome::Skipped {
            item_id: "a".to_string(),
            status: ItemStatus::Completed,
        }
    );
    assert_eq!(orchestrator.events().await.len(), events_before);
    assert_eq!(harness.destination.publish_count().await, 1);
}

#[tokio::test]
async fn test_cancelled_transfer_still_finishes() {
    let harness = TestHarness::new();
    let orchestrator = harness.seeded(&["a"]).await;
    harness.destination.set_delay(Duration::from_millis(300)).await;
    let credentials = DestinationCredentials::new("token");

    // The caller gives up while the item is publishing.
    let result = tokio::time::timeout(
        Duration::from_millis(50),
        orchestrator.transfer("a", &credentials),
    )
    .await;
    assert!(result.is_err());

    assert!(
        wait_for_status(&orchestrator, "a", ItemStatus::Completed, Duration::from_secs(2)).await
    );
    assert!(orchestrator.status().await.active_item.is_none());

    let outcome = orchestrator.transfer("a", &credentials).await.unwrap();
    assert_eq!(
        outcome,
        TransferOutcome::Skipped {
            item_id: "a".to_string(),
            status: ItemStatus::Completed,
        }
    );
    assert_eq!(harness.destination.publish_count().await, 1);
}

#[tokio::test]
async fn test_cleared_item_is_not_rediscovered() {
    let harness = TestHarness::new();
    let orchestrator = harness.seeded(&["a", "b"]).await;
    let credentials = DestinationCredentials::new("token");

    orchestrator.transfer("a", &credentials).await.unwrap();
    assert_eq!(orchestrator.clear_finished().await, 1);

    // "a" is still trending upstream.
    let items = orchestrator
        .discover(&SourceCredentials::new("test-key"))
        .await
        .unwrap();
    let ids: Vec<_> = items.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["b"]);
    assert!(orchestrator.item("a").await.is_none());

    let err = orchestrator.transfer("a", &credentials).await.unwrap_err();
    assert!(matches!(
        err,
        trendrelay_core::OrchestratorError::ItemNotFound(_)
    ));
    assert_eq!(orchestrator.status().await.pending_count, 1);
    assert_eq!(harness.destination.publish_count().await, 1);
}

#[tokio::test]
async fn test_concurrent_manual_transfers_are_serialized() {
    let harness = TestHarness::new();
    let orchestrator = harness.seeded(&["a", "b", "c", "d"]).await;
    harness
        .source
        .set_resolve_delay(Duration::from_millis(20))
        .await;
    harness.destination.set_delay(Duration::from_millis(20)).await;

    let mut handles = Vec::new();
    for id in ["a", "b", "c", "d", "a"] {
        let orchestrator = Arc::clone(&orchestrator);
        handles.push(tokio::spawn(async move {
            orchestrator
                .transfer(id, &DestinationCredentials::new("token"))
                .await
                .unwrap()
        }));
    }

    let mut completed = 0;
    let mut skipped = 0;
    for handle in handles {
        match handle.await.unwrap() {
            TransferOutcome::Completed { .. } => completed += 1,
            TransferOutcome::Skipped { .. } => skipped += 1,
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    assert_eq!(completed, 4);
    assert_eq!(skipped, 1);
    assert_eq!(harness.source.max_in_flight(), 1);
    assert_eq!(harness.destination.max_in_flight(), 1);
    assert_eq!(harness.destination.publish_count().await, 4);
}

// =============================================================================
// Retry policy
// =============================================================================

#[tokio::test]
async fn test_upstream_errors_are_retried() {
    let harness = TestHarness::new();
    let orchestrator = harness.seeded(&["a"]).await;
    for _ in 0..2 {
        harness
            .destination
            .push_error(PlatformError::Upstream("502 bad gateway".to_string()))
            .await;
    }

    let outcome = orchestrator
        .transfer("a", &DestinationCredentials::new("token"))
        .await
        .unwrap();

    assert!(outcome.is_completed());
    assert_eq!(harness.destination.publish_count().await, 3);
    // Retries are not phase transitions.
    assert_eq!(orchestrator.events().await.len(), 3);
}

#[tokio::test]
async fn test_upstream_gives_up_after_max_attempts() {
    let harness = TestHarness::new();
    let orchestrator = harness.seeded(&["a"]).await;
    harness.destination.fail_item("a", ErrorKind::Upstream).await;

    let outcome = orchestrator
        .transfer("a", &DestinationCredentials::new("token"))
        .await
        .unwrap();

    match outcome {
        TransferOutcome::Failed { failure, .. } => assert_eq!(failure.kind, ErrorKind::Upstream),
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(harness.destination.publish_count().await, 3);
}

#[tokio::test]
async fn test_rejected_and_auth_attempted_once() {
    for kind in [ErrorKind::Rejected, ErrorKind::Auth] {
        let harness = TestHarness::new();
        let orchestrator = harness.seeded(&["a"]).await;
        harness.destination.fail_item("a", kind).await;

        let outcome = orchestrator
            .transfer("a", &DestinationCredentials::new("token"))
            .await
            .unwrap();

        assert!(matches!(outcome, TransferOutcome::Failed { .. }));
        assert_eq!(
            harness.destination.publish_count().await,
            1,
            "{} was retried",
            kind
        );
    }
}

// =============================================================================
// Event log
// =============================================================================

#[tokio::test]
async fn test_event_log_is_bounded_newest_first() {
    let harness = TestHarness::new();
    let ids: Vec<String> = (0..10).map(|i| format!("v{}", i)).collect();
    harness
        .source
        .set_trending(ids.iter().map(|id| fixtures::item(id)).collect())
        .await;
    let orchestrator = harness.create_orchestrator(OrchestratorConfig {
        event_log_capacity: 5,
        ..TestHarness::config()
    });
    orchestrator
        .discover(&SourceCredentials::new("key"))
        .await
        .unwrap();

    for id in &ids {
        orchestrator
            .transfer(id, &DestinationCredentials::new("token"))
            .await
            .unwrap();
    }

    let events = orchestrator.events().await;
    assert_eq!(events.len(), 5);
    assert_eq!(events[0].item_id, "v9");
    assert_eq!(events[0].phase, ItemStatus::Completed);
    assert!(events.windows(2).all(|w| w[0].id > w[1].id));
    assert_eq!(orchestrator.status().await.events_recorded, 30);
    assert_eq!(orchestrator.recent_events(2).await.len(), 2);
}

// =============================================================================
// Auto-cycle
// =============================================================================

#[tokio::test]
async fn test_auto_cycle_processes_queue_in_order() {
    let harness = TestHarness::new();
    let orchestrator = harness.seeded(&["a", "b", "c"]).await;
    harness.source.fail_item("b", ErrorKind::NotFound).await;

    assert!(orchestrator.start(TestHarness::session()).await.unwrap());
    assert!(orchestrator.is_running());

    assert!(
        wait_for_status(&orchestrator, "c", ItemStatus::Completed, Duration::from_secs(5)).await,
        "item c should complete"
    );
    orchestrator.shutdown().await;

    assert_eq!(
        orchestrator.item("a").await.unwrap().status,
        ItemStatus::Completed
    );
    // A failure never blocks the next item.
    assert_eq!(
        orchestrator.item("b").await.unwrap().status,
        ItemStatus::Failed
    );
    assert_eq!(harness.source.resolve_calls().await, vec!["a", "b", "c"]);
    assert!(!orchestrator.is_running());
}

#[tokio::test]
async fn test_start_twice_is_noop() {
    let harness = TestHarness::new();
    let orchestrator = harness.seeded(&[]).await;

    assert!(orchestrator.start(TestHarness::session()).await.unwrap());
    assert!(!orchestrator.start(TestHarness::session()).await.unwrap());
    assert!(orchestrator.stop());
    assert!(!orchestrator.stop());
    orchestrator.shutdown().await;
}

#[tokio::test]
async fn test_stop_lets_in_flight_transfer_finish() {
    let harness = TestHarness::new();
    let orchestrator = harness.seeded(&["a", "b"]).await;
    harness
        .destination
        .set_delay(Duration::from_millis(200))
        .await;

    orchestrator.start(TestHarness::session()).await.unwrap();
    assert!(
        wait_for_status(&orchestrator, "a", ItemStatus::Publishing, Duration::from_secs(5)).await
    );

    orchestrator.stop();
    assert!(
        wait_for_status(&orchestrator, "a", ItemStatus::Completed, Duration::from_secs(5)).await,
        "in-flight transfer should finish after stop"
    );
    orchestrator.shutdown().await;

    assert_eq!(
        orchestrator.item("b").await.unwrap().status,
        ItemStatus::Pending
    );
    assert_eq!(harness.destination.publish_count().await, 1);
}

#[tokio::test]
async fn test_auto_and_manual_triggers_never_overlap() {
    let harness = TestHarness::new();
    let ids: Vec<String> = (0..6).map(|i| format!("v{}", i)).collect();
    harness
        .source
        .set_trending(ids.iter().map(|id| fixtures::item(id)).collect())
        .await;
    harness
        .source
        .set_resolve_delay(Duration::from_millis(10))
        .await;
    harness.destination.set_delay(Duration::from_millis(10)).await;
    let orchestrator = harness.create_orchestrator(TestHarness::config());
    orchestrator
        .discover(&SourceCredentials::new("key"))
        .await
        .unwrap();

    orchestrator.start(TestHarness::session()).await.unwrap();
    let mut handles = Vec::new();
    for id in ids.iter().rev() {
        let orchestrator = Arc::clone(&orchestrator);
        let id = id.clone();
        handles.push(tokio::spawn(async move {
            orchestrator
                .transfer(&id, &DestinationCredentials::new("token"))
                .await
                .unwrap()
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }
    for id in &ids {
        assert!(wait_for_status(&orchestrator, id, ItemStatus::Completed, Duration::from_secs(5)).await);
    }
    orchestrator.shutdown().await;

    assert_eq!(harness.source.max_in_flight(), 1);
    assert_eq!(harness.destination.max_in_flight(), 1);
    assert_eq!(harness.destination.publish_count().await, ids.len());
}

#[tokio::test]
async fn test_auto_cycle_picks_up_newly_discovered_items() {
    let harness = TestHarness::new();
    let orchestrator = harness.seeded(&[]).await;
    orchestrator.start(TestHarness::session()).await.unwrap();

    harness.source.set_trending(vec![fixtures::item("late")]).await;
    orchestrator
        .discover(&SourceCredentials::new("key"))
        .await
        .unwrap();

    assert!(
        wait_for_status(&orchestrator, "late", ItemStatus::Completed, Duration::from_secs(5)).await
    );
    orchestrator.shutdown().await;
}

#[tokio::test]
async fn test_auto_cycle_discovers_with_source_credentials() {
    let harness = TestHarness::new();
    harness
        .source
        .set_trending(vec![fixtures::item("x"), fixtures::item("y")])
        .await;
    let orchestrator = harness.create_orchestrator(OrchestratorConfig {
        discovery_interval_secs: 300,
        ..TestHarness::config()
    });

    let session = TestHarness::session().with_source(SourceCredentials::new("key"));
    orchestrator.start(session).await.unwrap();

    assert!(
        wait_for_status(&orchestrator, "y", ItemStatus::Completed, Duration::from_secs(5)).await
    );
    orchestrator.shutdown().await;
    assert_eq!(harness.source.list_count(), 1);
}

#[tokio::test]
async fn test_cooldown_after_quota_is_interrupted_by_stop() {
    let harness = TestHarness::new();
    let orchestrator = harness.seeded(&["a", "b"]).await;
    harness
        .destination
        .push_error(PlatformError::QuotaExceeded {
            message: "daily upload cap".to_string(),
            retry_after: Some(Duration::from_secs(3600)),
        })
        .await;

    orchestrator.start(TestHarness::session()).await.unwrap();
    assert!(wait_for_status(&orchestrator, "a", ItemStatus::Failed, Duration::from_secs(5)).await);

    // B waits for the cooldown instead of starting right away.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(
        orchestrator.item("b").await.unwrap().status,
        ItemStatus::Pending
    );

    tokio::time::timeout(Duration::from_secs(2), orchestrator.shutdown())
        .await
        .expect("stop should interrupt the cooldown");
}

#[tokio::test]
async fn test_start_rejects_blank_token() {
    let harness = TestHarness::new();
    let orchestrator = harness.seeded(&["a"]).await;

    let result = orchestrator
        .start(SessionConfig::new(DestinationCredentials::new("")))
        .await;
    assert!(result.is_err());
    assert!(!orchestrator.is_running());
}
