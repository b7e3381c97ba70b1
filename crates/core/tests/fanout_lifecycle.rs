//! Fan-out lifecycle integration tests.
//!
//! These tests run the full core flow against mocks:
//! paginate calls -> resolve identifiers -> fetch tracking -> collect rows

use std::sync::Arc;

use leadsub_core::{
    testing::{fixtures, MockCallsFeed, MockLeadTracker},
    FanoutConfig, FanoutOrchestrator, Paginator, RowOrder, TrackingFetcher,
};

/// Test helper holding both mock upstreams.
struct TestHarness {
    feed: Arc<MockCallsFeed>,
    tracker: Arc<MockLeadTracker>,
}

impl TestHarness {
    async fn new() -> Self {
        let feed = Arc::new(MockCallsFeed::new());
        feed.set_window_calls("2020-01-01", MockCallsFeed::generate_calls("jan", 1500))
            .await;
        feed.set_window_calls("2020-02-01", MockCallsFeed::generate_calls("feb", 20))
            .await;

        Self {
            feed,
            tracker: Arc::new(MockLeadTracker::new()),
        }
    }

    async fn orchestrator(&self, config: FanoutConfig) -> FanoutOrchestrator {
        let paginator = Paginator::new(self.feed.clone(), 1000);
        let index = paginator
            .fetch_all(&["2020-01-01".to_string(), "2020-02-01".to_string()])
            .await
            .expect("Pagination failed");

        FanoutOrchestrator::new(
            config,
            Arc::new(index),
            TrackingFetcher::new(self.tracker.clone()),
        )
    }
}

fn fast_config() -> FanoutConfig {
    FanoutConfig {
        spawn_delay_ms: 0,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_calls_from_later_pages_resolve() {
    let harness = TestHarness::new().await;
    let late_call = MockCallsFeed::generate_calls("jan", 1500).remove(1234);
    let february_call = MockCallsFeed::generate_calls("feb", 20).remove(7);

    harness
        .tracker
        .set_detail(&late_call.inbound_call_id, fixtures::tracking_success("Late"))
        .await;
    harness
        .tracker
        .set_detail(&february_call.inbound_call_id, fixtures::tracking_success("Feb"))
        .await;

    let orchestrator = harness.orchestrator(fast_config()).await;
    let report = orchestrator
        .run(&[late_call.call_uuid.clone(), february_call.call_uuid.clone()])
        .await
        .unwrap();

    let rows = report.ordered_records(RowOrder::Input);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].internal_id, "jan-1234");
    assert_eq!(rows[0].campaign, "Late");
    assert_eq!(rows[1].internal_id, "feb-7");
    assert_eq!(rows[1].campaign, "Feb");
    assert!(harness.tracker.grid_lookups().await.is_empty());
}

#[tokio::test]
async fn test_mixed_inputs_are_all_accounted_for() {
    let harness = TestHarness::new().await;
    let known_call = MockCallsFeed::generate_calls("feb", 1).remove(0);
    harness
        .tracker
        .set_detail(&known_call.inbound_call_id, fixtures::tracking_success("Calls"))
        .await;

    let mut inputs = Vec::new();
    for i in 0..30 {
        let lead = format!("{}", 40000 + i);
        if i % 3 != 0 {
            harness.tracker.set_grid_id(&lead, &format!("t{}", i)).await;
        }
        if i % 5 == 0 {
            harness
                .tracker
                .set_detail(&format!("t{}", i), fixtures::tracking_failure("Denied"))
                .await;
        } else {
            harness
                .tracker
                .set_detail(&format!("t{}", i), fixtures::tracking_success("Bulk"))
                .await;
        }
        inputs.push(lead);
    }
    inputs.push(known_call.call_uuid.clone());
    inputs.push("ffffffff-ffff-ffff-ffff-ffffffffffff".to_string());

    let config = FanoutConfig {
        spawn_delay_ms: 0,
        max_in_flight: 4,
        ..Default::default()
    };
    let orchestrator = harness.orchestrator(config).await;
    let report = orchestrator.run(&inputs).await.unwrap();

    assert_eq!(
        report.records.len() + report.summary.skipped_leads.len(),
        inputs.len()
    );
    assert_eq!(report.summary.skipped_leads.len(), 1);
    // Every third lead has no grid entry.
    assert_eq!(report.summary.empty_leads.len(), 10);
    // i % 5 == 0 with a grid entry: 5, 10, 20, 25.
    assert_eq!(report.summary.partial_leads.len(), 4);
    assert!(harness.tracker.max_concurrent() <= 4);
}
