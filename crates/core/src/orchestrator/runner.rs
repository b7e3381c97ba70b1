//! Fan-out orchestrator implementation.
//!
//! One task per resolved identifier, spawned at a fixed pace:
//! - Resolution: sequential, against the completed call index
//! - Lookups: concurrent, optionally capped by a semaphore
//! - Results: funneled to a single collector task

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{watch, Semaphore};
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::calls::CallIndex;
use crate::report::{create_report_system, ReportHandle, RunReport};
use crate::resolver::{is_call_uuid, resolve, Resolution};
use crate::tracking::TrackingFetcher;

use super::config::FanoutConfig;
use super::types::{ProgressCallback, RunError, RunFailure, RunProgress};

type TaskResult = Result<(), RunError>;

/// Drives one tracking lookup per input identifier.
pub struct FanoutOrchestrator {
    config: FanoutConfig,
    index: Arc<CallIndex>,
    fetcher: TrackingFetcher,
    progress: Option<ProgressCallback>,
    shutdown_tx: Arc<watch::Sender<bool>>,
}

/// Cancels a [`FanoutOrchestrator`] run.
///
/// The request is kept: a shutdown sent before `run` starts still cancels it.
#[derive(Clone)]
pub struct ShutdownHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        self.tx.send_replace(true);
    }
}

impl FanoutOrchestrator {
    /// Create a new orchestrator over a fully populated call index.
    pub fn new(config: FanoutConfig, index: Arc<CallIndex>, fetcher: TrackingFetcher) -> Self {
        let (shutdown_tx, _) = watch::channel(false);

        Self {
            config,
            index,
            fetcher,
            progress: None,
            shutdown_tx: Arc::new(shutdown_tx),
        }
    }

    /// Set a callback for progress events.
    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Handle that cancels [`run`](Self::run) when signalled.
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            tx: Arc::clone(&self.shutdown_tx),
        }
    }

    /// Process every identifier and wait for all lookups to finish.
    ///
    /// On failure, in-flight lookups are aborted and the rows collected so
    /// far are returned in [`RunFailure::partial`].
    pub async fn run(&self, external_ids: &[String]) -> Result<RunReport, RunFailure> {
        let run_id = Uuid::new_v4();
        let started = Instant::now();
        let total = external_ids.len();
        info!(%run_id, total, "Starting lead fan-out");

        let (handle, collector) = create_report_system(
            total,
            self.config.report_buffer.max(1),
            self.progress.clone(),
        );
        let collector_task = tokio::spawn(collector.run());

        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let mut tasks: JoinSet<TaskResult> = JoinSet::new();

        let mut result = self
            .dispatch(external_ids, &handle, &mut tasks, &mut shutdown_rx)
            .await;
        if result.is_ok() {
            result = Self::drain(&mut tasks, &mut shutdown_rx).await;
        }

        if result.is_err() {
            tasks.abort_all();
            while tasks.join_next().await.is_some() {}
        }

        // The collector stops once the last handle is gone.
        drop(handle);
        let report = match collector_task.await {
            Ok(report) => report,
            Err(e) => {
                error!(%run_id, "Report collector failed: {}", e);
                RunReport::default()
            }
        };

        match result {
            Ok(()) => {
                info!(
                    %run_id,
                    rows = report.records.len(),
                    empty = report.summary.empty_leads.len(),
                    skipped = report.summary.skipped_leads.len(),
                    partial = report.summary.partial_leads.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Lead fan-out complete"
                );
                Ok(report)
            }
            Err(error) => {
                error!(%run_id, processed = report.processed(), "Lead fan-out aborted: {}", error);
                Err(RunFailure {
                    error,
                    partial: report,
                })
            }
        }
    }

    /// Resolve identifiers in input order and spawn a lookup for each.
    async fn dispatch(
        &self,
        external_ids: &[String],
        handle: &ReportHandle,
        tasks: &mut JoinSet<TaskResult>,
        shutdown_rx: &mut watch::Receiver<bool>,
    ) -> TaskResult {
        let total = external_ids.len();
        let limiter = (self.config.max_in_flight > 0)
            .then(|| Arc::new(Semaphore::new(self.config.max_in_flight)));
        let spawn_delay = Duration::from_millis(self.config.spawn_delay_ms);

        for (position, raw_id) in external_ids.iter().enumerate() {
            if *shutdown_rx.borrow() {
                return Err(RunError::Cancelled);
            }

            // Stop spawning as soon as a finished lookup reports a failure.
            while let Some(joined) = tasks.try_join_next() {
                flatten(joined)?;
            }

            let lead_id = raw_id.trim().to_string();
            let (internal_key, bypass_grid_lookup) = match resolve(&lead_id, &self.index) {
                Resolution::Resolved {
                    internal_key,
                    bypass_grid_lookup,
                } => (internal_key, bypass_grid_lookup),
                Resolution::Unresolvable => {
                    debug!(lead_id = %lead_id, "Call not found in index, skipping");
                    handle.skipped(position, &lead_id).await;
                    continue;
                }
            };

            let permit = match &limiter {
                Some(semaphore) => {
                    let semaphore = Arc::clone(semaphore);
                    tokio::select! {
                        permit = semaphore.acquire_owned() => {
                            Some(permit.map_err(|_| RunError::Cancelled)?)
                        }
                        _ = cancelled(shutdown_rx) => return Err(RunError::Cancelled),
                    }
                }
                None => None,
            };

            if let Some(progress) = &self.progress {
                progress(RunProgress::Spawned {
                    index: position,
                    total,
                    lead_id: lead_id.clone(),
                    via_call: is_call_uuid(&lead_id),
                });
            }

            let fetcher = self.fetcher.clone();
            let handle = handle.clone();
            let timeout_secs = self.config.task_timeout_secs;
            tasks.spawn(async move {
                let _permit = permit;
                let lookup = fetcher.fetch(&internal_key, bypass_grid_lookup);

                let fetched = if timeout_secs > 0 {
                    match tokio::time::timeout(Duration::from_secs(timeout_secs), lookup).await {
                        Ok(fetched) => fetched,
                        Err(_) => {
                            warn!(lead_id = %lead_id, "Lookup timed out");
                            return Err(RunError::TaskTimedOut {
                                lead_id,
                                timeout_secs,
                            });
                        }
                    }
                } else {
                    lookup.await
                };

                let outcome = fetched.map_err(|source| RunError::Tracking {
                    lead_id: lead_id.clone(),
                    source,
                })?;
                handle.record(position, &lead_id, &outcome).await;
                Ok(())
            });

            if !spawn_delay.is_zero() {
                tokio::select! {
                    _ = tokio::time::sleep(spawn_delay) => {}
                    _ = cancelled(shutdown_rx) => return Err(RunError::Cancelled),
                }
            }
        }

        Ok(())
    }

    /// Wait for every spawned lookup, failing on the first error.
    async fn drain(
        tasks: &mut JoinSet<TaskResult>,
        shutdown_rx: &mut watch::Receiver<bool>,
    ) -> TaskResult {
        loop {
            tokio::select! {
                joined = tasks.join_next() => match joined {
                    Some(joined) => flatten(joined)?,
                    None => return Ok(()),
                },
                _ = cancelled(shutdown_rx) => return Err(RunError::Cancelled),
            }
        }
    }
}

/// Resolves once shutdown has been requested.
async fn cancelled(shutdown_rx: &mut watch::Receiver<bool>) {
    loop {
        let requested = *shutdown_rx.borrow_and_update();
        if requested {
            return;
        }
        if shutdown_rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

fn flatten(joined: Result<TaskResult, JoinError>) -> TaskResult {
    match joined {
        Ok(result) => result,
        Err(e) => Err(RunError::TaskPanicked(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Mutex;

    use super::*;
    use crate::calls::CallRecord;
    use crate::testing::{fixtures, MockLeadTracker};
    use crate::tracking::TrackingError;

    const CALL_UUID: &str = "550e8400-e29b-41d4-a716-446655440000";
    const UNKNOWN_UUID: &str = "650e8400-e29b-41d4-a716-446655440000";

    fn fast_config() -> FanoutConfig {
        FanoutConfig {
            spawn_delay_ms: 0,
            ..Default::default()
        }
    }

    fn call_index() -> Arc<CallIndex> {
        Arc::new(
            vec![CallRecord {
                inbound_call_id: "98765".to_string(),
                call_uuid: CALL_UUID.to_string(),
            }]
            .into_iter()
            .collect(),
        )
    }

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn orchestrator(config: FanoutConfig, tracker: Arc<MockLeadTracker>) -> FanoutOrchestrator {
        FanoutOrchestrator::new(config, call_index(), TrackingFetcher::new(tracker))
    }

    #[tokio::test]
    async fn test_call_uuid_and_lead_id() {
        let tracker = Arc::new(MockLeadTracker::new());
        tracker.set_grid_id("12345", "777").await;
        tracker
            .set_detail("98765", fixtures::tracking_success("Calls Campaign"))
            .await;
        tracker
            .set_detail("777", fixtures::tracking_success("Web Campaign"))
            .await;

        let orch = orchestrator(fast_config(), tracker.clone());
        let report = orch.run(&ids(&[CALL_UUID, "12345"])).await.unwrap();

        let mut rows = report.records.clone();
        rows.sort_by_key(|r| r.position);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].lead_id, CALL_UUID);
        assert_eq!(rows[0].internal_id, "98765");
        assert_eq!(rows[0].campaign, "Calls Campaign");
        assert_eq!(rows[1].lead_id, "12345");
        assert_eq!(rows[1].internal_id, "777");
        assert_eq!(rows[1].campaign, "Web Campaign");

        // The call UUID went straight to tracking detail.
        assert_eq!(tracker.grid_lookups().await, vec!["12345"]);
    }

    #[tokio::test]
    async fn test_every_input_is_row_or_skip() {
        let tracker = Arc::new(MockLeadTracker::new());
        tracker.set_grid_id("100", "1000").await;
        tracker.set_grid_id("101", "1001").await;
        tracker.set_detail("1000", fixtures::tracking_success("A")).await;
        tracker
            .set_detail("1001", fixtures::tracking_failure("Access denied"))
            .await;
        tracker.set_detail("98765", fixtures::tracking_success("C")).await;

        let inputs = ids(&["100", "101", "102", UNKNOWN_UUID, CALL_UUID]);
        let orch = orchestrator(fast_config(), tracker);
        let report = orch.run(&inputs).await.unwrap();

        assert_eq!(
            report.records.len() + report.summary.skipped_leads.len(),
            inputs.len()
        );
        assert_eq!(report.summary.skipped_leads, vec![UNKNOWN_UUID]);
        assert_eq!(report.summary.empty_leads, vec!["102"]);
        assert_eq!(report.summary.partial_leads, vec!["101"]);
        assert!(report.records.iter().all(|r| r.lead_id != UNKNOWN_UUID));

        let empty = report.records.iter().find(|r| r.lead_id == "102").unwrap();
        assert_eq!(empty.internal_id, "");
        assert_eq!(empty.campaign, "");

        let partial = report.records.iter().find(|r| r.lead_id == "101").unwrap();
        assert_eq!(partial.internal_id, "1001");
        assert_eq!(partial.campaign, "");
        assert_eq!(partial.landing_page_url, "");
    }

    #[tokio::test]
    async fn test_rerun_yields_same_rows() {
        let tracker = Arc::new(MockLeadTracker::new());
        for i in 0..20 {
            tracker
                .set_grid_id(&format!("{}", 500 + i), &format!("{}", 9000 + i))
                .await;
            tracker
                .set_detail(&format!("{}", 9000 + i), fixtures::tracking_success("Promo"))
                .await;
        }
        let inputs: Vec<String> = (0..20).map(|i| format!("{}", 500 + i)).collect();
        let orch = orchestrator(fast_config(), tracker);

        let first: HashSet<_> = orch.run(&inputs).await.unwrap().records.into_iter().collect();
        let second: HashSet<_> = orch.run(&inputs).await.unwrap().records.into_iter().collect();
        assert_eq!(first.len(), 20);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_fatal_error_returns_partial_report() {
        let tracker = Arc::new(MockLeadTracker::new());
        tracker.set_grid_id("100", "1000").await;
        tracker.set_detail("1000", fixtures::tracking_success("A")).await;
        tracker.set_grid_error("101", TrackingError::SessionExpired(403)).await;
        tracker.set_grid_id("102", "1002").await;
        tracker.set_detail("1002", fixtures::tracking_success("B")).await;

        let config = FanoutConfig {
            spawn_delay_ms: 50,
            ..Default::default()
        };
        let orch = orchestrator(config, tracker);
        let failure = orch
            .run(&ids(&["100", "101", "102"]))
            .await
            .unwrap_err();

        match &failure.error {
            RunError::Tracking { lead_id, source } => {
                assert_eq!(lead_id, "101");
                assert!(matches!(source, TrackingError::SessionExpired(403)));
            }
            other => panic!("Expected Tracking error, got {:?}", other),
        }
        assert_eq!(failure.partial.summary.total_inputs, 3);
        assert!(failure
            .partial
            .records
            .iter()
            .any(|r| r.lead_id == "100" && r.campaign == "A"));
        assert!(failure.partial.records.iter().all(|r| r.lead_id != "101"));
    }

    #[tokio::test]
    async fn test_max_in_flight_caps_concurrency() {
        let tracker = Arc::new(MockLeadTracker::new());
        tracker.set_delay(Duration::from_millis(30)).await;
        let inputs: Vec<String> = (0..12).map(|i| format!("{}", 100 + i)).collect();
        for id in &inputs {
            tracker.set_grid_id(id, &format!("t{}", id)).await;
            tracker
                .set_detail(&format!("t{}", id), fixtures::tracking_success("X"))
                .await;
        }

        let config = FanoutConfig {
            spawn_delay_ms: 0,
            max_in_flight: 3,
            ..Default::default()
        };
        let orch = orchestrator(config, tracker.clone());
        let report = orch.run(&inputs).await.unwrap();

        assert_eq!(report.records.len(), 12);
        assert!(tracker.max_concurrent() <= 3);
        assert!(tracker.max_concurrent() >= 1);
    }

    #[tokio::test]
    async fn test_task_timeout_aborts_run() {
        let tracker = Arc::new(MockLeadTracker::new());
        tracker.set_delay(Duration::from_secs(5)).await;
        tracker.set_grid_id("100", "1000").await;

        let config = FanoutConfig {
            spawn_delay_ms: 0,
            task_timeout_secs: 1,
            ..Default::default()
        };
        let orch = orchestrator(config, tracker);
        let started = Instant::now();
        let failure = orch.run(&ids(&["100"])).await.unwrap_err();

        assert!(matches!(
            failure.error,
            RunError::TaskTimedOut { ref lead_id, timeout_secs: 1 } if lead_id == "100"
        ));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_shutdown_cancels_run() {
        let tracker = Arc::new(MockLeadTracker::new());
        tracker.set_delay(Duration::from_secs(10)).await;
        let inputs: Vec<String> = (0..5).map(|i| format!("{}", 100 + i)).collect();

        let orch = orchestrator(fast_config(), tracker);
        let shutdown = orch.shutdown_handle();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            shutdown.shutdown();
        });

        let started = Instant::now();
        let failure = orch.run(&inputs).await.unwrap_err();
        assert!(matches!(failure.error, RunError::Cancelled));
        assert!(failure.partial.records.is_empty());
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_shutdown_before_run_is_kept() {
        let tracker = Arc::new(MockLeadTracker::new());
        let orch = orchestrator(fast_config(), tracker.clone());
        orch.shutdown_handle().shutdown();

        let failure = orch.run(&ids(&["100", "101"])).await.unwrap_err();
        assert!(matches!(failure.error, RunError::Cancelled));
        assert!(tracker.grid_lookups().await.is_empty());
    }

    #[tokio::test]
    async fn test_spawn_delay_paces_dispatch() {
        let tracker = Arc::new(MockLeadTracker::new());
        let config = FanoutConfig {
            spawn_delay_ms: 40,
            ..Default::default()
        };
        let orch = orchestrator(config, tracker);

        let started = Instant::now();
        let report = orch.run(&ids(&["1", "2", "3"])).await.unwrap();
        assert_eq!(report.records.len(), 3);
        assert!(started.elapsed() >= Duration::from_millis(120));
    }

    #[tokio::test]
    async fn test_progress_events() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let events_cb = Arc::clone(&events);
        let callback: ProgressCallback = Arc::new(move |event: RunProgress| {
            events_cb.lock().unwrap().push(event);
        });

        let tracker = Arc::new(MockLeadTracker::new());
        let orch = orchestrator(fast_config(), tracker).with_progress_callback(callback);
        orch.run(&ids(&["1", UNKNOWN_UUID, CALL_UUID])).await.unwrap();

        let events = events.lock().unwrap();
        let spawned: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                RunProgress::Spawned {
                    index, via_call, ..
                } => Some((*index, *via_call)),
                _ => None,
            })
            .collect();
        assert_eq!(spawned, vec![(0, false), (2, true)]);

        let completed = events
            .iter()
            .filter(|e| matches!(e, RunProgress::Completed { .. }))
            .count();
        assert_eq!(completed, 3);
        assert!(events.iter().any(|e| matches!(
            e,
            RunProgress::Completed { processed: 3, total: 3, .. }
        )));
    }

    #[tokio::test]
    async fn test_empty_input() {
        let tracker = Arc::new(MockLeadTracker::new());
        let orch = orchestrator(fast_config(), tracker);
        let report = orch.run(&[]).await.unwrap();
        assert!(report.records.is_empty());
        assert_eq!(report.summary.total_inputs, 0);
    }
}
