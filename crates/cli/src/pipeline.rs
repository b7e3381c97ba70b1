//! End-to-end reconciliation: call index, fan-out, CSV.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use leadsub_core::{
    partial_output_path, write_report_file, CallsFeed, Config, FanoutOrchestrator, LeadTracker,
    Paginator, ProgressCallback, RunReport, TrackingFetcher,
};

/// Result of a completed run.
#[derive(Debug)]
pub struct RunOutcome {
    pub report: RunReport,
    /// Where the CSV was written.
    pub output_path: PathBuf,
    /// Calls loaded into the index before fan-out.
    pub calls_indexed: usize,
    pub elapsed: Duration,
}

impl RunOutcome {
    /// End-of-run summary for the operator.
    pub fn summary(&self) -> String {
        let summary = &self.report.summary;
        format!(
            "empty leads {}\nskipped leads {}\npartial leads {}\ntotal leads processed: {}\ntotal runtime: {:.2} minutes",
            summary.empty_leads.len(),
            summary.skipped_leads.len(),
            summary.partial_leads.len(),
            self.report.records.len(),
            self.elapsed.as_secs_f64() / 60.0
        )
    }
}

/// Wires the calls feed and the tracking API into a single run.
pub struct Reconciler {
    config: Config,
    feed: Arc<dyn CallsFeed>,
    tracker: Arc<dyn LeadTracker>,
    progress: Option<ProgressCallback>,
}

impl Reconciler {
    pub fn new(config: Config, feed: Arc<dyn CallsFeed>, tracker: Arc<dyn LeadTracker>) -> Self {
        Self {
            config,
            feed,
            tracker,
            progress: None,
        }
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Build the call index, fan out over `ids` and write the CSV.
    ///
    /// `shutdown` cancels the fan-out when it resolves. If the fan-out fails,
    /// the rows collected so far are written next to the output file and the
    /// returned error wraps the [`leadsub_core::RunFailure`].
    pub async fn run<S>(&self, ids: &[String], shutdown: S) -> Result<RunOutcome>
    where
        S: Future<Output = ()> + Send + 'static,
    {
        let started = Instant::now();

        let paginator = Paginator::new(Arc::clone(&self.feed), self.config.calls.max_page_size);
        let index = paginator
            .fetch_all(&self.config.calls.windows)
            .await
            .context("Failed to build call index")?;
        let calls_indexed = index.len();
        info!(calls = calls_indexed, "Total calls found");

        let mut orchestrator = FanoutOrchestrator::new(
            self.config.fanout.clone(),
            Arc::new(index),
            TrackingFetcher::new(Arc::clone(&self.tracker)),
        );
        if let Some(progress) = &self.progress {
            orchestrator = orchestrator.with_progress_callback(Arc::clone(progress));
        }

        let shutdown_handle = orchestrator.shutdown_handle();
        let signal_task = tokio::spawn(async move {
            shutdown.await;
            warn!("Shutdown requested, cancelling run");
            shutdown_handle.shutdown();
        });

        let result = orchestrator.run(ids).await;
        signal_task.abort();

        let output_path = self.config.output.path.clone();
        let row_order = self.config.output.row_order;

        match result {
            Ok(report) => {
                write_report_file(&output_path, &report.ordered_records(row_order))
                    .with_context(|| format!("Failed to write report to {:?}", output_path))?;

                Ok(RunOutcome {
                    report,
                    output_path,
                    calls_indexed,
                    elapsed: started.elapsed(),
                })
            }
            Err(failure) => {
                let partial_path = partial_output_path(&output_path);
                let rows = failure.partial.ordered_records(row_order);
                match write_report_file(&partial_path, &rows) {
                    Ok(()) => warn!(
                        path = %partial_path.display(),
                        rows = rows.len(),
                        "Partial report written"
                    ),
                    Err(e) => error!("Failed to write partial report: {}", e),
                }

                Err(anyhow::Error::new(failure).context("Reconciliation aborted"))
            }
        }
    }
}
