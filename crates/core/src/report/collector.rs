//! Single-owner collection of fan-out results.

use tokio::sync::mpsc;

use crate::orchestrator::{ProgressCallback, RunProgress};
use crate::tracking::TrackingOutcome;

use super::{RunReport, RunSummary, TrackingRecord};

/// Message sent by fan-out tasks to the collector
#[derive(Debug, Clone)]
pub enum ReportEvent {
    /// A fetched lead, including empty and partial ones.
    Record {
        record: TrackingRecord,
        outcome: OutcomeKind,
    },
    /// An identifier that could not be resolved.
    Skipped { position: usize, lead_id: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeKind {
    Complete,
    Empty,
    /// Tracking detail failed with the server's message.
    Partial { message: String },
}

impl From<&TrackingOutcome> for OutcomeKind {
    fn from(outcome: &TrackingOutcome) -> Self {
        match outcome {
            TrackingOutcome::Complete { .. } => OutcomeKind::Complete,
            TrackingOutcome::Partial { message, .. } => OutcomeKind::Partial {
                message: message.clone(),
            },
            TrackingOutcome::Empty => OutcomeKind::Empty,
        }
    }
}

/// Handle for submitting results
///
/// Cheaply cloneable; every fan-out task gets its own copy.
#[derive(Clone)]
pub struct ReportHandle {
    tx: mpsc::Sender<ReportEvent>,
}

impl ReportHandle {
    pub fn new(tx: mpsc::Sender<ReportEvent>) -> Self {
        Self { tx }
    }

    /// Submit the outcome of a fetched lead.
    pub async fn record(&self, position: usize, lead_id: &str, outcome: &TrackingOutcome) {
        self.send(ReportEvent::Record {
            record: TrackingRecord::from_outcome(position, lead_id, outcome),
            outcome: outcome.into(),
        })
        .await;
    }

    /// Submit an unresolvable identifier.
    pub async fn skipped(&self, position: usize, lead_id: &str) {
        self.send(ReportEvent::Skipped {
            position,
            lead_id: lead_id.to_string(),
        })
        .await;
    }

    async fn send(&self, event: ReportEvent) {
        if let Err(e) = self.tx.send(event).await {
            tracing::error!("Failed to submit report event: {}", e);
        }
    }
}

/// Single owner of the record set and the run counters
pub struct ReportCollector {
    rx: mpsc::Receiver<ReportEvent>,
    report: RunReport,
    progress: Option<ProgressCallback>,
}

impl ReportCollector {
    pub fn new(
        rx: mpsc::Receiver<ReportEvent>,
        total_inputs: usize,
        progress: Option<ProgressCallback>,
    ) -> Self {
        Self {
            rx,
            report: RunReport {
                records: Vec::new(),
                summary: RunSummary {
                    total_inputs,
                    ..Default::default()
                },
            },
            progress,
        }
    }

    /// Consume events until every handle is dropped, then return the report.
    pub async fn run(mut self) -> RunReport {
        while let Some(event) = self.rx.recv().await {
            let lead_id = match event {
                ReportEvent::Record { record, outcome } => {
                    let lead_id = record.lead_id.clone();
                    match outcome {
                        OutcomeKind::Complete => {}
                        OutcomeKind::Empty => {
                            self.report.summary.empty_leads.push(lead_id.clone());
                        }
                        OutcomeKind::Partial { message } => {
                            self.report.summary.partial_leads.push(lead_id.clone());
                            if let Some(progress) = &self.progress {
                                progress(RunProgress::Partial {
                                    lead_id: lead_id.clone(),
                                    message,
                                });
                            }
                        }
                    }
                    self.report.records.push(record);
                    lead_id
                }
                ReportEvent::Skipped { lead_id, .. } => {
                    self.report.summary.skipped_leads.push(lead_id.clone());
                    lead_id
                }
            };

            if let Some(progress) = &self.progress {
                progress(RunProgress::Completed {
                    lead_id,
                    processed: self.report.processed(),
                    total: self.report.summary.total_inputs,
                });
            }
        }

        self.report
    }
}

/// Create a handle/collector pair
///
/// Spawn the collector with `tokio::spawn(collector.run())` and clone the
/// handle into each task. The collector finishes once all handles are dropped.
pub fn create_report_system(
    total_inputs: usize,
    buffer_size: usize,
    progress: Option<ProgressCallback>,
) -> (ReportHandle, ReportCollector) {
    let (tx, rx) = mpsc::channel(buffer_size);
    (
        ReportHandle::new(tx),
        ReportCollector::new(rx, total_inputs, progress),
    )
}
