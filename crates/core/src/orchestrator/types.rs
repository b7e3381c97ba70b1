//! Types for the fan-out orchestrator.

use std::sync::Arc;

use thiserror::Error;

use crate::report::RunReport;

/// Errors that abort a run.
#[derive(Debug, Error)]
pub enum RunError {
    /// Calls feed error.
    #[error("calls feed error: {0}")]
    Calls(#[from] crate::calls::CallsError),

    /// Tracking API error.
    #[error("tracking error for lead {lead_id}: {source}")]
    Tracking {
        lead_id: String,
        #[source]
        source: crate::tracking::TrackingError,
    },

    /// A lead exceeded the per-task timeout.
    #[error("lookup for lead {lead_id} timed out after {timeout_secs}s")]
    TaskTimedOut { lead_id: String, timeout_secs: u64 },

    /// A fan-out task panicked.
    #[error("lookup task failed: {0}")]
    TaskPanicked(String),

    /// The run was cancelled through its shutdown channel.
    #[error("run cancelled")]
    Cancelled,
}

/// A failed run together with everything collected before the failure.
#[derive(Debug)]
pub struct RunFailure {
    pub error: RunError,
    pub partial: RunReport,
}

impl std::fmt::Display for RunFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({} of {} leads processed)",
            self.error,
            self.partial.processed(),
            self.partial.summary.total_inputs
        )
    }
}

impl std::error::Error for RunFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Progress notifications for the operator readout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunProgress {
    /// A lookup task was started for the identifier at `index`.
    Spawned {
        index: usize,
        total: usize,
        lead_id: String,
        /// The identifier was a call UUID resolved through the call index.
        via_call: bool,
    },
    /// Tracking detail failed for a lead; its row has blank content.
    Partial { lead_id: String, message: String },
    /// An identifier was fully accounted for (row written or skipped).
    Completed {
        lead_id: String,
        processed: usize,
        total: usize,
    },
}

/// Callback invoked with every [`RunProgress`] event.
pub type ProgressCallback = Arc<dyn Fn(RunProgress) + Send + Sync>;
