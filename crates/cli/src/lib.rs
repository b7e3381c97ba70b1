//! Reconciliation pipeline and operator readout for the `leadsub` binary.

pub mod pipeline;
pub mod progress;

pub use pipeline::{Reconciler, RunOutcome};
pub use progress::ProgressReadout;
