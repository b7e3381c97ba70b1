//! Fan-out orchestrator for tracking lookups.
//!
//! The orchestrator turns an ordered list of external identifiers into rows:
//! - **Resolution**: Sequential, against the call index
//! - **Lookups**: Concurrent, one task per resolved identifier
//! - **Collection**: Single collector task (see [`crate::report`])

mod config;
mod runner;
mod types;

pub use config::FanoutConfig;
pub use runner::{FanoutOrchestrator, ShutdownHandle};
pub use types::{ProgressCallback, RunError, RunFailure, RunProgress};
