//! Result collection and CSV output.
//!
//! Fan-out tasks never touch shared state: they send their results through a
//! [`ReportHandle`] to a single [`ReportCollector`], which owns the record set
//! and the empty/skipped/partial counters for the whole run.

mod collector;
mod csv;
mod types;

pub use self::csv::{partial_output_path, write_report, write_report_file};
pub use collector::*;
pub use types::*;
