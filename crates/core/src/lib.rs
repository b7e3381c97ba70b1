pub mod calls;
pub mod config;
pub mod input;
pub mod orchestrator;
pub mod report;
pub mod resolver;
pub mod testing;
pub mod tracking;

pub use calls::{CallIndex, CallRecord, CallsError, CallsFeed, LeadspediaCallsClient, Paginator};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, RowOrder,
    SanitizedConfig,
};
pub use input::{load_ids, parse_ids, InputError};
pub use orchestrator::{
    FanoutConfig, FanoutOrchestrator, ProgressCallback, RunError, RunFailure, RunProgress,
    ShutdownHandle,
};
pub use report::{
    partial_output_path, write_report, write_report_file, ReportError, RunReport, RunSummary,
    TrackingRecord,
};
pub use resolver::{is_call_uuid, resolve, Resolution};
pub use tracking::{
    LeadTracker, LeadspediaTrackingClient, TrackingError, TrackingFetcher, TrackingOutcome,
};
