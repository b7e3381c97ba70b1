//! Common test utilities for end-to-end runs with mocks.
//!
//! Provides a fixture with a mock calls feed, a mock tracking API and a
//! temporary output directory, so full reconciliation runs need no network.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use leadsub_cli::Reconciler;
use leadsub_core::testing::{MockCallsFeed, MockLeadTracker};
use leadsub_core::{load_config_from_str, Config};

/// Re-export fixtures for test convenience
pub use leadsub_core::testing::fixtures;

pub const WINDOW: &str = "2020-01-01";
pub const CALL_UUID: &str = "550e8400-e29b-41d4-a716-446655440000";
pub const CALL_ID: &str = "98765";

const TEST_CONFIG: &str = r#"
[calls]
url = "http://calls.invalid"
api_key = "test-key"
api_secret = "test-secret"
max_page_size = 2
windows = ["2020-01-01"]

[tracking]
url = "http://tracking.invalid"
session_cookie = "PHPSESSID=test"

[fanout]
spawn_delay_ms = 0
"#;

/// Test fixture for end-to-end runs with mock dependencies.
pub struct TestFixture {
    pub config: Config,
    /// Mock calls feed - configure call windows
    pub feed: Arc<MockCallsFeed>,
    /// Mock tracking API - configure grid and tracking responses
    pub tracker: Arc<MockLeadTracker>,
    /// Temporary directory holding the output CSV
    pub temp_dir: TempDir,
}

impl TestFixture {
    /// Create a fixture whose call index contains [`CALL_UUID`] -> [`CALL_ID`].
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let mut config = load_config_from_str(TEST_CONFIG).expect("Invalid test config");
        config.output.path = temp_dir.path().join("leads.csv");

        let feed = Arc::new(MockCallsFeed::new());
        let mut calls = MockCallsFeed::generate_calls("filler", 3);
        calls.push(fixtures::call_record(CALL_ID, CALL_UUID));
        feed.set_window_calls(WINDOW, calls).await;

        Self {
            config,
            feed,
            tracker: Arc::new(MockLeadTracker::new()),
            temp_dir,
        }
    }

    pub fn reconciler(&self) -> Reconciler {
        Reconciler::new(self.config.clone(), self.feed.clone(), self.tracker.clone())
    }

    pub fn output_path(&self) -> PathBuf {
        self.config.output.path.clone()
    }

    pub fn partial_path(&self) -> PathBuf {
        self.temp_dir.path().join("leads.partial.csv")
    }
}

pub fn ids(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

/// Read a CSV file into header and rows.
pub fn read_csv(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
    let mut reader = csv::Reader::from_path(path).expect("Failed to open CSV");
    let header = reader
        .headers()
        .expect("Missing header")
        .iter()
        .map(str::to_string)
        .collect();
    let rows = reader
        .records()
        .map(|r| r.expect("Bad row").iter().map(str::to_string).collect())
        .collect();
    (header, rows)
}
