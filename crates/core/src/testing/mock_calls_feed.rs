//! Mock calls feed for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::calls::{CallRecord, CallsError, CallsFeed, CallsPage, CallsQuery};

/// Mock implementation of the CallsFeed trait.
///
/// Serves per-window call lists the way the real endpoint does:
/// - `total` always reports the full window size
/// - `data` is the `start..start+limit` slice of the window
/// - windows without configured calls are empty
///
/// # Example
///
/// ```rust,ignore
/// use leadsub_core::testing::MockCallsFeed;
///
/// let feed = MockCallsFeed::new();
/// feed.set_window_calls("2020-01-01", MockCallsFeed::generate_calls("jan", 2500)).await;
///
/// let paginator = Paginator::new(Arc::new(feed), 1000);
/// let index = paginator.fetch_all(&["2020-01-01".into()]).await?;
/// assert_eq!(index.len(), 2500);
/// ```
#[derive(Debug, Default)]
pub struct MockCallsFeed {
    /// Calls served per window.
    windows: Arc<RwLock<HashMap<String, Vec<CallRecord>>>>,
    /// Recorded queries, in request order.
    queries: Arc<RwLock<Vec<CallsQuery>>>,
    /// Errors returned by the next query for a window.
    failures: Arc<RwLock<HashMap<String, CallsError>>>,
}

impl MockCallsFeed {
    /// Create a new mock feed with no calls.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the calls served for `window`.
    pub async fn set_window_calls(&self, window: &str, calls: Vec<CallRecord>) {
        self.windows
            .write()
            .await
            .insert(window.to_string(), calls);
    }

    /// Make the next query for `window` fail with `error`.
    pub async fn fail_window(&self, window: &str, error: CallsError) {
        self.failures
            .write()
            .await
            .insert(window.to_string(), error);
    }

    /// Get all queries made so far.
    pub async fn recorded_queries(&self) -> Vec<CallsQuery> {
        self.queries.read().await.clone()
    }

    /// Build `count` calls with IDs `{prefix}-{i}` and matching UUIDs.
    pub fn generate_calls(prefix: &str, count: usize) -> Vec<CallRecord> {
        (0..count)
            .map(|i| CallRecord {
                inbound_call_id: format!("{}-{}", prefix, i),
                call_uuid: format!("{}-uuid-{:012}", prefix, i),
            })
            .collect()
    }
}

#[async_trait]
impl CallsFeed for MockCallsFeed {
    async fn fetch_page(&self, query: &CallsQuery) -> Result<CallsPage, CallsError> {
        self.queries.write().await.push(query.clone());

        if let Some(error) = self.failures.write().await.remove(&query.from) {
            return Err(error);
        }

        let windows = self.windows.read().await;
        let calls = windows.get(&query.from).map(Vec::as_slice).unwrap_or(&[]);

        let start = (query.start as usize).min(calls.len());
        let end = (start + query.limit as usize).min(calls.len());

        Ok(CallsPage {
            start: query.start,
            limit: query.limit,
            total: calls.len() as u32,
            data: calls[start..end].to_vec(),
        })
    }
}
