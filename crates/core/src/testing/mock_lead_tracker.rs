//! Mock lead tracker for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::tracking::{LeadTracker, TrackingDetailResponse, TrackingError};

/// Mock implementation of the LeadTracker trait.
///
/// Provides controllable behavior for testing:
/// - Map external lead IDs to true IDs for grid lookups
/// - Serve tracking detail responses per true ID
/// - Track requests for assertions
/// - Simulate failures and slow grid lookups
///
/// Unknown lead IDs produce an empty grid lookup. Unknown true IDs produce a
/// tracking detail with `success: false`.
#[derive(Debug, Default)]
pub struct MockLeadTracker {
    /// External lead ID -> true ID.
    grid: Arc<RwLock<HashMap<String, String>>>,
    /// Errors returned by the next grid lookup for a lead.
    grid_errors: Arc<RwLock<HashMap<String, TrackingError>>>,
    /// True ID -> tracking detail response.
    details: Arc<RwLock<HashMap<String, TrackingDetailResponse>>>,
    /// If set, the next tracking detail call fails with this error.
    next_detail_error: Arc<RwLock<Option<TrackingError>>>,
    /// Delay applied to each grid lookup.
    delay: Arc<RwLock<Option<Duration>>>,
    /// Recorded grid lookups.
    grid_lookups: Arc<RwLock<Vec<String>>>,
    /// Recorded tracking detail requests.
    detail_requests: Arc<RwLock<Vec<String>>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockLeadTracker {
    /// Create a new mock tracker with no leads.
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `lead_id` to `true_id` in the grid.
    pub async fn set_grid_id(&self, lead_id: &str, true_id: &str) {
        self.grid
            .write()
            .await
            .insert(lead_id.to_string(), true_id.to_string());
    }

    /// Make the next grid lookup for `lead_id` fail.
    pub async fn set_grid_error(&self, lead_id: &str, error: TrackingError) {
        self.grid_errors
            .write()
            .await
            .insert(lead_id.to_string(), error);
    }

    /// Set the tracking detail response for `true_id`.
    pub async fn set_detail(&self, true_id: &str, response: TrackingDetailResponse) {
        self.details
            .write()
            .await
            .insert(true_id.to_string(), response);
    }

    /// Make the next tracking detail call fail.
    pub async fn fail_detail(&self, error: TrackingError) {
        *self.next_detail_error.write().await = Some(error);
    }

    /// Delay every grid lookup by `delay`.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }

    /// Get all grid lookups made so far.
    pub async fn grid_lookups(&self) -> Vec<String> {
        self.grid_lookups.read().await.clone()
    }

    /// Get all tracking detail requests made so far.
    pub async fn detail_requests(&self) -> Vec<String> {
        self.detail_requests.read().await.clone()
    }

    /// Highest number of grid lookups observed running at once.
    pub fn max_concurrent(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LeadTracker for MockLeadTracker {
    async fn grid_lookup(&self, lead_id: &str) -> Result<Option<String>, TrackingError> {
        self.grid_lookups.write().await.push(lead_id.to_string());

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(error) = self.grid_errors.write().await.remove(lead_id) {
            return Err(error);
        }

        Ok(self.grid.read().await.get(lead_id).cloned())
    }

    async fn tracking_detail(&self, true_id: &str) -> Result<TrackingDetailResponse, TrackingError> {
        self.detail_requests.write().await.push(true_id.to_string());

        if let Some(error) = self.next_detail_error.write().await.take() {
            return Err(error);
        }

        Ok(self
            .details
            .read()
            .await
            .get(true_id)
            .cloned()
            .unwrap_or_else(|| super::fixtures::tracking_failure("Lead not found")))
    }
}
