//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the calls feed and the
//! tracking API, allowing full reconciliation runs without network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use leadsub_core::testing::{fixtures, MockCallsFeed, MockLeadTracker};
//!
//! let feed = MockCallsFeed::new();
//! let tracker = MockLeadTracker::new();
//!
//! // Configure mock responses
//! feed.set_window_calls("2020-01-01", vec![fixtures::call_record("98765", uuid)]).await;
//! tracker.set_grid_id("12345", "777").await;
//! tracker.set_detail("777", fixtures::tracking_success("Spring Promo")).await;
//! ```

mod mock_calls_feed;
mod mock_lead_tracker;

pub use mock_calls_feed::MockCallsFeed;
pub use mock_lead_tracker::MockLeadTracker;

/// Test fixtures and helper functions.
pub mod fixtures {
    use serde_json::json;

    use crate::calls::CallRecord;
    use crate::tracking::TrackingDetailResponse;

    /// Create a call record.
    pub fn call_record(inbound_call_id: &str, call_uuid: &str) -> CallRecord {
        CallRecord {
            inbound_call_id: inbound_call_id.to_string(),
            call_uuid: call_uuid.to_string(),
        }
    }

    /// Successful tracking detail with URLs derived from the campaign name.
    pub fn tracking_success(campaign: &str) -> TrackingDetailResponse {
        let slug = campaign.to_lowercase().replace(' ', "-");
        TrackingDetailResponse {
            success: true,
            data: json!({
                "campaignName": campaign,
                "response": r#"{"result":"success","msg":"Lead accepted","lead_id":"1","price":"5.00"}"#,
                "requestURL": format!("https://post.example.com/{}", slug),
                "landingPageURL": format!("https://landing.example.com/{}", slug),
                "referralURL": "https://www.google.com/",
            }),
            msg: None,
        }
    }

    /// Tracking detail that reports failure with `msg`.
    pub fn tracking_failure(msg: &str) -> TrackingDetailResponse {
        TrackingDetailResponse {
            success: false,
            data: serde_json::Value::Null,
            msg: Some(msg.to_string()),
        }
    }
}
