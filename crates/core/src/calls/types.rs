//! Types for the public inbound calls feed.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// A single inbound call as reported by the public calls feed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CallRecord {
    /// Short vendor-assigned ID, usable with the tracking API.
    #[serde(rename = "inboundCallID")]
    pub inbound_call_id: String,
    /// 36-character call UUID.
    #[serde(rename = "callUUID")]
    pub call_uuid: String,
}

/// Ordered, append-only collection of calls with a UUID lookup table.
///
/// Duplicate UUIDs are kept in the ordered list; lookups always resolve to
/// the first record appended for a UUID.
#[derive(Debug, Clone, Default)]
pub struct CallIndex {
    calls: Vec<CallRecord>,
    by_uuid: HashMap<String, usize>,
}

impl CallIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a page of records in response order.
    pub fn extend<I: IntoIterator<Item = CallRecord>>(&mut self, records: I) {
        for record in records {
            let position = self.calls.len();
            self.by_uuid
                .entry(record.call_uuid.clone())
                .or_insert(position);
            self.calls.push(record);
        }
    }

    /// Find the first call with the given UUID.
    pub fn find(&self, call_uuid: &str) -> Option<&CallRecord> {
        self.by_uuid.get(call_uuid).map(|&i| &self.calls[i])
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CallRecord> {
        self.calls.iter()
    }
}

impl FromIterator<CallRecord> for CallIndex {
    fn from_iter<I: IntoIterator<Item = CallRecord>>(iter: I) -> Self {
        let mut index = CallIndex::new();
        index.extend(iter);
        index
    }
}

/// One request against the calls feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallsQuery {
    /// Window start date ("YYYY-MM-DD").
    pub from: String,
    /// Paging offset.
    pub start: u32,
    /// Page size.
    pub limit: u32,
}

/// Envelope returned by `inboundCalls/getAll.do`.
#[derive(Debug, Clone, Deserialize)]
pub struct CallsResponse {
    pub success: bool,
    #[serde(default)]
    pub response: Option<CallsPage>,
    #[serde(default)]
    pub message: Option<String>,
}

/// A page of calls.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallsPage {
    #[serde(default)]
    pub start: u32,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub data: Vec<CallRecord>,
}

/// Errors from the calls feed. All of them abort the run.
#[derive(Debug, Error)]
pub enum CallsError {
    #[error("Calls API connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Calls API error: {0}")]
    ApiError(String),

    #[error("Failed to decode calls response: {0}")]
    Decode(String),

    #[error("Calls API rejected request for window {window}: {message}")]
    Rejected { window: String, message: String },

    #[error("Request timeout")]
    Timeout,
}

/// Source of call pages.
#[async_trait]
pub trait CallsFeed: Send + Sync {
    /// Fetch one page of calls for a window.
    async fn fetch_page(&self, query: &CallsQuery) -> Result<CallsPage, CallsError>;
}
