//! Types for the non-public lead tracking API.

use async_trait::async_trait;
use serde::{de, Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Structured filter accepted by the grid lookup endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GridLeadFilter {
    pub property: String,
    pub value: String,
}

impl GridLeadFilter {
    /// Filter on the public lead ID.
    pub fn lead_id(value: &str) -> Self {
        Self {
            property: "leadID".to_string(),
            value: value.to_string(),
        }
    }
}

/// Response of `Grid-Leads.php`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GridLeadResponse {
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub data: Vec<GridLeadData>,
}

impl GridLeadResponse {
    /// The true lead ID of the first row, if there is a usable one.
    pub fn first_id(&self) -> Option<String> {
        self.data
            .first()
            .map(|row| row.id.trim())
            .filter(|id| !id.is_empty())
            .map(String::from)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GridLeadData {
    /// The vendor's internal ("true") lead ID.
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(rename = "leadID", default, deserialize_with = "string_or_number")]
    pub lead_id: String,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        other => Err(de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}

/// Response of `Form-Tracking.php`.
///
/// `data` is kept as raw JSON because failed responses do not carry a
/// tracking object there.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrackingDetailResponse {
    /// Missing means failure.
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default)]
    pub msg: Option<String>,
}

impl TrackingDetailResponse {
    /// Decode the tracking attributes of a successful response.
    ///
    /// Missing or null `data` yields blank fields.
    pub fn fields(&self) -> Result<TrackingFields, TrackingError> {
        if self.data.is_null() {
            return Ok(TrackingFields::default());
        }

        let detail: TrackingDetail = serde_json::from_value(self.data.clone())
            .map_err(|e| TrackingError::Decode(format!("tracking data: {}", e)))?;
        Ok(detail.into())
    }
}

/// Tracking object as sent by the API; any field may be null or missing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrackingDetail {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(rename = "campaignName", default)]
    pub campaign_name: Option<String>,
    #[serde(rename = "requestURL", default)]
    pub request_url: Option<String>,
    #[serde(rename = "landingPageURL", default)]
    pub landing_page_url: Option<String>,
    #[serde(rename = "referralURL", default)]
    pub referral_url: Option<String>,
}

/// Normalized tracking attributes of a lead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingFields {
    pub campaign: String,
    /// Raw text the platform answered to the lead poster.
    pub response: String,
    pub landing_page_url: String,
    pub referral_url: String,
    pub request_url: String,
}

impl From<TrackingDetail> for TrackingFields {
    fn from(detail: TrackingDetail) -> Self {
        Self {
            campaign: detail.campaign_name.unwrap_or_default(),
            response: detail.response.unwrap_or_default(),
            landing_page_url: detail.landing_page_url.unwrap_or_default(),
            referral_url: detail.referral_url.unwrap_or_default(),
            request_url: detail.request_url.unwrap_or_default(),
        }
    }
}

impl TrackingFields {
    /// Decode the posting response, when the platform stored it as JSON.
    pub fn posting_response(&self) -> Option<PostingResponse> {
        serde_json::from_str(&self.response).ok()
    }
}

/// What the platform answered when the lead was originally posted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostingResponse {
    #[serde(default)]
    pub result: String,
    #[serde(default)]
    pub msg: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub lead_id: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub price: String,
    #[serde(default)]
    pub errors: Vec<PostingError>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostingError {
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub error: String,
}

/// Result of fetching one lead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackingOutcome {
    /// Tracking detail was returned.
    Complete {
        internal_id: String,
        fields: TrackingFields,
    },
    /// The true ID is known but the tracking detail request reported failure.
    Partial { internal_id: String, message: String },
    /// Grid lookup produced no true ID.
    Empty,
}

impl TrackingOutcome {
    pub fn internal_id(&self) -> &str {
        match self {
            TrackingOutcome::Complete { internal_id, .. }
            | TrackingOutcome::Partial { internal_id, .. } => internal_id,
            TrackingOutcome::Empty => "",
        }
    }
}

/// Errors from the tracking API. All of them abort the run.
#[derive(Debug, Error)]
pub enum TrackingError {
    #[error("Tracking API connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Tracking API error: {0}")]
    ApiError(String),

    #[error("Failed to decode tracking response: {0}")]
    Decode(String),

    #[error("Tracking session rejected (HTTP {0}), refresh the session cookie")]
    SessionExpired(u16),

    #[error("Request timeout")]
    Timeout,
}

/// The two tracking API calls.
#[async_trait]
pub trait LeadTracker: Send + Sync {
    /// Translate a lead ID into the vendor's true lead ID.
    ///
    /// `Ok(None)` when the grid has no usable row or the body cannot be decoded.
    async fn grid_lookup(&self, lead_id: &str) -> Result<Option<String>, TrackingError>;

    /// Fetch tracking detail for a true lead ID.
    async fn tracking_detail(&self, true_id: &str)
        -> Result<TrackingDetailResponse, TrackingError>;
}
