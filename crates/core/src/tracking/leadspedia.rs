//! Leadspedia application endpoints used for lead tracking.
//!
//! These are not part of the public API. They are authenticated with the
//! cookie of a logged-in browser session, passed verbatim in `Cookie`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::COOKIE;
use reqwest::{Client, Response, StatusCode};
use tracing::debug;

use crate::config::TrackingConfig;

use super::{GridLeadFilter, GridLeadResponse, LeadTracker, TrackingDetailResponse, TrackingError};

const GRID_LEADS_PATH: &str = "/app/data/leads/Grid-Leads.php";
const FORM_TRACKING_PATH: &str = "/app/data/leads/Form-Tracking.php";

/// Session-authenticated tracking client.
pub struct LeadspediaTrackingClient {
    client: Client,
    config: TrackingConfig,
}

impl LeadspediaTrackingClient {
    pub fn new(config: TrackingConfig) -> Result<Self, TrackingError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| TrackingError::ConnectionFailed(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn base_url(&self) -> &str {
        self.config.url.trim_end_matches('/')
    }

    fn build_grid_url(&self, lead_id: &str) -> Result<String, TrackingError> {
        let filter = serde_json::to_string(&[GridLeadFilter::lead_id(lead_id)])
            .map_err(|e| TrackingError::Decode(e.to_string()))?;

        Ok(format!(
            "{}{}?filter={}",
            self.base_url(),
            GRID_LEADS_PATH,
            urlencoding::encode(&filter)
        ))
    }
}

fn map_send_error(e: reqwest::Error) -> TrackingError {
    if e.is_timeout() {
        TrackingError::Timeout
    } else if e.is_connect() {
        TrackingError::ConnectionFailed(e.to_string())
    } else {
        TrackingError::ApiError(e.to_string())
    }
}

/// Reject responses that mean the session is no longer valid.
fn check_session(response: &Response) -> Result<(), TrackingError> {
    match response.status() {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Err(TrackingError::SessionExpired(response.status().as_u16()))
        }
        _ => Ok(()),
    }
}

#[async_trait]
impl LeadTracker for LeadspediaTrackingClient {
    async fn grid_lookup(&self, lead_id: &str) -> Result<Option<String>, TrackingError> {
        let url = self.build_grid_url(lead_id)?;
        debug!(lead_id = lead_id, "Grid lookup");

        let response = self
            .client
            .get(&url)
            .header(COOKIE, &self.config.session_cookie)
            .send()
            .await
            .map_err(map_send_error)?;
        check_session(&response)?;

        let body = response.bytes().await.map_err(map_send_error)?;
        match serde_json::from_slice::<GridLeadResponse>(&body) {
            Ok(parsed) => Ok(parsed.first_id()),
            Err(e) => {
                debug!(lead_id = lead_id, error = %e, "Undecodable grid response");
                Ok(None)
            }
        }
    }

    async fn tracking_detail(
        &self,
        true_id: &str,
    ) -> Result<TrackingDetailResponse, TrackingError> {
        let url = format!("{}{}", self.base_url(), FORM_TRACKING_PATH);
        debug!(true_id = true_id, "Fetching tracking detail");

        let response = self
            .client
            .post(&url)
            .header(COOKIE, &self.config.session_cookie)
            .form(&[("id", true_id)])
            .send()
            .await
            .map_err(map_send_error)?;
        check_session(&response)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TrackingError::ApiError(format!(
                "HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        response
            .json::<TrackingDetailResponse>()
            .await
            .map_err(|e| TrackingError::Decode(e.to_string()))
    }
}
