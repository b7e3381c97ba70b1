//! Leadspedia public API client for inbound calls.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::config::CallsConfig;

use super::{CallsError, CallsFeed, CallsPage, CallsQuery, CallsResponse};

/// Client for `core/v2/inboundCalls/getAll.do`.
pub struct LeadspediaCallsClient {
    client: Client,
    config: CallsConfig,
}

impl LeadspediaCallsClient {
    pub fn new(config: CallsConfig) -> Result<Self, CallsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| CallsError::ConnectionFailed(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn build_url(&self, query: &CallsQuery) -> String {
        format!(
            "{}/core/v2/inboundCalls/getAll.do?api_key={}&api_secret={}&fromDate={}&start={}&limit={}",
            self.config.url.trim_end_matches('/'),
            urlencoding::encode(&self.config.api_key),
            urlencoding::encode(&self.config.api_secret),
            urlencoding::encode(&query.from),
            query.start,
            query.limit
        )
    }
}

#[async_trait]
impl CallsFeed for LeadspediaCallsClient {
    async fn fetch_page(&self, query: &CallsQuery) -> Result<CallsPage, CallsError> {
        debug!(
            from = %query.from,
            start = query.start,
            limit = query.limit,
            "Fetching calls page"
        );

        let response = self
            .client
            .get(self.build_url(query))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CallsError::Timeout
                } else if e.is_connect() {
                    CallsError::ConnectionFailed(e.to_string())
                } else {
                    CallsError::ApiError(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CallsError::ApiError(format!(
                "HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let parsed: CallsResponse = response
            .json()
            .await
            .map_err(|e| CallsError::Decode(e.to_string()))?;

        if !parsed.success {
            return Err(CallsError::Rejected {
                window: query.from.clone(),
                message: parsed
                    .message
                    .unwrap_or_else(|| "no message".to_string()),
            });
        }

        parsed
            .response
            .ok_or_else(|| CallsError::Decode("missing response body".to_string()))
    }
}
