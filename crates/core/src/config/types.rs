use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::orchestrator::FanoutConfig;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub calls: CallsConfig,
    pub tracking: TrackingConfig,
    #[serde(default)]
    pub fanout: FanoutConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Public calls feed configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CallsConfig {
    /// Public API base URL (e.g., "https://api.leadspedia.com")
    #[serde(default = "default_calls_url")]
    pub url: String,
    pub api_key: String,
    pub api_secret: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
    /// Server-side page size limit (default: 1000)
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
    /// Date markers ("YYYY-MM-DD") paginated in order
    #[serde(default)]
    pub windows: Vec<String>,
}

fn default_calls_url() -> String {
    "https://api.leadspedia.com".to_string()
}

fn default_timeout() -> u32 {
    30
}

fn default_max_page_size() -> u32 {
    1000
}

/// Non-public lead tracking API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrackingConfig {
    /// Account application URL (e.g., "https://acme.leadspedia.net")
    pub url: String,
    /// Raw `Cookie` header value of an authenticated session
    pub session_cookie: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

/// CSV output configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
    #[serde(default)]
    pub row_order: RowOrder,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            row_order: RowOrder::default(),
        }
    }
}

fn default_output_path() -> PathBuf {
    PathBuf::from("leads.csv")
}

/// Order of data rows in the written report.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RowOrder {
    /// Rows in the order their tasks finished.
    #[default]
    Completion,
    /// Rows sorted by the position of their identifier in the input list.
    Input,
}

/// Sanitized config for logging (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub calls: SanitizedCallsConfig,
    pub tracking: SanitizedTrackingConfig,
    pub fanout: FanoutConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedCallsConfig {
    pub url: String,
    pub api_key_configured: bool,
    pub api_secret_configured: bool,
    pub timeout_secs: u32,
    pub max_page_size: u32,
    pub windows: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedTrackingConfig {
    pub url: String,
    pub session_cookie_configured: bool,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            calls: SanitizedCallsConfig {
                url: config.calls.url.clone(),
                api_key_configured: !config.calls.api_key.is_empty(),
                api_secret_configured: !config.calls.api_secret.is_empty(),
                timeout_secs: config.calls.timeout_secs,
                max_page_size: config.calls.max_page_size,
                windows: config.calls.windows.clone(),
            },
            tracking: SanitizedTrackingConfig {
                url: config.tracking.url.clone(),
                session_cookie_configured: !config.tracking.session_cookie.is_empty(),
                timeout_secs: config.tracking.timeout_secs,
            },
            fanout: config.fanout.clone(),
            output: config.output.clone(),
        }
    }
}
