use chrono::NaiveDate;

use super::{types::Config, ConfigError};

/// Largest page the public calls API will serve.
pub const MAX_PAGE_SIZE_LIMIT: u32 = 1000;

/// Validate configuration
/// Currently validates:
/// - Credentials and URLs are not empty
/// - calls.max_page_size is within 1..=1000
/// - At least one window is configured and every window is a YYYY-MM-DD date
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let required = [
        ("calls.url", &config.calls.url),
        ("calls.api_key", &config.calls.api_key),
        ("calls.api_secret", &config.calls.api_secret),
        ("tracking.url", &config.tracking.url),
        ("tracking.session_cookie", &config.tracking.session_cookie),
    ];
    for (name, value) in required {
        if value.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "{} cannot be empty",
                name
            )));
        }
    }

    if config.calls.max_page_size == 0 || config.calls.max_page_size > MAX_PAGE_SIZE_LIMIT {
        return Err(ConfigError::ValidationError(format!(
            "calls.max_page_size must be between 1 and {}",
            MAX_PAGE_SIZE_LIMIT
        )));
    }

    if config.calls.windows.is_empty() {
        return Err(ConfigError::ValidationError(
            "calls.windows must list at least one date".to_string(),
        ));
    }

    for window in &config.calls.windows {
        NaiveDate::parse_from_str(window, "%Y-%m-%d").map_err(|_| {
            ConfigError::ValidationError(format!(
                "calls.windows entry '{}' is not a YYYY-MM-DD date",
                window
            ))
        })?;
    }

    Ok(())
}
