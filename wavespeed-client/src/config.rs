//! Client configuration
//!
//! Defines the API key, endpoint and timing parameters shared by the async
//! and blocking clients.

use std::time::Duration;

use crate::error::{ClientError, Result};

/// Default Wavespeed API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.wavespeed.ai";

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "WAVESPEED_API_KEY";

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API key sent as a bearer token; checked before every request
    pub api_key: Option<String>,

    /// Base URL of the API (e.g., "https://api.wavespeed.ai")
    pub base_url: String,

    /// Delay between status checks while a prediction is running
    pub poll_interval: Duration,

    /// Timeout applied to each individual HTTP request
    pub request_timeout: Duration,

    /// Upper bound on how long `run` waits for a terminal state; `None` waits forever
    pub run_timeout: Option<Duration>,
}

impl ClientConfig {
    /// Creates a new configuration with defaults and the given API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - WAVESPEED_API_KEY (optional here; requests fail without it)
    /// - WAVESPEED_BASE_URL (optional, default: https://api.wavespeed.ai)
    /// - WAVESPEED_POLL_INTERVAL_MS (optional, default: 1000)
    /// - WAVESPEED_REQUEST_TIMEOUT_SECS (optional, default: 120)
    /// - WAVESPEED_RUN_TIMEOUT_SECS (optional, default: none)
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        config.api_key = std::env::var(API_KEY_ENV).ok().filter(|k| !k.trim().is_empty());

        if let Ok(base_url) = std::env::var("WAVESPEED_BASE_URL") {
            config.base_url = base_url;
        }

        if let Some(ms) = parse_env_u64("WAVESPEED_POLL_INTERVAL_MS")? {
            config.poll_interval = Duration::from_millis(ms);
        }

        if let Some(secs) = parse_env_u64("WAVESPEED_REQUEST_TIMEOUT_SECS")? {
            config.request_timeout = Duration::from_secs(secs);
        }

        config.run_timeout = parse_env_u64("WAVESPEED_RUN_TIMEOUT_SECS")?.map(Duration::from_secs);

        Ok(config)
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub fn with_run_timeout(mut self, run_timeout: Duration) -> Self {
        self.run_timeout = Some(run_timeout);
        self
    }

    /// The API key, if one is set and non-blank
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Validates the configuration
    ///
    /// The API key is not checked here; its absence surfaces as
    /// [`ClientError::Auth`] on the first request.
    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(ClientError::Config("base_url cannot be empty".to_string()));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ClientError::Config(
                "base_url must start with http:// or https://".to_string(),
            ));
        }

        if self.poll_interval.is_zero() {
            return Err(ClientError::Config(
                "poll_interval must be greater than 0".to_string(),
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(ClientError::Config(
                "request_timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            poll_interval: Duration::from_secs(1),
            request_timeout: Duration::from_secs(120),
            run_timeout: None,
        }
    }
}

fn parse_env_u64(name: &str) -> Result<Option<u64>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| ClientError::Config(format!("{name} must be a whole number, got {raw:?}"))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.poll_interval, Duration::from_secs(1));
        assert_eq!(config.request_timeout, Duration::from_secs(120));
        assert!(config.run_timeout.is_none());
        assert!(config.api_key().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = ClientConfig::new("key");

        // Valid config should pass
        assert!(config.validate().is_ok());

        // Invalid URL should fail
        config.base_url = "api.wavespeed.ai".to_string();
        assert!(config.validate().is_err());

        config.base_url = "http://localhost:8080".to_string();
        assert!(config.validate().is_ok());

        // Zero poll interval should fail
        config.poll_interval = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_blank_api_key_counts_as_missing() {
        let config = ClientConfig::new("   ");
        assert!(config.api_key().is_none());
        assert_eq!(ClientConfig::new("ws-123").api_key(), Some("ws-123"));
    }

    #[test]
    fn test_base_url_trims_trailing_slash() {
        let config = ClientConfig::default().with_base_url("http://localhost:8080/");
        assert_eq!(config.base_url(), "http://localhost:8080");
    }
}
