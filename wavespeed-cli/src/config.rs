//! Configuration module
//!
//! Resolved CLI settings, converted into a client configuration per command.

use std::time::Duration;

use wavespeed_client::ClientConfig;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// API key, already checked to be present
    pub api_key: String,

    /// Base URL of the Wavespeed API
    pub base_url: String,

    /// Delay between status checks
    pub poll_interval: Duration,

    /// Upper bound on waiting for a prediction
    pub run_timeout: Option<Duration>,
}

impl Config {
    /// Client configuration for these settings
    pub fn client_config(&self) -> ClientConfig {
        let config = ClientConfig::new(self.api_key.clone())
            .with_base_url(self.base_url.clone())
            .with_poll_interval(self.poll_interval);

        match self.run_timeout {
            Some(timeout) => config.with_run_timeout(timeout),
            None => config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_carries_settings() {
        let config = Config {
            api_key: "ws-key".to_string(),
            base_url: "http://localhost:9000".to_string(),
            poll_interval: Duration::from_millis(250),
            run_timeout: Some(Duration::from_secs(90)),
        };

        let client_config = config.client_config();
        assert_eq!(client_config.api_key(), Some("ws-key"));
        assert_eq!(client_config.base_url(), "http://localhost:9000");
        assert_eq!(client_config.poll_interval, Duration::from_millis(250));
        assert_eq!(client_config.run_timeout, Some(Duration::from_secs(90)));
        assert!(client_config.validate().is_ok());
    }
}
