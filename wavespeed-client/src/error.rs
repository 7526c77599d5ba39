//! Error types for the Wavespeed client

use std::time::Duration;

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when using the Wavespeed client
///
/// A prediction that ends in the error state is not a `ClientError`; it is
/// reported through the prediction itself (see
/// [`wavespeed_core::domain::prediction::RemoteJobError`]).
#[derive(Debug, Error)]
pub enum ClientError {
    /// No API key was configured
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Transport failed in a way not covered by reqwest
    #[error("Transport error: {0}")]
    Transport(String),

    /// API returned an error status code
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code, or the envelope code when the body carried one
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Model input could not be sent
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Client configuration is invalid
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Prediction did not reach a terminal state before the run deadline
    #[error("Prediction {id} still running after {elapsed:?}")]
    Timeout {
        /// Prediction that was being waited on
        id: String,
        /// Time spent waiting
        elapsed: Duration,
    },

    /// Client was closed before the call
    #[error("Client is closed")]
    Closed,
}

impl ClientError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }

    /// Check if this error is an authentication error
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::Auth(_)) || matches!(self, Self::ApiError { status: 401, .. })
    }

    /// Check if this error came from talking to the service
    ///
    /// Covers network failures, non-success statuses and malformed bodies.
    pub fn is_request_error(&self) -> bool {
        matches!(
            self,
            Self::RequestFailed(_) | Self::Transport(_) | Self::ApiError { .. } | Self::ParseError(_)
        )
    }

    /// Check if this error is a client error (4xx status)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 400 && *status < 500)
    }

    /// Check if this error is a server error (5xx status)
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 500)
    }
}
