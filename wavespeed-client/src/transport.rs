//! Transports
//!
//! A transport sends one [`ApiRequest`] and returns the raw [`ApiResponse`].
//! Request building and response decoding live in the `request` module and
//! are shared by both the async [`Transport`] and the [`BlockingTransport`].

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{ClientError, Result};

/// HTTP method used by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// A fully built API request
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the base URL, starting with `/`
    pub path: String,
    /// Bearer token
    pub api_key: String,
    /// JSON body for POST requests
    pub body: Option<Value>,
}

/// Status code and raw body of an API response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport used by the async client
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends the request
    ///
    /// Only transport-level failures are errors; non-success statuses are
    /// returned as responses and interpreted by the caller.
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse>;
}

/// Transport used by the blocking client
pub trait BlockingTransport: Send + Sync {
    /// Sends the request, blocking the current thread
    fn execute(&self, request: ApiRequest) -> Result<ApiResponse>;
}

// =============================================================================
// HTTP Implementations
// =============================================================================

/// reqwest-backed async transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: String,
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport with its own connection pool
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the API (e.g., "https://api.wavespeed.ai")
    /// * `timeout` - Timeout applied to each request
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(base_url, client))
    }

    /// Create a transport around a configured reqwest client
    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
        }
        .bearer_auth(&request.api_key);

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(ApiResponse { status, body })
    }
}

/// reqwest-backed blocking transport
///
/// Must not be created or dropped from within an async runtime; reqwest's
/// blocking client panics in that case.
#[derive(Debug, Clone)]
pub struct BlockingHttpTransport {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl BlockingHttpTransport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self::with_client(base_url, client))
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::blocking::Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl BlockingTransport for BlockingHttpTransport {
    fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
        }
        .bearer_auth(&request.api_key);

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send()?;
        let status = response.status().as_u16();
        let body = response.text()?;

        Ok(ApiResponse { status, body })
    }
}

// =============================================================================
// Shared Transport Slot
// =============================================================================

/// Holds the transport shared by a client and all of its handles
///
/// Closing empties the slot; the transport itself is released once the last
/// in-flight request holding a reference finishes.
pub(crate) struct TransportSlot<T: ?Sized> {
    inner: Mutex<Option<Arc<T>>>,
}

impl<T: ?Sized> TransportSlot<T> {
    pub(crate) fn new(transport: Arc<T>) -> Self {
        Self {
            inner: Mutex::new(Some(transport)),
        }
    }

    /// The transport, or [`ClientError::Closed`]
    pub(crate) fn get(&self) -> Result<Arc<T>> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(Arc::clone)
            .ok_or(ClientError::Closed)
    }

    /// Drops the transport; returns `false` if it was already closed
    pub(crate) fn close(&self) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .is_some()
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}
