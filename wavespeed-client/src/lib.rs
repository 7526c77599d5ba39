//! Wavespeed HTTP Client
//!
//! A small, type-safe client for the Wavespeed image-generation API.
//!
//! Predictions are remote asynchronous jobs. [`WavespeedClient::create`]
//! starts one and returns immediately; [`WavespeedClient::run`] also waits
//! until the prediction completes or fails. A [`PredictionHandle`] mirrors the
//! service's view of one prediction and refreshes it on [`PredictionHandle::reload`].
//!
//! A blocking flavour with the same operations lives in [`blocking`].
//!
//! # Example
//!
//! ```no_run
//! use wavespeed_client::{ClientConfig, WavespeedClient};
//! use wavespeed_core::input::{DEFAULT_IMAGE_MODEL, ImageGenerationInput};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = WavespeedClient::new(ClientConfig::new("your-api-key"))?;
//!
//!     let prediction = client
//!         .run(DEFAULT_IMAGE_MODEL, &ImageGenerationInput::new("a lighthouse at dusk"))
//!         .await?;
//!
//!     for url in prediction.outputs() {
//!         println!("{}", url);
//!     }
//!
//!     client.close();
//!     Ok(())
//! }
//! ```

pub mod blocking;
pub mod config;
pub mod error;
mod predictions;
mod request;
pub mod transport;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use predictions::PredictionHandle;
pub use transport::{HttpTransport, Transport};
pub use wavespeed_core::domain::prediction::{Prediction, PredictionStatus, RemoteJobError};

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info};

use crate::transport::TransportSlot;

/// Async client for the Wavespeed API
///
/// Cloning is cheap; clones share the configuration and the transport.
#[derive(Clone)]
pub struct WavespeedClient {
    config: Arc<ClientConfig>,
    transport: Arc<TransportSlot<dyn Transport>>,
}

impl WavespeedClient {
    /// Create a new client backed by reqwest
    ///
    /// # Arguments
    /// * `config` - Validated before the HTTP client is built
    ///
    /// # Example
    /// ```
    /// use wavespeed_client::{ClientConfig, WavespeedClient};
    ///
    /// let client = WavespeedClient::new(ClientConfig::new("your-api-key")).unwrap();
    /// assert_eq!(client.poll_interval(), std::time::Duration::from_secs(1));
    /// ```
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let transport = HttpTransport::new(config.base_url(), config.request_timeout)?;
        Ok(Self::with_transport(config, transport))
    }

    /// Create a client from `WAVESPEED_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Create a client with a custom transport
    ///
    /// This allows you to route requests through a proxy layer, a recorder,
    /// or a stub in tests.
    pub fn with_transport(config: ClientConfig, transport: impl Transport + 'static) -> Self {
        let transport: Arc<dyn Transport> = Arc::new(transport);
        Self {
            config: Arc::new(config),
            transport: Arc::new(TransportSlot::new(transport)),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Delay between status checks while waiting on a prediction
    pub fn poll_interval(&self) -> Duration {
        self.config.poll_interval
    }

    // =============================================================================
    // Connection Lifecycle
    // =============================================================================

    /// Release the underlying transport
    ///
    /// Safe to call any number of times and never touches the network.
    /// Every later request from this client, its clones or its handles fails
    /// with [`ClientError::Closed`].
    pub fn close(&self) {
        if self.transport.close() {
            info!("Wavespeed client closed");
        } else {
            debug!("Wavespeed client already closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.transport.is_closed()
    }

    // =============================================================================
    // Request Plumbing
    // =============================================================================

    async fn submit(&self, model_id: &str, input: &impl Serialize) -> Result<PredictionHandle> {
        let request = request::create_request(&self.config, model_id, input)?;
        let transport = self.transport.get()?;
        debug!("POST {}", request.path);
        let response = transport.execute(request).await?;
        let prediction = request::decode_prediction(response)?;
        Ok(PredictionHandle::new(self.clone(), prediction))
    }

    async fn fetch(&self, id: &str) -> Result<Prediction> {
        let request = request::status_request(&self.config, id)?;
        let transport = self.transport.get()?;
        debug!("GET {}", request.path);
        let response = transport.execute(request).await?;
        request::decode_prediction(response)
    }
}

impl std::fmt::Debug for WavespeedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WavespeedClient")
            .field("base_url", &self.config.base_url())
            .field("poll_interval", &self.config.poll_interval)
            .field("closed", &self.is_closed())
            .finish()
    }
}
