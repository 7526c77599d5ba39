//! Blocking Wavespeed client
//!
//! Same operations as the async [`crate::WavespeedClient`], waiting with
//! [`std::thread::sleep`] between polls. Do not use it from inside an async
//! runtime; move the work to `tokio::task::spawn_blocking` instead.

use std::sync::Arc;
use std::thread::sleep;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info};
use wavespeed_core::domain::prediction::{Prediction, PredictionStatus, PredictionUrls};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::request;
use crate::transport::{BlockingHttpTransport, BlockingTransport, TransportSlot};

/// Blocking client for the Wavespeed API
#[derive(Clone)]
pub struct Client {
    config: Arc<ClientConfig>,
    transport: Arc<TransportSlot<dyn BlockingTransport>>,
}

impl Client {
    /// Create a new client backed by reqwest's blocking client
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let transport = BlockingHttpTransport::new(config.base_url(), config.request_timeout)?;
        Ok(Self::with_transport(config, transport))
    }

    /// Create a client from `WAVESPEED_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    pub fn with_transport(config: ClientConfig, transport: impl BlockingTransport + 'static) -> Self {
        let transport: Arc<dyn BlockingTransport> = Arc::new(transport);
        Self {
            config: Arc::new(config),
            transport: Arc::new(TransportSlot::new(transport)),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn poll_interval(&self) -> Duration {
        self.config.poll_interval
    }

    /// Start a prediction without waiting for it
    pub fn create(&self, model_id: &str, input: &impl Serialize) -> Result<PredictionHandle> {
        let request = request::create_request(&self.config, model_id, input)?;
        let transport = self.transport.get()?;
        debug!("POST {}", request.path);
        let response = transport.execute(request)?;
        let prediction = request::decode_prediction(response)?;

        info!(
            "Prediction created: {} on model {} ({})",
            prediction.id,
            model_id,
            prediction.status()
        );
        Ok(PredictionHandle::new(self.clone(), prediction))
    }

    /// Start a prediction and block until it completes or fails
    pub fn run(&self, model_id: &str, input: &impl Serialize) -> Result<PredictionHandle> {
        let mut prediction = self.create(model_id, input)?;
        prediction.wait()?;
        Ok(prediction)
    }

    /// Get the current state of an existing prediction
    pub fn get_prediction(&self, id: &str) -> Result<PredictionHandle> {
        let prediction = self.fetch(id)?;
        Ok(PredictionHandle::new(self.clone(), prediction))
    }

    /// Release the underlying transport; idempotent
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

    fn fetch(&self, id: &str) -> Result<Prediction> {
        let request = request::status_request(&self.config, id)?;
        let transport = self.transport.get()?;
        debug!("GET {}", request.path);
        request::decode_prediction(transport.execute(request)?)
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("blocking::Client")
            .field("base_url", &self.config.base_url())
            .field("poll_interval", &self.config.poll_interval)
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Blocking counterpart of [`crate::PredictionHandle`]
#[derive(Debug, Clone)]
pub struct PredictionHandle {
    client: Client,
    prediction: Prediction,
}

impl PredictionHandle {
    fn new(client: Client, prediction: Prediction) -> Self {
        Self { client, prediction }
    }

    pub fn id(&self) -> &str {
        &self.prediction.id
    }

    pub fn status(&self) -> PredictionStatus {
        self.prediction.status()
    }

    pub fn is_terminal(&self) -> bool {
        self.prediction.is_terminal()
    }

    pub fn outputs(&self) -> &[String] {
        self.prediction.outputs()
    }

    pub fn error(&self) -> Option<&str> {
        self.prediction.error()
    }

    pub fn urls(&self) -> &PredictionUrls {
        &self.prediction.urls
    }

    pub fn prediction(&self) -> &Prediction {
        &self.prediction
    }

    pub fn into_prediction(self) -> Prediction {
        self.prediction
    }

    /// Refresh this prediction from the service, keeping the old state on failure
    pub fn reload(&mut self) -> Result<()> {
        let latest = self.client.fetch(&self.prediction.id)?;
        request::apply_reload(&mut self.prediction, latest)
    }

    /// Block until the prediction completes or fails
    pub fn wait(&mut self) -> Result<()> {
        let poll_interval = self.client.poll_interval();
        let run_timeout = self.client.config().run_timeout;
        let started = Instant::now();

        while !self.is_terminal() {
            let Some(delay) =
                request::next_poll_delay(poll_interval, run_timeout, started.elapsed())
            else {
                return Err(self.timed_out(started.elapsed()));
            };

            debug!(
                "Prediction {} is {}, polling again in {:?}",
                self.prediction.id,
                self.status(),
                delay
            );
            sleep(delay);

            if request::deadline_passed(run_timeout, started.elapsed()) {
                return Err(self.timed_out(started.elapsed()));
            }
            self.reload()?;
        }

        info!("Prediction {} finished as {}", self.prediction.id, self.status());
        Ok(())
    }

    fn timed_out(&self, elapsed: Duration) -> ClientError {
        ClientError::Timeout {
            id: self.prediction.id.clone(),
            elapsed,
        }
    }
}
