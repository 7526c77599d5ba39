//! Prediction endpoints and the async prediction handle

use std::time::Duration;

use serde::Serialize;
use tokio::time::{Instant, sleep};
use tracing::{debug, info};
use wavespeed_core::domain::prediction::{Prediction, PredictionStatus, PredictionUrls};

use crate::WavespeedClient;
use crate::error::{ClientError, Result};
use crate::request;

impl WavespeedClient {
    // =============================================================================
    // Prediction Lifecycle
    // =============================================================================

    /// Start a prediction without waiting for it
    ///
    /// # Arguments
    /// * `model_id` - Model to run (e.g., "wavespeed-ai/flux-dev")
    /// * `input` - Model input; must serialize to a JSON object
    ///
    /// # Returns
    /// A handle in whatever state the service reported, normally queued
    ///
    /// # Example
    /// ```no_run
    /// # use wavespeed_client::{ClientConfig, WavespeedClient};
    /// # use wavespeed_core::input::ImageGenerationInput;
    /// # async fn example() -> anyhow::Result<()> {
    /// let client = WavespeedClient::new(ClientConfig::new("your-api-key"))?;
    /// let mut prediction = client
    ///     .create("wavespeed-ai/flux-dev", &ImageGenerationInput::new("a red kite"))
    ///     .await?;
    ///
    /// while !prediction.is_terminal() {
    ///     tokio::time::sleep(client.poll_interval()).await;
    ///     prediction.reload().await?;
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn create(&self, model_id: &str, input: &impl Serialize) -> Result<PredictionHandle> {
        let prediction = self.submit(model_id, input).await?;
        info!(
            "Prediction created: {} on model {} ({})",
            prediction.id(),
            model_id,
            prediction.status()
        );
        Ok(prediction)
    }

    /// Start a prediction and wait until it completes or fails
    ///
    /// Waits `poll_interval` before each status check. A failed prediction is
    /// returned normally; inspect [`PredictionHandle::error`] or
    /// [`Prediction::outcome`].
    ///
    /// # Arguments
    /// * `model_id` - Model to run
    /// * `input` - Model input; must serialize to a JSON object
    ///
    /// # Returns
    /// The prediction in a terminal state, or [`ClientError::Timeout`] if the
    /// configured `run_timeout` elapses first
    pub async fn run(&self, model_id: &str, input: &impl Serialize) -> Result<PredictionHandle> {
        let mut prediction = self.create(model_id, input).await?;
        prediction.wait().await?;
        Ok(prediction)
    }

    /// Get the current state of an existing prediction
    ///
    /// # Arguments
    /// * `id` - Prediction id returned by an earlier `create`
    pub async fn get_prediction(&self, id: &str) -> Result<PredictionHandle> {
        let prediction = self.fetch(id).await?;
        Ok(PredictionHandle::new(self.clone(), prediction))
    }
}

/// A remote prediction together with the client used to refresh it
#[derive(Debug, Clone)]
pub struct PredictionHandle {
    client: WavespeedClient,
    prediction: Prediction,
}

impl PredictionHandle {
    pub(crate) fn new(client: WavespeedClient, prediction: Prediction) -> Self {
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

    /// The full record as last reported by the service
    pub fn prediction(&self) -> &Prediction {
        &self.prediction
    }

    pub fn into_prediction(self) -> Prediction {
        self.prediction
    }

    /// Refresh this prediction from the service
    ///
    /// On failure the previous state is kept as is.
    pub async fn reload(&mut self) -> Result<()> {
        let latest = self.client.fetch(&self.prediction.id).await?;
        request::apply_reload(&mut self.prediction, latest)
    }

    /// Poll until the prediction completes or fails
    ///
    /// Sleeps the client's poll interval before each reload. Returns
    /// immediately if the prediction is already terminal.
    pub async fn wait(&mut self) -> Result<()> {
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
            sleep(delay).await;

            if request::deadline_passed(run_timeout, started.elapsed()) {
                return Err(self.timed_out(started.elapsed()));
            }
            self.reload().await?;
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
