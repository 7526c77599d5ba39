//! Get command handler

use anyhow::{Context, Result};
use wavespeed_client::WavespeedClient;

use crate::config::Config;
use crate::output::{print_outputs, print_prediction_details};

/// Fetch and display a single prediction
pub async fn handle_get(id: &str, config: &Config) -> Result<()> {
    let client = WavespeedClient::new(config.client_config())?;
    let result = client.get_prediction(id).await;
    client.close();

    let prediction = result.with_context(|| format!("Failed to get prediction {}", id))?;

    print_prediction_details(prediction.prediction());
    print_outputs(prediction.outputs());

    Ok(())
}
