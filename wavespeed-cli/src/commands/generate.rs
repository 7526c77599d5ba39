//! Generate command handler
//!
//! Runs a prediction to completion with either the async or the blocking
//! client and prints the resulting image URLs.

use anyhow::{Context, Result};
use colored::*;
use serde_json::Value as JsonValue;
use tracing::debug;
use wavespeed_client::{Prediction, WavespeedClient, blocking};

use super::GenerationArgs;
use crate::config::Config;
use crate::output::{print_outputs, print_prediction_details};

/// Handle the generate command
///
/// # Arguments
/// * `args` - Generation parameters
/// * `use_blocking` - Run on the blocking client in a worker thread
/// * `config` - The CLI configuration
pub async fn handle_generate(args: GenerationArgs, use_blocking: bool, config: &Config) -> Result<()> {
    let payload = args.to_payload()?;
    debug!("Request payload: {}", payload);

    println!("Generating image with prompt: '{}'...", args.prompt);

    let prediction = if use_blocking {
        run_blocking(args.model, payload, config).await?
    } else {
        run_async(&args.model, &payload, config).await?
    };

    if let Some(Err(failure)) = prediction.outcome() {
        print_prediction_details(&prediction);
        return Err(failure.into());
    }

    println!("{}", "Image generation successful!".green().bold());
    print_prediction_details(&prediction);
    print_outputs(prediction.outputs());

    Ok(())
}

async fn run_async(model: &str, payload: &JsonValue, config: &Config) -> Result<Prediction> {
    let client = WavespeedClient::new(config.client_config())?;
    let result = client.run(model, payload).await;
    client.close();

    let prediction = result.context("Failed to generate image")?;
    Ok(prediction.into_prediction())
}

async fn run_blocking(model: String, payload: JsonValue, config: &Config) -> Result<Prediction> {
    let client_config = config.client_config();

    // reqwest's blocking client must live outside the async runtime
    tokio::task::spawn_blocking(move || -> Result<Prediction> {
        let client = blocking::Client::new(client_config)?;
        let result = client.run(&model, &payload);
        client.close();

        let prediction = result.context("Failed to generate image")?;
        Ok(prediction.into_prediction())
    })
    .await
    .context("Blocking generation task failed")?
}
