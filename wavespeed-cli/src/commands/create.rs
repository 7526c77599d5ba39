//! Create command handler
//!
//! Starts a prediction without waiting, then optionally polls it by hand
//! using the client's poll interval.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use colored::*;
use tokio::time::{Instant, sleep};
use wavespeed_client::{PredictionHandle, PredictionStatus, WavespeedClient};

use super::GenerationArgs;
use crate::config::Config;
use crate::output::{colorize_status, print_outputs};

/// Handle the create command
///
/// # Arguments
/// * `args` - Generation parameters
/// * `poll` - Keep polling until the prediction finishes
/// * `config` - The CLI configuration
pub async fn handle_create(args: GenerationArgs, poll: bool, config: &Config) -> Result<()> {
    let payload = args.to_payload()?;
    let client = WavespeedClient::new(config.client_config())?;

    let result = create_and_poll(&client, &args, &payload, poll, config).await;
    client.close();
    result
}

async fn create_and_poll(
    client: &WavespeedClient,
    args: &GenerationArgs,
    payload: &serde_json::Value,
    poll: bool,
    config: &Config,
) -> Result<()> {
    println!(
        "Creating image generation job with prompt: '{}'...",
        args.prompt
    );

    let mut prediction = client
        .create(&args.model, payload)
        .await
        .context("Failed to create prediction")?;

    println!("Job created with ID: {}", prediction.id().cyan());
    if let Some(url) = prediction.urls().get() {
        println!("Status URL: {}", url.dimmed());
    }
    println!("Initial status: {}", colorize_status(prediction.status()));

    if !poll {
        return Ok(());
    }

    println!("\nPolling for status updates...");
    poll_until_terminal(client, &mut prediction, config).await?;

    print_final_status(&prediction)
}

async fn poll_until_terminal(
    client: &WavespeedClient,
    prediction: &mut PredictionHandle,
    config: &Config,
) -> Result<()> {
    let started = Instant::now();

    while !prediction.is_terminal() {
        let Some(delay) = next_delay(client.poll_interval(), config.run_timeout, started) else {
            bail!(
                "Prediction {} still {} after {:?}",
                prediction.id(),
                prediction.status(),
                started.elapsed()
            );
        };

        println!(
            "Current status: {}, polling again in {:?}...",
            colorize_status(prediction.status()),
            delay
        );
        sleep(delay).await;

        if config.run_timeout.is_some_and(|limit| started.elapsed() >= limit) {
            bail!(
                "Prediction {} still {} after {:?}",
                prediction.id(),
                prediction.status(),
                started.elapsed()
            );
        }
        prediction
            .reload()
            .await
            .context("Failed to check prediction status")?;
    }

    Ok(())
}

/// Poll interval, shortened so the wait never runs past the deadline
fn next_delay(
    poll_interval: Duration,
    run_timeout: Option<Duration>,
    started: Instant,
) -> Option<Duration> {
    match run_timeout {
        None => Some(poll_interval),
        Some(limit) => limit
            .checked_sub(started.elapsed())
            .filter(|left| !left.is_zero())
            .map(|left| left.min(poll_interval)),
    }
}

fn print_final_status(prediction: &PredictionHandle) -> Result<()> {
    println!("\nFinal status: {}", colorize_status(prediction.status()));

    match prediction.status() {
        PredictionStatus::Completed => {
            println!("\n{}", "Image generation successful!".green().bold());
            print_outputs(prediction.outputs());
            Ok(())
        }
        _ => {
            let message = prediction.error().unwrap_or("unknown error");
            println!("\n{} {}", "Error:".bold(), message.red());
            bail!("Prediction {} failed: {}", prediction.id(), message)
        }
    }
}
