//! Wavespeed CLI
//!
//! Command-line interface for generating images with the Wavespeed AI API.

mod commands;
mod config;
mod output;

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wavespeed_client::config::{API_KEY_ENV, DEFAULT_BASE_URL};

#[derive(Parser)]
#[command(name = "wavespeed")]
#[command(about = "Generate images using the Wavespeed AI API", long_about = None)]
struct Cli {
    /// Your Wavespeed API key
    #[arg(long, env = API_KEY_ENV, hide_env_values = true)]
    api_key: Option<String>,

    /// API base URL
    #[arg(long, env = "WAVESPEED_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Delay between status checks, in milliseconds
    #[arg(long, env = "WAVESPEED_POLL_INTERVAL_MS", default_value_t = 1000)]
    poll_interval_ms: u64,

    /// Stop waiting for a prediction after this many seconds
    #[arg(long, env = "WAVESPEED_RUN_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout only carries results
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wavespeed_cli=info,wavespeed_client=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let api_key = cli
        .api_key
        .filter(|key| !key.trim().is_empty())
        .with_context(|| {
            format!(
                "API key is required. Provide it with --api-key or set {} environment variable.",
                API_KEY_ENV
            )
        })?;

    let config = Config {
        api_key,
        base_url: cli.base_url,
        poll_interval: Duration::from_millis(cli.poll_interval_ms),
        run_timeout: cli.timeout_secs.map(Duration::from_secs),
    };

    handle_command(cli.command, &config).await
}
