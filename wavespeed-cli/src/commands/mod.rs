//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod args;
mod create;
mod generate;
mod get;

pub use args::GenerationArgs;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Generate images and wait for the result
    Generate {
        #[command(flatten)]
        args: GenerationArgs,

        /// Use the blocking client instead of the async one
        #[arg(long)]
        blocking: bool,
    },
    /// Create a prediction, then poll it until it finishes
    Create {
        #[command(flatten)]
        args: GenerationArgs,

        /// Print the created prediction and exit without polling
        #[arg(long)]
        no_poll: bool,
    },
    /// Show the current state of a prediction
    Get {
        /// Prediction ID
        id: String,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
///
/// # Arguments
/// * `command` - The command to execute
/// * `config` - The CLI configuration
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Generate { args, blocking } => {
            generate::handle_generate(args, blocking, config).await
        }
        Commands::Create { args, no_poll } => create::handle_create(args, !no_poll, config).await,
        Commands::Get { id } => get::handle_get(&id, config).await,
    }
}
