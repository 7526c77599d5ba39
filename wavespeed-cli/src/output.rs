//! Terminal output helpers

use colored::*;
use wavespeed_client::{Prediction, PredictionStatus};

/// Print detailed prediction information
pub fn print_prediction_details(prediction: &Prediction) {
    println!("{}", "Prediction Details:".bold());
    println!("  ID:        {}", prediction.id.cyan());
    if !prediction.model.is_empty() {
        println!("  Model:     {}", prediction.model.dimmed());
    }
    println!("  Status:    {}", colorize_status(prediction.status()));

    if let Some(created) = prediction.created_at {
        println!("  Created:   {}", created.format("%Y-%m-%d %H:%M:%S"));
    }

    if let Some(ms) = prediction.inference_time_ms {
        println!("  Inference: {}ms", ms);
    }

    if prediction.has_nsfw_contents.iter().any(|flagged| *flagged) {
        println!("  {}", "Some outputs were flagged as NSFW".yellow());
    }

    if let Some(error) = prediction.error() {
        println!("\n{}", "Error:".bold());
        println!("{}", error.red());
    }
}

/// Print generated image URLs, numbered from 1
pub fn print_outputs(outputs: &[String]) {
    if outputs.is_empty() {
        return;
    }

    println!("\n{}", "Generated image URLs:".bold());
    for (i, url) in outputs.iter().enumerate() {
        println!("Image {}: {}", i + 1, url);
    }
}

/// Colorize prediction status for display
pub fn colorize_status(status: PredictionStatus) -> ColoredString {
    let status_str = status.to_string();
    match status {
        PredictionStatus::Queued => status_str.yellow(),
        PredictionStatus::Processing => status_str.cyan(),
        PredictionStatus::Completed => status_str.green(),
        PredictionStatus::Error => status_str.red(),
    }
}
