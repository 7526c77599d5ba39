//! Prediction DTOs

use std::collections::HashMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::domain::prediction::{
    Prediction, PredictionState, PredictionStatus, PredictionUrls, UnknownStatus,
};

/// Envelope code the service uses for success
pub const SUCCESS_CODE: u16 = 200;

/// Message used when the service fails a prediction without saying why
pub const MISSING_ERROR_MESSAGE: &str = "prediction failed without an error message";

/// Response envelope wrapping every API payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub code: u16,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
}

/// Prediction payload returned by both the create and result endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PredictionData {
    pub id: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub outputs: Vec<String>,
    #[serde(default)]
    pub urls: HashMap<String, String>,
    #[serde(default)]
    pub has_nsfw_contents: Vec<bool>,
    pub status: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub timings: Option<Timings>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Timings {
    /// Milliseconds spent on inference
    #[serde(default)]
    pub inference: Option<u64>,
}

/// Reasons a prediction payload cannot be turned into a domain value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("prediction payload has an empty id")]
    MissingId,

    #[error(transparent)]
    UnknownStatus(#[from] UnknownStatus),
}

impl TryFrom<PredictionData> for Prediction {
    type Error = DecodeError;

    fn try_from(data: PredictionData) -> Result<Self, Self::Error> {
        if data.id.trim().is_empty() {
            return Err(DecodeError::MissingId);
        }

        let status: PredictionStatus = data.status.parse()?;
        let state = match status {
            PredictionStatus::Queued => PredictionState::Queued,
            PredictionStatus::Processing => PredictionState::Processing,
            PredictionStatus::Completed => PredictionState::Completed {
                outputs: data.outputs,
            },
            PredictionStatus::Error => PredictionState::Failed {
                error: data
                    .error
                    .filter(|message| !message.trim().is_empty())
                    .unwrap_or_else(|| MISSING_ERROR_MESSAGE.to_string()),
            },
        };

        let created_at = data.created_at.as_deref().and_then(parse_timestamp);

        Ok(Prediction {
            id: data.id,
            model: data.model,
            state,
            urls: PredictionUrls::new(data.urls),
            has_nsfw_contents: data.has_nsfw_contents,
            created_at,
            inference_time_ms: data.timings.and_then(|t| t.inference),
        })
    }
}

/// Parses a service timestamp; RFC 3339, or a zone-less time taken as UTC
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
        .or_else(|| {
            debug!("Ignoring unparseable created_at timestamp: {:?}", raw);
            None
        })
}
