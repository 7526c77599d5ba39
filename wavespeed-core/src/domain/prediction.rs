//! Prediction domain types

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A remote prediction as last reported by the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Opaque identifier assigned by the service
    pub id: String,

    /// Model the prediction runs on (e.g. `wavespeed-ai/flux-dev`)
    pub model: String,

    /// Lifecycle state, including outputs or error once terminal
    pub state: PredictionState,

    /// Named links provided by the service
    pub urls: PredictionUrls,

    /// Per-output content flags reported by the service
    pub has_nsfw_contents: Vec<bool>,

    pub created_at: Option<DateTime<Utc>>,

    /// Inference time in milliseconds, once known
    pub inference_time_ms: Option<u64>,
}

impl Prediction {
    /// Current status, derived from the state
    pub fn status(&self) -> PredictionStatus {
        self.state.status()
    }

    /// Whether the prediction reached completed or error
    pub fn is_terminal(&self) -> bool {
        self.state.status().is_terminal()
    }

    /// Output URLs; empty unless completed
    pub fn outputs(&self) -> &[String] {
        match &self.state {
            PredictionState::Completed { outputs } => outputs.as_slice(),
            _ => &[],
        }
    }

    /// Service-provided failure message; `None` unless the status is error
    pub fn error(&self) -> Option<&str> {
        match &self.state {
            PredictionState::Failed { error } => Some(error),
            _ => None,
        }
    }

    /// Terminal outcome of the prediction
    ///
    /// Returns `None` while the prediction is still queued or processing.
    /// A failed prediction is reported as a [`RemoteJobError`] value.
    pub fn outcome(&self) -> Option<Result<&[String], RemoteJobError>> {
        match &self.state {
            PredictionState::Queued | PredictionState::Processing => None,
            PredictionState::Completed { outputs } => Some(Ok(outputs.as_slice())),
            PredictionState::Failed { error } => Some(Err(RemoteJobError {
                id: self.id.clone(),
                message: error.clone(),
            })),
        }
    }

    /// Replace this record with a newer one from the service
    ///
    /// Once terminal, only a report of the same status is accepted, so a
    /// finished prediction never reverts or switches outcome. Returns `false`
    /// when the update was rejected for that reason.
    pub fn refresh(&mut self, latest: Prediction) -> bool {
        if self.is_terminal() && latest.status() != self.status() {
            return false;
        }
        *self = latest;
        true
    }
}

/// Lifecycle state of a prediction
///
/// Outputs and error live inside the terminal variants, so they can never be
/// set together or while the prediction is still running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PredictionState {
    Queued,
    Processing,
    Completed { outputs: Vec<String> },
    #[serde(rename = "error")]
    Failed { error: String },
}

impl PredictionState {
    pub fn status(&self) -> PredictionStatus {
        match self {
            PredictionState::Queued => PredictionStatus::Queued,
            PredictionState::Processing => PredictionStatus::Processing,
            PredictionState::Completed { .. } => PredictionStatus::Completed,
            PredictionState::Failed { .. } => PredictionStatus::Error,
        }
    }
}

/// Prediction status as reported by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionStatus {
    Queued,
    Processing,
    Completed,
    Error,
}

impl PredictionStatus {
    /// Terminal statuses never transition further
    pub fn is_terminal(&self) -> bool {
        matches!(self, PredictionStatus::Completed | PredictionStatus::Error)
    }
}

impl std::fmt::Display for PredictionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PredictionStatus::Queued => write!(f, "queued"),
            PredictionStatus::Processing => write!(f, "processing"),
            PredictionStatus::Completed => write!(f, "completed"),
            PredictionStatus::Error => write!(f, "error"),
        }
    }
}

/// Status string the client does not recognise
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown prediction status: {0:?}")]
pub struct UnknownStatus(pub String);

impl FromStr for PredictionStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "created" | "queued" | "pending" => Ok(PredictionStatus::Queued),
            "processing" | "running" => Ok(PredictionStatus::Processing),
            "completed" | "succeeded" => Ok(PredictionStatus::Completed),
            "failed" | "error" => Ok(PredictionStatus::Error),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

/// Named links attached to a prediction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PredictionUrls(HashMap<String, String>);

impl PredictionUrls {
    pub fn new(links: HashMap<String, String>) -> Self {
        Self(links)
    }

    /// Status-check URL for this prediction
    pub fn get(&self) -> Option<&str> {
        self.link("get")
    }

    pub fn link(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// A prediction that ended in the error state
///
/// This is an expected terminal outcome, returned as a value rather than
/// raised by the client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("prediction {id} failed: {message}")]
pub struct RemoteJobError {
    pub id: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prediction(state: PredictionState) -> Prediction {
        Prediction {
            id: "pred-1".to_string(),
            model: "wavespeed-ai/flux-dev".to_string(),
            state,
            urls: PredictionUrls::default(),
            has_nsfw_contents: Vec::new(),
            created_at: None,
            inference_time_ms: None,
        }
    }

    #[test]
    fn test_status_parsing_aliases() {
        assert_eq!("created".parse::<PredictionStatus>(), Ok(PredictionStatus::Queued));
        assert_eq!("Queued".parse::<PredictionStatus>(), Ok(PredictionStatus::Queued));
        assert_eq!("processing".parse::<PredictionStatus>(), Ok(PredictionStatus::Processing));
        assert_eq!("completed".parse::<PredictionStatus>(), Ok(PredictionStatus::Completed));
        assert_eq!("failed".parse::<PredictionStatus>(), Ok(PredictionStatus::Error));
        assert_eq!("error".parse::<PredictionStatus>(), Ok(PredictionStatus::Error));
        assert_eq!(
            "exploded".parse::<PredictionStatus>(),
            Err(UnknownStatus("exploded".to_string()))
        );
    }

    #[test]
    fn test_outputs_and_error_are_exclusive() {
        let queued = prediction(PredictionState::Queued);
        assert!(queued.outputs().is_empty());
        assert_eq!(queued.error(), None);
        assert!(queued.outcome().is_none());

        let done = prediction(PredictionState::Completed {
            outputs: vec!["https://cdn.example/a.png".to_string()],
        });
        assert_eq!(done.outputs(), ["https://cdn.example/a.png".to_string()]);
        assert_eq!(done.error(), None);

        let failed = prediction(PredictionState::Failed {
            error: "nsfw".to_string(),
        });
        assert!(failed.outputs().is_empty());
        assert_eq!(failed.error(), Some("nsfw"));
    }

    #[test]
    fn test_outcome_reports_failure_as_value() {
        let failed = prediction(PredictionState::Failed {
            error: "out of memory".to_string(),
        });
        let err = failed.outcome().and_then(Result::err);
        assert_eq!(
            err,
            Some(RemoteJobError {
                id: "pred-1".to_string(),
                message: "out of memory".to_string(),
            })
        );
    }

    #[test]
    fn test_refresh_never_reverts_terminal_state() {
        let mut current = prediction(PredictionState::Completed {
            outputs: vec!["https://cdn.example/a.png".to_string()],
        });

        assert!(!current.refresh(prediction(PredictionState::Processing)));
        assert_eq!(current.status(), PredictionStatus::Completed);
        assert_eq!(current.outputs().len(), 1);
    }

    #[test]
    fn test_refresh_keeps_first_terminal_outcome() {
        let mut current = prediction(PredictionState::Completed {
            outputs: vec!["https://cdn.example/a.png".to_string()],
        });

        let late_failure = prediction(PredictionState::Failed {
            error: "late failure".to_string(),
        });
        assert!(!current.refresh(late_failure));
        assert_eq!(current.status(), PredictionStatus::Completed);
        assert_eq!(current.outputs(), ["https://cdn.example/a.png".to_string()]);

        let mut failed = prediction(PredictionState::Failed {
            error: "gpu lost".to_string(),
        });
        assert!(!failed.refresh(prediction(PredictionState::Completed { outputs: vec![] })));
        assert_eq!(failed.error(), Some("gpu lost"));
    }

    #[test]
    fn test_refresh_accepts_same_terminal_status() {
        let mut current = prediction(PredictionState::Completed { outputs: vec![] });
        let mut latest = prediction(PredictionState::Completed {
            outputs: vec!["https://cdn.example/a.png".to_string()],
        });
        latest.inference_time_ms = Some(900);

        assert!(current.refresh(latest.clone()));
        assert_eq!(current, latest);
    }

    #[test]
    fn test_serialized_state_uses_wire_status_names() {
        let failed = prediction(PredictionState::Failed {
            error: "nsfw".to_string(),
        });
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["state"]["status"], "error");
        assert_eq!(json["state"]["status"], PredictionStatus::Error.to_string());

        let back: Prediction = serde_json::from_value(json).unwrap();
        assert_eq!(back, failed);
    }

    #[test]
    fn test_refresh_replaces_whole_record() {
        let mut current = prediction(PredictionState::Processing);
        let mut latest = prediction(PredictionState::Completed {
            outputs: vec!["https://cdn.example/b.png".to_string()],
        });
        latest.inference_time_ms = Some(1200);

        assert!(current.refresh(latest.clone()));
        assert_eq!(current, latest);
    }

    #[test]
    fn test_status_display_matches_wire_names() {
        assert_eq!(PredictionStatus::Queued.to_string(), "queued");
        assert_eq!(PredictionStatus::Error.to_string(), "error");
        assert!(PredictionStatus::Error.is_terminal());
        assert!(!PredictionStatus::Processing.is_terminal());
    }
}
