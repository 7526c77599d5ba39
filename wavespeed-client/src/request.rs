//! Request building and response decoding
//!
//! Everything here is shared by the async and blocking clients. The two
//! differ only in how they send a request and how they wait between polls.

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use wavespeed_core::domain::prediction::Prediction;
use wavespeed_core::dto::prediction::{ApiEnvelope, PredictionData, SUCCESS_CODE};

use crate::config::{API_KEY_ENV, ClientConfig};
use crate::error::{ClientError, Result};
use crate::transport::{ApiRequest, ApiResponse, Method};

/// Builds the request that creates a prediction on `model_id`
pub(crate) fn create_request(
    config: &ClientConfig,
    model_id: &str,
    input: &impl Serialize,
) -> Result<ApiRequest> {
    let api_key = require_api_key(config)?;

    let model_id = model_id.trim().trim_matches('/');
    if model_id.is_empty() {
        return Err(ClientError::InvalidInput("model id cannot be empty".to_string()));
    }

    let body = serde_json::to_value(input)
        .map_err(|e| ClientError::InvalidInput(format!("Failed to serialize input: {}", e)))?;
    if !body.is_object() {
        return Err(ClientError::InvalidInput(format!(
            "input must be a JSON object, got {}",
            json_kind(&body)
        )));
    }

    Ok(ApiRequest {
        method: Method::Post,
        path: format!("/api/v3/{}", model_id),
        api_key,
        body: Some(body),
    })
}

/// Builds the status-check request for prediction `id`
pub(crate) fn status_request(config: &ClientConfig, id: &str) -> Result<ApiRequest> {
    let api_key = require_api_key(config)?;

    let id = id.trim();
    if id.is_empty() {
        return Err(ClientError::InvalidInput("prediction id cannot be empty".to_string()));
    }

    Ok(ApiRequest {
        method: Method::Get,
        path: format!("/api/v3/predictions/{}/result", id),
        api_key,
        body: None,
    })
}

/// Interprets a raw response as a prediction
pub(crate) fn decode_prediction(response: ApiResponse) -> Result<Prediction> {
    if !response.is_success() {
        let message = serde_json::from_str::<ApiEnvelope<Value>>(&response.body)
            .map(|envelope| envelope.message)
            .ok()
            .filter(|message| !message.is_empty())
            .unwrap_or(response.body);
        return Err(ClientError::api_error(response.status, message));
    }

    let envelope: ApiEnvelope<PredictionData> = serde_json::from_str(&response.body)
        .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))?;

    if envelope.code != SUCCESS_CODE {
        return Err(ClientError::api_error(envelope.code, envelope.message));
    }

    let data = envelope
        .data
        .ok_or_else(|| ClientError::ParseError("response has no data".to_string()))?;

    Prediction::try_from(data).map_err(|e| ClientError::ParseError(e.to_string()))
}

/// Applies a status-check result to the current record
///
/// A response for a different prediction is an error and leaves `current`
/// untouched.
pub(crate) fn apply_reload(current: &mut Prediction, latest: Prediction) -> Result<()> {
    if latest.id != current.id {
        return Err(ClientError::ParseError(format!(
            "status check for prediction {} returned prediction {}",
            current.id, latest.id
        )));
    }

    let previous = current.status();
    let reported = latest.status();

    if current.refresh(latest) {
        if previous != reported {
            debug!("Prediction {} moved from {} to {}", current.id, previous, reported);
        }
    } else {
        warn!(
            "Ignoring {} status for prediction {} which already finished as {}",
            reported, current.id, previous
        );
    }
    Ok(())
}

/// How long to sleep before the next status check
///
/// Never sleeps past `run_timeout`. Returns `None` once it has elapsed.
pub(crate) fn next_poll_delay(
    poll_interval: Duration,
    run_timeout: Option<Duration>,
    elapsed: Duration,
) -> Option<Duration> {
    match run_timeout {
        None => Some(poll_interval),
        Some(limit) => limit
            .checked_sub(elapsed)
            .filter(|left| !left.is_zero())
            .map(|left| left.min(poll_interval)),
    }
}

pub(crate) fn deadline_passed(run_timeout: Option<Duration>, elapsed: Duration) -> bool {
    run_timeout.is_some_and(|limit| elapsed >= limit)
}

fn require_api_key(config: &ClientConfig) -> Result<String> {
    config.api_key().map(str::to_string).ok_or_else(|| {
        ClientError::Auth(format!(
            "API key is required; pass one explicitly or set {}",
            API_KEY_ENV
        ))
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wavespeed_core::domain::prediction::PredictionStatus;

    fn response(status: u16, body: Value) -> ApiResponse {
        ApiResponse {
            status,
            body: body.to_string(),
        }
    }

    #[test]
    fn test_create_request_shape() {
        let config = ClientConfig::new("ws-key");
        let request =
            create_request(&config, "wavespeed-ai/flux-dev", &json!({"prompt": "a fox"})).unwrap();

        assert_eq!(request.method, Method::Post);
        assert_eq!(request.path, "/api/v3/wavespeed-ai/flux-dev");
        assert_eq!(request.api_key, "ws-key");
        assert_eq!(request.body, Some(json!({"prompt": "a fox"})));
    }

    #[test]
    fn test_status_request_shape() {
        let config = ClientConfig::new("ws-key");
        let request = status_request(&config, "abc123").unwrap();

        assert_eq!(request.method, Method::Get);
        assert_eq!(request.path, "/api/v3/predictions/abc123/result");
        assert!(request.body.is_none());
    }

    #[test]
    fn test_requests_require_api_key() {
        let config = ClientConfig::default();
        assert!(matches!(
            create_request(&config, "wavespeed-ai/flux-dev", &json!({})),
            Err(ClientError::Auth(_))
        ));
        assert!(matches!(status_request(&config, "abc123"), Err(ClientError::Auth(_))));
    }

    #[test]
    fn test_create_request_rejects_non_object_input() {
        let config = ClientConfig::new("ws-key");
        let err = create_request(&config, "wavespeed-ai/flux-dev", &json!(["prompt"])).unwrap_err();
        assert!(matches!(err, ClientError::InvalidInput(_)));

        let err = create_request(&config, " / ", &json!({})).unwrap_err();
        assert!(matches!(err, ClientError::InvalidInput(_)));
    }

    #[test]
    fn test_decode_success() {
        let prediction = decode_prediction(response(
            200,
            json!({"code": 200, "message": "success", "data": {"id": "abc", "status": "processing"}}),
        ))
        .unwrap();

        assert_eq!(prediction.id, "abc");
        assert_eq!(prediction.status(), PredictionStatus::Processing);
    }

    #[test]
    fn test_decode_http_error_uses_envelope_message() {
        let err = decode_prediction(response(
            401,
            json!({"code": 401, "message": "invalid api key"}),
        ))
        .unwrap_err();

        match err {
            ClientError::ApiError { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "invalid api key");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_decode_http_error_falls_back_to_body() {
        let err = decode_prediction(ApiResponse {
            status: 502,
            body: "Bad Gateway".to_string(),
        })
        .unwrap_err();
        assert!(err.is_server_error());
        assert!(err.to_string().contains("Bad Gateway"));
    }

    #[test]
    fn test_decode_envelope_error_code() {
        let err = decode_prediction(response(
            200,
            json!({"code": 400, "message": "size must be W*H", "data": null}),
        ))
        .unwrap_err();
        assert!(err.is_client_error());
    }

    fn prediction(id: &str, status: &str) -> Prediction {
        decode_prediction(response(
            200,
            json!({"code": 200, "data": {"id": id, "status": status, "outputs": ["https://cdn/1.png"]}}),
        ))
        .unwrap()
    }

    #[test]
    fn test_apply_reload_rejects_other_prediction() {
        let mut current = prediction("p1", "processing");

        let err = apply_reload(&mut current, prediction("p2", "completed")).unwrap_err();

        assert!(matches!(err, ClientError::ParseError(_)));
        assert!(err.is_request_error());
        assert_eq!(current.id, "p1");
        assert_eq!(current.status(), PredictionStatus::Processing);
    }

    #[test]
    fn test_apply_reload_keeps_first_terminal_outcome() {
        let mut current = prediction("p1", "completed");

        apply_reload(&mut current, prediction("p1", "failed")).unwrap();

        assert_eq!(current.status(), PredictionStatus::Completed);
        assert_eq!(current.outputs(), ["https://cdn/1.png"]);
    }

    #[test]
    fn test_next_poll_delay_is_capped_by_deadline() {
        let interval = Duration::from_secs(60);
        let secs = Duration::from_secs;

        assert_eq!(next_poll_delay(interval, None, secs(600)), Some(interval));
        assert_eq!(next_poll_delay(interval, Some(secs(5)), secs(0)), Some(secs(5)));
        assert_eq!(next_poll_delay(interval, Some(secs(300)), secs(10)), Some(interval));
        assert_eq!(next_poll_delay(interval, Some(secs(5)), secs(5)), None);
        assert_eq!(next_poll_delay(interval, Some(secs(5)), secs(7)), None);

        assert!(deadline_passed(Some(secs(5)), secs(5)));
        assert!(!deadline_passed(Some(secs(5)), secs(4)));
        assert!(!deadline_passed(None, secs(600)));
    }

    #[test]
    fn test_decode_malformed_body() {
        let err = decode_prediction(ApiResponse {
            status: 200,
            body: "<html>".to_string(),
        })
        .unwrap_err();
        assert!(matches!(err, ClientError::ParseError(_)));
    }
}
