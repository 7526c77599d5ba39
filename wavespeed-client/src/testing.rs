//! Scripted transport for unit tests

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use crate::error::{ClientError, Result};
use crate::transport::{ApiRequest, ApiResponse, BlockingTransport, Transport};

#[derive(Default)]
struct Script {
    responses: VecDeque<ApiResponse>,
    repeat: Option<ApiResponse>,
    calls: Vec<ApiRequest>,
    async_times: Vec<tokio::time::Instant>,
    blocking_times: Vec<std::time::Instant>,
}

/// Replays canned responses in order and records every request
#[derive(Clone, Default)]
pub(crate) struct ScriptedTransport {
    script: Arc<Mutex<Script>>,
}

impl ScriptedTransport {
    pub(crate) fn new(responses: Vec<ApiResponse>) -> Self {
        let transport = Self::default();
        transport.script.lock().unwrap().responses = responses.into();
        transport
    }

    /// Answers every request with the same response
    pub(crate) fn repeating(response: ApiResponse) -> Self {
        let transport = Self::default();
        transport.script.lock().unwrap().repeat = Some(response);
        transport
    }

    pub(crate) fn push_raw(&self, status: u16, body: &str) {
        self.script.lock().unwrap().responses.push_back(ApiResponse {
            status,
            body: body.to_string(),
        });
    }

    pub(crate) fn calls(&self) -> Vec<ApiRequest> {
        self.script.lock().unwrap().calls.clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.script.lock().unwrap().calls.len()
    }

    pub(crate) fn async_call_times(&self) -> Vec<tokio::time::Instant> {
        self.script.lock().unwrap().async_times.clone()
    }

    pub(crate) fn blocking_call_times(&self) -> Vec<std::time::Instant> {
        self.script.lock().unwrap().blocking_times.clone()
    }

    fn next(script: &mut Script, request: ApiRequest) -> Result<ApiResponse> {
        script.calls.push(request);
        script
            .responses
            .pop_front()
            .or_else(|| script.repeat.clone())
            .ok_or_else(|| ClientError::Transport("script exhausted".to_string()))
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        let mut script = self.script.lock().unwrap();
        script.async_times.push(tokio::time::Instant::now());
        Self::next(&mut script, request)
    }
}

impl BlockingTransport for ScriptedTransport {
    fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        let mut script = self.script.lock().unwrap();
        script.blocking_times.push(std::time::Instant::now());
        Self::next(&mut script, request)
    }
}

fn envelope(data: serde_json::Value) -> ApiResponse {
    ApiResponse {
        status: 200,
        body: json!({"code": 200, "message": "success", "data": data}).to_string(),
    }
}

fn data(id: &str, status: &str) -> serde_json::Value {
    json!({
        "id": id,
        "model": "wavespeed-ai/flux-dev",
        "outputs": [],
        "urls": {"get": format!("https://api.wavespeed.ai/api/v3/predictions/{id}/result")},
        "has_nsfw_contents": [],
        "status": status,
        "created_at": "2025-03-01T10:15:30.123Z",
        "error": "",
        "timings": {"inference": null}
    })
}

pub(crate) fn queued(id: &str) -> ApiResponse {
    envelope(data(id, "created"))
}

pub(crate) fn processing(id: &str) -> ApiResponse {
    envelope(data(id, "processing"))
}

pub(crate) fn completed(id: &str, outputs: &[&str]) -> ApiResponse {
    let mut data = data(id, "completed");
    data["outputs"] = json!(outputs);
    data["has_nsfw_contents"] = json!(vec![false; outputs.len()]);
    data["timings"] = json!({"inference": 1830});
    envelope(data)
}

pub(crate) fn failed(id: &str, error: &str) -> ApiResponse {
    let mut data = data(id, "failed");
    data["error"] = json!(error);
    envelope(data)
}
