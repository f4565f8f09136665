//! Completion-service client.
//!
//! One bounded HTTP call per `complete` invocation. Transport and envelope
//! failures map to distinct [`AttemptError`] variants; whether the returned
//! content is valid JSON is the orchestrator's concern, not the client's, so
//! a content-shape failure never re-exercises the transport layer.

use std::sync::Mutex;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::PipelineConfig;
use crate::error::AttemptError;

/// Chat-completions wire request.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

/// Chat-completions wire response envelope.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// Generic completion backend.
pub trait CompletionClient: Send + Sync {
    /// Perform exactly one completion call and return the raw message
    /// content, with no assumption that it is valid JSON.
    fn complete(
        &self,
        model: &str,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: u32,
        json_mode: bool,
    ) -> Result<String, AttemptError>;
}

/// Real completion client over HTTP.
pub struct HttpCompletionClient {
    http: reqwest::blocking::Client,
    base_url: String,
    api_key: Option<String>,
    referer: Option<String>,
    app_title: Option<String>,
    timeout_secs: u64,
}

impl HttpCompletionClient {
    pub fn new(config: &PipelineConfig) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| anyhow::anyhow!("failed to create HTTP client: {}", e))?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            referer: config.referer.clone(),
            app_title: config.app_title.clone(),
            timeout_secs: config.timeout_secs,
        })
    }
}

impl CompletionClient for HttpCompletionClient {
    fn complete(
        &self,
        model: &str,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: u32,
        json_mode: bool,
    ) -> Result<String, AttemptError> {
        let request = ChatRequest {
            model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            max_tokens,
            response_format: json_mode.then_some(ResponseFormat { kind: "json_object" }),
        };

        debug!(
            model,
            system_len = system_prompt.len(),
            user_len = user_prompt.len(),
            json_mode,
            "sending completion request"
        );

        let mut call = self.http.post(&self.base_url).json(&request);
        if let Some(key) = &self.api_key {
            call = call.bearer_auth(key);
        }
        if let Some(referer) = &self.referer {
            call = call.header("HTTP-Referer", referer);
        }
        if let Some(title) = &self.app_title {
            call = call.header("X-Title", title);
        }

        let response = call.send().map_err(|e| {
            if e.is_timeout() {
                AttemptError::Timeout(self.timeout_secs)
            } else {
                AttemptError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AttemptError::HttpStatus(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        if !content_type.contains("application/json") {
            return Err(AttemptError::NonJsonContentType(content_type));
        }

        let envelope: ChatResponse = response
            .json()
            .map_err(|e| AttemptError::MalformedEnvelope(e.to_string()))?;

        extract_content(envelope)
    }
}

/// Pull `choices[0].message.content` out of the envelope.
fn extract_content(envelope: ChatResponse) -> Result<String, AttemptError> {
    let choice = envelope
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| AttemptError::MalformedEnvelope("response has no choices".to_string()))?;

    let content = choice
        .message
        .content
        .ok_or_else(|| AttemptError::MalformedEnvelope("choice has no message content".to_string()))?;

    if content.trim().is_empty() {
        return Err(AttemptError::EmptyContent);
    }
    Ok(content)
}

/// Scripted completion backend for tests.
pub struct FakeCompletionClient {
    responses: Mutex<Vec<Result<String, AttemptError>>>,
    call_count: Mutex<usize>,
}

impl FakeCompletionClient {
    /// Create a fake client with pre-defined responses. The last response is
    /// repeated once the script runs out.
    pub fn new(responses: Vec<Result<String, AttemptError>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            call_count: Mutex::new(0),
        }
    }

    /// Fake client that always returns the given content.
    pub fn always(content: &str) -> Self {
        Self::new(vec![Ok(content.to_string())])
    }

    /// Fake client that always returns the given error.
    pub fn always_failing(error: AttemptError) -> Self {
        Self::new(vec![Err(error)])
    }

    /// Number of calls made so far.
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

impl CompletionClient for FakeCompletionClient {
    fn complete(
        &self,
        _model: &str,
        _system_prompt: &str,
        _user_prompt: &str,
        _max_tokens: u32,
        _json_mode: bool,
    ) -> Result<String, AttemptError> {
        let mut count = self.call_count.lock().unwrap();
        *count += 1;

        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Err(AttemptError::EmptyContent);
        }
        if responses.len() == 1 {
            responses[0].clone()
        } else {
            responses.remove(0)
        }
    }
}

// Lets a test keep a handle on the fake after handing it to the orchestrator.
impl CompletionClient for std::sync::Arc<FakeCompletionClient> {
    fn complete(
        &self,
        model: &str,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: u32,
        json_mode: bool,
    ) -> Result<String, AttemptError> {
        self.as_ref()
            .complete(model, system_prompt, user_prompt, max_tokens, json_mode)
    }
}
