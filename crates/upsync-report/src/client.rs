// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Report generation backends
//!
//! [`AnthropicClient`] performs one blocking call to the Messages API. No
//! timeout is applied and no retry is attempted. [`PromptOnly`] skips the
//! service entirely.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ReportError;

/// Default API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// Default model
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Default output budget
pub const DEFAULT_MAX_TOKENS: u32 = 16_000;

const API_VERSION: &str = "2023-06-01";

/// Anything that turns a prompt into report text
pub trait ReportGenerator {
    /// Produce the report body for a prompt
    ///
    /// # Errors
    ///
    /// Returns `ReportError` if no report could be produced.
    fn generate(&self, prompt: &str) -> Result<String, ReportError>;
}

/// Offline generator that returns the prompt unchanged
///
/// Lets a run produce its full input without network access or an API key.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptOnly;

impl ReportGenerator for PromptOnly {
    fn generate(&self, prompt: &str) -> Result<String, ReportError> {
        debug!(prompt_bytes = prompt.len(), "Using prompt as report");
        Ok(prompt.to_string())
    }
}

/// Blocking client for the Anthropic Messages API
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: [Message<'a>; 1],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

impl AnthropicClient {
    /// Create a client with default endpoint, model and limits
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: 0.0,
        }
    }

    /// Use a different API endpoint
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Use a different model
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the output token budget
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Model that will be requested
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Full URL of the messages endpoint
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("{}/v1/messages", self.base_url.trim_end_matches('/'))
    }

    fn request_body(&self, prompt: &str) -> Result<String, ReportError> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            messages: [Message {
                role: "user",
                content: prompt,
            }],
        };
        Ok(serde_json::to_string(&request)?)
    }
}

impl ReportGenerator for AnthropicClient {
    fn generate(&self, prompt: &str) -> Result<String, ReportError> {
        let body = self.request_body(prompt)?;
        info!(model = %self.model, prompt_bytes = prompt.len(), "Requesting report");

        let response = minreq::post(self.endpoint())
            .with_header("content-type", "application/json")
            .with_header("x-api-key", &self.api_key)
            .with_header("anthropic-version", API_VERSION)
            .with_header(
                "user-agent",
                format!("upsync/{}", env!("CARGO_PKG_VERSION")),
            )
            .with_body(body)
            .send()?;

        let status = response.status_code;
        let text = response.as_str()?;
        debug!(status, response_bytes = text.len(), "Received response");
        parse_response(status, text)
    }
}

/// Extract report text from a Messages API response
fn parse_response(status: i32, body: &str) -> Result<String, ReportError> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_str::<ErrorResponse>(body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| body.to_string());
        return Err(ReportError::Api { status, message });
    }

    let parsed: MessagesResponse = serde_json::from_str(body)?;
    let text: String = parsed
        .content
        .into_iter()
        .filter(|block| block.kind == "text")
        .filter_map(|block| block.text)
        .collect();

    if text.is_empty() {
        return Err(ReportError::EmptyResponse);
    }
    Ok(text)
}
