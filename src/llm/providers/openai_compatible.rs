//! OpenAI-compatible chat completion provider (`/v1/chat/completions`).
//!
//! Covers OpenAI, Groq and local servers speaking the same wire format. The
//! request types are private to this module; callers pass [`ChatMessage`]s
//! and get the first completion's text back.
//!
//! Responses are read as untyped JSON first so that a provider error body
//! (which has no `choices`) can be surfaced verbatim.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, trace, warn};

use crate::llm::{ChatMessage, ProviderError};

/// Adapter for any HTTP endpoint implementing `/v1/chat/completions`.
///
/// Constructed once at startup, then cheaply cloned because
/// `reqwest::Client` is an `Arc` internally.
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleProvider {
    client: Client,
    api_base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    api_key: Option<String>,
}

impl OpenAiCompatibleProvider {
    /// Build a provider from config values and an optional API key.
    ///
    /// When `api_key` is present it is sent as `Authorization: Bearer <key>`.
    pub fn new(
        api_base_url: String,
        model: String,
        temperature: f32,
        max_tokens: u32,
        timeout_seconds: u64,
        api_key: Option<String>,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| ProviderError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, api_base_url, model, temperature, max_tokens, api_key })
    }

    /// One round-trip: post `messages`, return `choices[0].message.content`.
    pub async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ProviderError> {
        let payload = ChatCompletionRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        debug!(
            model = %self.model,
            messages = messages.len(),
            "sending LLM request"
        );

        let mut req = self.client.post(&self.api_base_url).json(&payload);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let response = req.send().await.map_err(|e| {
            error!(url = %self.api_base_url, error = %e, is_timeout = e.is_timeout(), "LLM HTTP request failed (transport)");
            ProviderError::Transport(e.to_string())
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            error!(%status, error = %e, "failed to read LLM response body");
            ProviderError::Transport(format!("failed to read response body: {e}"))
        })?;

        if !status.is_success() {
            warn!(%status, "LLM request returned HTTP error");
        }
        trace!(%status, body = %body, "full LLM response payload");

        extract_answer(&body)
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

/// Interpret a raw response body.
///
/// - not JSON → [`ProviderError::Malformed`]
/// - JSON without `choices` → [`ProviderError::Provider`] carrying the payload
/// - `choices` present but no usable first message → [`ProviderError::Malformed`]
fn extract_answer(body: &str) -> Result<String, ProviderError> {
    let parsed: Value = serde_json::from_str(body).map_err(|e| {
        error!(error = %e, "failed to deserialize LLM response");
        ProviderError::Malformed(format!("failed to parse response body: {e}"))
    })?;

    let Some(choices) = parsed.get("choices") else {
        warn!("LLM response has no 'choices'");
        return Err(ProviderError::Provider { payload: parsed });
    };

    let choices = choices
        .as_array()
        .ok_or_else(|| ProviderError::Malformed("'choices' is not an array".into()))?;

    debug!(choices = choices.len(), "received LLM response");

    choices
        .first()
        .and_then(|c| c.pointer("/message/content"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ProviderError::Malformed("empty or missing content in response".into()))
}
