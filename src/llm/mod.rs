//! LLM provider abstraction.
//!
//! `LlmProvider` is an enum over concrete provider implementations.
//! Add a new variant + module in `providers/` for each additional backend.
//!
//! Provider instances are shared immutable capabilities — clone them freely.

pub mod providers;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ── Error ─────────────────────────────────────────────────────────────────────

/// Classified failure of a single completion round-trip.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
    /// Connection, TLS or timeout failure before a body was received.
    #[error("provider request failed: {0}")]
    Transport(String),
    /// A body arrived but could not be interpreted.
    #[error("malformed provider response: {0}")]
    Malformed(String),
    /// The provider answered with valid JSON that carries no `choices`.
    #[error("LLM API did not return 'choices'. Full response: {payload}")]
    Provider { payload: serde_json::Value },
}

impl ProviderError {
    /// Stable machine-readable kind for the JSON error envelope.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::UnknownProvider(_) => "config",
            ProviderError::Transport(_) => "transport",
            ProviderError::Malformed(_) => "malformed",
            ProviderError::Provider { .. } => "provider",
        }
    }
}

// ── Messages ──────────────────────────────────────────────────────────────────

/// One role-tagged chat message, serialised as-is into the request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }
}

// ── Provider enum ─────────────────────────────────────────────────────────────

/// All available provider backends.
///
/// Enum dispatch keeps `async fn` on the call site with no `dyn` machinery.
#[derive(Debug, Clone)]
pub enum LlmProvider {
    Dummy(providers::dummy::DummyProvider),
    OpenAiCompatible(providers::openai_compatible::OpenAiCompatibleProvider),
}

impl LlmProvider {
    /// Send `messages` to the provider and return the first completion's text.
    pub async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ProviderError> {
        match self {
            LlmProvider::Dummy(p) => p.complete(messages).await,
            LlmProvider::OpenAiCompatible(p) => p.complete(messages).await,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LlmProvider::Dummy(_) => "dummy",
            LlmProvider::OpenAiCompatible(_) => "openai",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn provider_error_includes_literal_payload() {
        let e = ProviderError::Provider {
            payload: json!({"error": {"message": "invalid api key"}}),
        };
        let msg = e.to_string();
        assert!(msg.starts_with("LLM API did not return 'choices'"));
        assert!(msg.contains(r#""message":"invalid api key""#));
        assert_eq!(e.kind(), "provider");
    }

    #[test]
    fn error_kinds_are_distinct() {
        assert_eq!(ProviderError::Transport("x".into()).kind(), "transport");
        assert_eq!(ProviderError::Malformed("x".into()).kind(), "malformed");
        assert_eq!(ProviderError::UnknownProvider("x".into()).kind(), "config");
    }

    #[tokio::test]
    async fn dummy_dispatch() {
        let p = LlmProvider::Dummy(providers::dummy::DummyProvider);
        let out = p.complete(&[ChatMessage::user("hi")]).await.unwrap();
        assert_eq!(out, "[echo] hi");
        assert_eq!(p.name(), "dummy");
    }
}
