//! Dummy LLM provider — echoes the last user message prefixed with `[echo]`.
//! Used for keyless runs and for exercising the HTTP layer in tests.

use crate::llm::{ChatMessage, ProviderError};

#[derive(Debug, Clone)]
pub struct DummyProvider;

impl DummyProvider {
    pub async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ProviderError> {
        let content = messages
            .iter()
            .rev()
            .find(|m| m.role == "user")
            .map(|m| m.content.as_str())
            .unwrap_or_default();
        Ok(format!("[echo] {content}"))
    }
}
