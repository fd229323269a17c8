//! Static prompt context: the event list and creator biography.
//!
//! Built once from config at startup and shared read-only with every handler
//! behind an `Arc`. Nothing here is ever mutated after construction.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::ContextConfig;
use crate::llm::ChatMessage;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub name: String,
    pub date: String,
    pub organizer: String,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {} (organized by {})", self.name, self.date, self.organizer)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatorInfo {
    pub name: String,
    pub bio: String,
}

/// Read-only context injected into every chat completion.
#[derive(Debug, Clone)]
pub struct PromptContext {
    system_prompt: String,
    events: Vec<Event>,
    creator: Option<CreatorInfo>,
}

impl PromptContext {
    pub fn new(system_prompt: impl Into<String>, events: Vec<Event>, creator: Option<CreatorInfo>) -> Self {
        Self { system_prompt: system_prompt.into(), events, creator }
    }

    pub fn from_config(config: &ContextConfig) -> Self {
        Self::new(config.system_prompt.clone(), config.events.clone(), config.creator.clone())
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn creator(&self) -> Option<&CreatorInfo> {
        self.creator.as_ref()
    }

    /// System messages in send order. Event and creator messages are only
    /// present when the corresponding data is configured.
    pub fn system_messages(&self) -> Vec<ChatMessage> {
        let mut messages = vec![ChatMessage::system(&self.system_prompt)];

        if !self.events.is_empty() {
            let listed = self
                .events
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            messages.push(ChatMessage::system(format!("Here are the upcoming events: {listed}")));
        }

        if let Some(creator) = &self.creator {
            messages.push(ChatMessage::system(format!(
                "The creator of this AI is {}. {}",
                creator.name, creator.bio
            )));
        }

        messages
    }

    /// Full message list for one question: system context, then the user turn.
    pub fn messages_for(&self, question: &str) -> Vec<ChatMessage> {
        let mut messages = self.system_messages();
        messages.push(ChatMessage::user(question));
        messages
    }
}
