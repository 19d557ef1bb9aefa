//! Common types for chat interactions

use crate::conversation::{Speaker, Turn};
use serde::{Deserialize, Serialize};

/// Chat completion request
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub messages: Vec<ChatMessage>,
}

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl From<Speaker> for ChatRole {
    fn from(speaker: Speaker) -> Self {
        match speaker {
            Speaker::User => ChatRole::User,
            Speaker::Assistant => ChatRole::Assistant,
        }
    }
}

/// Message in a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

impl From<&Turn> for ChatMessage {
    fn from(turn: &Turn) -> Self {
        Self {
            role: turn.speaker.into(),
            content: turn.text.clone(),
        }
    }
}

/// Chat completion response
#[derive(Debug, Clone, Default)]
pub struct ChatResponse {
    /// Generated text, if the provider returned any
    pub text: Option<String>,
    pub usage: Usage,
}

impl ChatResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            usage: Usage::default(),
        }
    }

    /// Text with surrounding whitespace removed; `None` when blank
    pub fn usable_text(&self) -> Option<&str> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }
}

/// Usage statistics
#[derive(Debug, Clone, Default)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}
