//! Conversation-aware chat client

use super::types::{ChatMessage, ChatRequest};
use super::{ChatService, RetryPolicy, SystemPrompts};
use crate::conversation::{Speaker, Turn};
use serde::Serialize;

/// Request parameters that stay fixed for a session
#[derive(Debug, Clone, PartialEq)]
pub struct ChatSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.7,
            max_tokens: 300,
        }
    }
}

/// Result of one chat round trip
///
/// Both failure variants end up as the sentinel turn in the log; they are
/// kept apart so diagnostics can tell an exhausted retry budget from a
/// failure outside the retry path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatOutcome {
    Success(String),
    RetryableFailure { attempts: u32, reason: String },
    FatalFailure { reason: String },
}

impl ChatOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ChatOutcome::Success(_))
    }
}

/// Builds requests from the turn log and applies the retry policy
pub struct ChatClient<S> {
    service: S,
    settings: ChatSettings,
    prompts: SystemPrompts,
    retry: RetryPolicy,
}

impl<S: ChatService> ChatClient<S> {
    pub fn new(service: S, settings: ChatSettings) -> Self {
        Self {
            service,
            settings,
            prompts: SystemPrompts::default(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_prompts(mut self, prompts: SystemPrompts) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Build the request for `history`, whose last turn is the transcript to answer
    pub fn build_request(&self, history: &[Turn]) -> Option<ChatRequest> {
        let (current, prior) = history.split_last()?;
        if current.speaker != Speaker::User {
            return None;
        }

        let mut messages = Vec::with_capacity(prior.len() + 2);
        messages.push(ChatMessage::system(self.prompts.for_history(prior.len())));
        messages.extend(prior.iter().map(ChatMessage::from));
        messages.push(ChatMessage::user(&current.text));

        Some(ChatRequest {
            model: self.settings.model.clone(),
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
            messages,
        })
    }

    /// Ask for a reply to the last turn of `history`
    pub async fn reply(&self, history: &[Turn]) -> ChatOutcome {
        let Some(request) = self.build_request(history) else {
            return ChatOutcome::FatalFailure {
                reason: "history does not end with a user turn".to_string(),
            };
        };

        let mut attempt = 1;
        loop {
            match self.service.complete(&request).await {
                Ok(response) => {
                    return match response.usable_text() {
                        Some(text) => ChatOutcome::Success(text.to_string()),
                        None => {
                            tracing::warn!(attempt, "Chat response carried no usable content");
                            ChatOutcome::RetryableFailure {
                                attempts: attempt,
                                reason: "response carried no usable content".to_string(),
                            }
                        }
                    };
                }
                // Retrying cannot fix these; stop early but stay in the retry tier
                Err(e) if !e.kind.is_retryable() => {
                    tracing::warn!(attempt, kind = ?e.kind, error = %e, "Chat request rejected");
                    return ChatOutcome::RetryableFailure {
                        attempts: attempt,
                        reason: e.message,
                    };
                }
                Err(e) if self.retry.should_retry(attempt) => {
                    let delay = self.retry.delay_after(attempt);
                    tracing::warn!(
                        attempt,
                        max_attempts = self.retry.max_attempts,
                        delay_ms = %delay.as_millis(),
                        error = %e,
                        "Chat request failed, retrying"
                    );
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    attempt += 1;
                }
                Err(e) => {
                    return ChatOutcome::RetryableFailure {
                        attempts: attempt,
                        reason: e.message,
                    };
                }
            }
        }
    }
}
