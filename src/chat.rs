//! Chat completion client
//!
//! Provides a provider interface plus the conversation-aware client that
//! builds prompts from the turn log and applies the retry policy.

mod client;
mod error;
mod openai;
mod prompt;
mod retry;
mod types;

pub use client::{ChatClient, ChatOutcome, ChatSettings};
pub use error::{ChatError, ChatErrorKind};
pub use openai::{OpenAIService, DEFAULT_CHAT_URL};
pub use prompt::{SystemPrompts, DEFAULT_CONTINUING_PROMPT, DEFAULT_FIRST_TURN_PROMPT};
pub use retry::RetryPolicy;
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for chat completion providers
#[async_trait]
pub trait ChatService: Send + Sync {
    /// Make a completion request
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, ChatError>;

    /// Get the model ID
    fn model_id(&self) -> &str;
}

#[async_trait]
impl<T: ChatService + ?Sized> ChatService for Arc<T> {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, ChatError> {
        (**self).complete(request).await
    }

    fn model_id(&self) -> &str {
        (**self).model_id()
    }
}

/// Logging wrapper for chat services
pub struct LoggingService<S> {
    inner: S,
    model_id: String,
}

impl<S: ChatService> LoggingService<S> {
    pub fn new(inner: S) -> Self {
        let model_id = inner.model_id().to_string();
        Self { inner, model_id }
    }
}

#[async_trait]
impl<S: ChatService> ChatService for LoggingService<S> {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, ChatError> {
        let start = std::time::Instant::now();
        let result = self.inner.complete(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(response) => {
                tracing::info!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    messages = request.messages.len(),
                    prompt_tokens = response.usage.prompt_tokens,
                    completion_tokens = response.usage.completion_tokens,
                    "Chat request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    retryable = e.kind.is_retryable(),
                    "Chat request failed"
                );
            }
        }

        result
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
