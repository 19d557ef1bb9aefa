//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the orchestrator with mock implementations.

use crate::chat::{ChatClient, ChatOutcome, ChatService};
use crate::conversation::Turn;
use async_trait::async_trait;
use std::sync::Arc;

/// Produces a reply for the last turn of a conversation
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn reply(&self, history: &[Turn]) -> ChatOutcome;
}

#[async_trait]
impl<S: ChatService> ChatBackend for ChatClient<S> {
    async fn reply(&self, history: &[Turn]) -> ChatOutcome {
        ChatClient::reply(self, history).await
    }
}

#[async_trait]
impl<T: ChatBackend + ?Sized> ChatBackend for Arc<T> {
    async fn reply(&self, history: &[Turn]) -> ChatOutcome {
        (**self).reply(history).await
    }
}
