//! `OpenAI`-compatible chat completions provider

use super::types::{ChatMessage, ChatRequest, ChatResponse, Usage};
use super::{ChatError, ChatService};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";

/// OpenAI-compatible service implementation
pub struct OpenAIService {
    client: Client,
    api_key: String,
    url: String,
    model_id: String,
}

impl OpenAIService {
    pub fn new(
        api_key: impl Into<String>,
        model_id: impl Into<String>,
        url: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, ChatError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChatError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            url: url.unwrap_or(DEFAULT_CHAT_URL).to_string(),
            model_id: model_id.into(),
        })
    }

    fn translate_request(request: &ChatRequest) -> OpenAIRequest<'_> {
        OpenAIRequest {
            model: &request.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }

    fn normalize_response(resp: OpenAIResponse) -> ChatResponse {
        let text = resp
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content);

        let usage = resp.usage.map_or_else(Usage::default, |u| Usage {
            prompt_tokens: u64::from(u.prompt_tokens),
            completion_tokens: u64::from(u.completion_tokens),
        });

        ChatResponse { text, usage }
    }

    fn classify_status(status: reqwest::StatusCode, body: &str) -> ChatError {
        // Prefer the API's own message over the raw body
        let detail = serde_json::from_str::<OpenAIErrorResponse>(body)
            .map_or_else(|_| body.to_string(), |resp| resp.error.message);
        ChatError::from_status(status.as_u16(), detail)
    }
}

#[async_trait]
impl ChatService for OpenAIService {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, ChatError> {
        let openai_request = Self::translate_request(request);

        let response = self
            .client
            .post(&self.url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&openai_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ChatError::network(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    ChatError::network(format!("Connection failed: {e}"))
                } else {
                    ChatError::unknown(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ChatError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(Self::classify_status(status, &body));
        }

        let openai_response: OpenAIResponse = serde_json::from_str(&body).map_err(|e| {
            ChatError::unknown(format!("Failed to parse response: {e} - body: {body}"))
        })?;

        Ok(Self::normalize_response(openai_response))
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

// Wire types

#[derive(Debug, Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    choices: Vec<OpenAIChoice>,
    #[serde(default)]
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
#[allow(clippy::struct_field_names)]
struct OpenAIUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAIErrorResponse {
    error: OpenAIError,
}

#[derive(Debug, Deserialize)]
struct OpenAIError {
    message: String,
}
