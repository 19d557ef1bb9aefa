//! Environment configuration

use crate::chat::{ChatSettings, RetryPolicy};
use crate::runtime::OrchestratorConfig;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} is not set")]
    Missing { name: &'static str },
    #[error("{name}={value:?} is not a valid value")]
    Invalid { name: &'static str, value: String },
}

/// Everything the binary needs, read once at startup
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: Option<String>,
    pub chat_url: Option<String>,
    pub chat: ChatSettings,
    pub retry: RetryPolicy,
    pub orchestrator: OrchestratorConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source; unset or empty means default
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let mut chat = ChatSettings::default();
        if let Some(model) = get("TALKBACK_MODEL") {
            chat.model = model;
        }
        if let Some(temperature) = parse(&get, "TALKBACK_TEMPERATURE")? {
            chat.temperature = temperature;
        }
        if let Some(max_tokens) = parse(&get, "TALKBACK_MAX_TOKENS")? {
            chat.max_tokens = max_tokens;
        }

        let mut retry = RetryPolicy::default();
        if let Some(base_ms) = parse::<u64>(&get, "TALKBACK_RETRY_BASE_MS")? {
            retry.base_delay = Duration::from_millis(base_ms);
        }

        let mut orchestrator = OrchestratorConfig::default();
        if let Some(language) = get("TALKBACK_LANGUAGE") {
            orchestrator.recognition.language = language;
        }
        if let Some(limit) = parse::<u32>(&get, "TALKBACK_IDLE_TICKS")? {
            if limit == 0 {
                return Err(ConfigError::Invalid {
                    name: "TALKBACK_IDLE_TICKS",
                    value: limit.to_string(),
                });
            }
            orchestrator.context.idle_tick_limit = limit;
        }
        if let Some(filler) = get("TALKBACK_FILLER") {
            orchestrator.context.filler = filler;
        }

        Ok(Self {
            api_key: get("OPENAI_API_KEY"),
            chat_url: get("TALKBACK_CHAT_URL"),
            chat,
            retry,
            orchestrator,
        })
    }

    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key.as_deref().ok_or(ConfigError::Missing {
            name: "OPENAI_API_KEY",
        })
    }
}

fn parse<T: FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, ConfigError> {
    get(name)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid { name, value })
        })
        .transpose()
}
