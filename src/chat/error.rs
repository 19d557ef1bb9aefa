//! Failures reported by a chat service

use thiserror::Error;

/// What went wrong, coarse enough for the retry loop to act on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ChatErrorKind {
    #[error("network")]
    Network,
    #[error("rate limited")]
    RateLimit,
    #[error("server error")]
    ServerError,
    #[error("authentication failed")]
    Auth,
    #[error("invalid request")]
    InvalidRequest,
    #[error("unexpected response")]
    Unknown,
}

impl ChatErrorKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => Self::InvalidRequest,
            401 | 403 => Self::Auth,
            429 => Self::RateLimit,
            500..=599 => Self::ServerError,
            _ => Self::Unknown,
        }
    }

    /// Auth and invalid requests fail the same way on every attempt
    pub fn is_retryable(self) -> bool {
        !matches!(self, Self::Auth | Self::InvalidRequest)
    }
}

#[derive(Debug, Clone, Error)]
#[error("{kind}: {message}")]
pub struct ChatError {
    pub kind: ChatErrorKind,
    pub message: String,
}

impl ChatError {
    pub fn new(kind: ChatErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// A non-success HTTP reply; `detail` is whatever the body said
    pub fn from_status(status: u16, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        Self::new(ChatErrorKind::from_status(status), format!("HTTP {status}: {detail}"))
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Network, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Unknown, message)
    }
}
