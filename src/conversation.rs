//! Conversation turns and the append-only log

use serde::{Deserialize, Serialize};
use std::fmt;

/// Literal text of the assistant turn appended when a chat round trip fails
pub const ERROR_SENTINEL: &str = "error";

/// Fixed message shown in place of [`ERROR_SENTINEL`]
pub const ERROR_DISPLAY_TEXT: &str = "(APIエラーが発生しました)";

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Speaker {
    User,
    Assistant,
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Speaker::User => write!(f, "User"),
            Speaker::Assistant => write!(f, "Assistant"),
        }
    }
}

/// One utterance in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Assistant,
            text: text.into(),
        }
    }

    /// Assistant turn marking a failed chat round trip
    pub fn error_sentinel() -> Self {
        Self::assistant(ERROR_SENTINEL)
    }

    pub fn is_error_sentinel(&self) -> bool {
        self.speaker == Speaker::Assistant && self.text == ERROR_SENTINEL
    }

    /// Text as the presentation layer should render it
    pub fn display_text(&self) -> &str {
        if self.is_error_sentinel() {
            ERROR_DISPLAY_TEXT
        } else {
            &self.text
        }
    }
}

/// Ordered, append-only sequence of turns for one session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversationLog {
    turns: Vec<Turn>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }
}
