//! Events that can reach the orchestrator

use crate::chat::ChatOutcome;
use crate::speech::RecognitionErrorKind;

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    // User intents
    StartOrStopListening,
    InterruptSpeech,

    // Recognition events (already filtered to the live session)
    RecognitionResult {
        transcript: String,
        is_final: bool,
    },
    RecognitionError {
        kind: RecognitionErrorKind,
    },
    /// A recognition session is open and listening
    RecognitionStarted,
    /// The engine could not be constructed
    RecognitionUnavailable {
        message: String,
    },

    // Chat events
    ChatReply {
        outcome: ChatOutcome,
    },

    // Synthesis events (already filtered to the active utterance)
    SpeechFinished,

    // Timer
    IdleTick,
}

impl Event {
    pub fn final_transcript(text: impl Into<String>) -> Self {
        Event::RecognitionResult {
            transcript: text.into(),
            is_final: true,
        }
    }

    pub fn interim_transcript(text: impl Into<String>) -> Self {
        Event::RecognitionResult {
            transcript: text.into(),
            is_final: false,
        }
    }
}
