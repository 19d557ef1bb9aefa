//! Effects produced by state transitions

use crate::conversation::Turn;
use crate::speech::VoiceProfile;

/// Effects to be executed, in order, after a state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Append a turn to the conversation log
    AppendTurn(Turn),

    /// Construct a fresh recognition session and start it
    StartRecognition,

    /// Best-effort restart of the existing session
    ResumeRecognition,

    /// Abort the engine but keep the session handle
    PauseRecognition,

    /// Abort and discard the session
    DestroyRecognition,

    /// Send the conversation log to the chat client
    RequestChat,

    /// Voice text through the synthesis adapter
    Speak { text: String, profile: VoiceProfile },

    /// Stop the active utterance and drop its completion
    CancelSpeech,

    /// The render-visible phase changed
    NotifyStateChange,
}

impl Effect {
    pub fn append_user(text: impl Into<String>) -> Self {
        Effect::AppendTurn(Turn::user(text))
    }

    pub fn append_assistant(text: impl Into<String>) -> Self {
        Effect::AppendTurn(Turn::assistant(text))
    }

    pub fn speak(text: impl Into<String>, profile: &VoiceProfile) -> Self {
        Effect::Speak {
            text: text.into(),
            profile: profile.clone(),
        }
    }
}
