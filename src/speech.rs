//! Adapters over the external speech engines
//!
//! The orchestrator never talks to a recognition or synthesis engine directly.
//! Engines deliver their callbacks through sinks that tag each signal with the
//! session or utterance it belongs to, so the runtime can drop anything that
//! arrives for a session that is no longer live.

mod profile;
mod recognition;
mod synthesis;

pub use profile::{is_foreign_text, VoiceProfile, VoiceProfiles};
pub use recognition::{
    RecognitionBackend, RecognitionConfig, RecognitionEngine, RecognitionErrorKind,
    RecognitionEvent, RecognitionSession, RecognitionSink,
};
pub use synthesis::{SynthesisAdapter, SynthesisEngine, SynthesisSink, Utterance};

use thiserror::Error;
use tokio::sync::mpsc;

/// Errors raised at the engine boundary
#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("Speech engine unavailable: {0}")]
    Unavailable(String),
    #[error("Speech engine already running")]
    AlreadyStarted,
    #[error("Speech engine failed: {0}")]
    Engine(String),
}

/// Callback from an engine, tagged with its origin
#[derive(Debug, Clone, PartialEq)]
pub enum SpeechSignal {
    Recognition {
        session: u64,
        event: RecognitionEvent,
    },
    SynthesisFinished {
        utterance: u64,
    },
}

/// Sending half used by every sink
pub type SignalSender = mpsc::UnboundedSender<SpeechSignal>;
