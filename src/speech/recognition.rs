//! Continuous speech recognition adapter

use super::{SignalSender, SpeechError, SpeechSignal};
use std::fmt;

/// Settings every recognition session is created with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionConfig {
    pub language: String,
    pub continuous: bool,
    pub interim_results: bool,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            language: "ja".to_string(),
            continuous: true,
            interim_results: true,
        }
    }
}

/// Error classes reported by a recognition engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionErrorKind {
    /// Silence for longer than the engine tolerates; recovered by restarting
    NoSpeech,
    Aborted,
    AudioCapture,
    NotAllowed,
    Network,
    Other(String),
}

impl fmt::Display for RecognitionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSpeech => write!(f, "no-speech"),
            Self::Aborted => write!(f, "aborted"),
            Self::AudioCapture => write!(f, "audio-capture"),
            Self::NotAllowed => write!(f, "not-allowed"),
            Self::Network => write!(f, "network"),
            Self::Other(code) => write!(f, "{code}"),
        }
    }
}

/// Callback payload from a recognition engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionEvent {
    Result { transcript: String, is_final: bool },
    Error { kind: RecognitionErrorKind },
}

/// Where an engine delivers its callbacks
///
/// Sends never block and never fail from the engine's point of view; once the
/// orchestrator is gone the signals are dropped.
#[derive(Debug, Clone)]
pub struct RecognitionSink {
    session: u64,
    tx: SignalSender,
}

impl RecognitionSink {
    pub fn new(session: u64, tx: SignalSender) -> Self {
        Self { session, tx }
    }

    pub fn session(&self) -> u64 {
        self.session
    }

    pub fn result(&self, transcript: impl Into<String>, is_final: bool) {
        self.emit(RecognitionEvent::Result {
            transcript: transcript.into(),
            is_final,
        });
    }

    pub fn error(&self, kind: RecognitionErrorKind) {
        self.emit(RecognitionEvent::Error { kind });
    }

    fn emit(&self, event: RecognitionEvent) {
        let _ = self.tx.send(SpeechSignal::Recognition {
            session: self.session,
            event,
        });
    }
}

/// A live handle to an external recognition engine
pub trait RecognitionEngine: Send {
    /// Begin delivering results. Fails if the engine is already running.
    fn start(&mut self) -> Result<(), SpeechError>;

    /// Stop without delivering further results. Safe to call when stopped.
    fn abort(&mut self);
}

/// Constructs engines; one call per recognition session
pub trait RecognitionBackend: Send + Sync {
    fn create(
        &self,
        config: &RecognitionConfig,
        sink: RecognitionSink,
    ) -> Result<Box<dyn RecognitionEngine>, SpeechError>;
}

/// The single recognition session owned by the orchestrator
///
/// Pausing aborts the engine but keeps the handle so it can be restarted on
/// the next return to recording. Dropping the session aborts the engine.
pub struct RecognitionSession {
    id: u64,
    engine: Box<dyn RecognitionEngine>,
}

impl RecognitionSession {
    /// Construct an engine and start it.
    ///
    /// Construction failures surface to the caller. A failed first start is
    /// treated like any other restart failure: the engine may already be
    /// running.
    pub fn open(
        id: u64,
        backend: &dyn RecognitionBackend,
        config: &RecognitionConfig,
        tx: SignalSender,
    ) -> Result<Self, SpeechError> {
        let engine = backend.create(config, RecognitionSink::new(id, tx))?;
        let mut session = Self { id, engine };
        session.restart();
        tracing::info!(session = id, language = %config.language, "Recognition session opened");
        Ok(session)
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Fire-and-forget start; errors never leave the adapter
    pub fn restart(&mut self) {
        if let Err(e) = self.engine.start() {
            tracing::debug!(session = self.id, error = %e, "Recognition restart ignored");
        }
    }

    pub fn pause(&mut self) {
        self.engine.abort();
    }
}

impl Drop for RecognitionSession {
    fn drop(&mut self) {
        self.engine.abort();
        tracing::info!(session = self.id, "Recognition session destroyed");
    }
}

impl fmt::Debug for RecognitionSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecognitionSession")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}
