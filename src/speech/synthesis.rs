//! Text-to-speech adapter

use super::{SignalSender, SpeechError, SpeechSignal, VoiceProfile};

/// One request to speak
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub id: u64,
    pub text: String,
    pub profile: VoiceProfile,
}

/// Completion callback for exactly one utterance
///
/// `finished` consumes the sink, so an engine cannot report the same
/// utterance twice.
#[derive(Debug)]
pub struct SynthesisSink {
    utterance: u64,
    tx: SignalSender,
}

impl SynthesisSink {
    pub fn new(utterance: u64, tx: SignalSender) -> Self {
        Self { utterance, tx }
    }

    pub fn utterance(&self) -> u64 {
        self.utterance
    }

    pub fn finished(self) {
        let _ = self.tx.send(SpeechSignal::SynthesisFinished {
            utterance: self.utterance,
        });
    }
}

/// External text-to-speech engine
pub trait SynthesisEngine: Send {
    /// Start speaking. The engine calls `done.finished()` when playback ends.
    fn speak(&mut self, utterance: &Utterance, done: SynthesisSink) -> Result<(), SpeechError>;

    /// Stop playback immediately. The cancelled utterance may still report
    /// completion; the adapter discards it.
    fn cancel(&mut self);
}

/// Tracks the single active utterance in front of a synthesis engine
pub struct SynthesisAdapter {
    engine: Box<dyn SynthesisEngine>,
    tx: SignalSender,
    next_id: u64,
    active: Option<u64>,
}

impl SynthesisAdapter {
    pub fn new(engine: Box<dyn SynthesisEngine>, tx: SignalSender) -> Self {
        Self {
            engine,
            tx,
            next_id: 1,
            active: None,
        }
    }

    /// Start an utterance and return its id
    pub fn speak(&mut self, text: &str, profile: &VoiceProfile) -> Result<u64, SpeechError> {
        if let Some(previous) = self.active {
            tracing::warn!(utterance = previous, "Speak issued while another utterance was active");
            self.cancel();
        }

        let id = self.next_id;
        self.next_id += 1;

        let utterance = Utterance {
            id,
            text: text.to_string(),
            profile: profile.clone(),
        };
        self.engine
            .speak(&utterance, SynthesisSink::new(id, self.tx.clone()))?;
        self.active = Some(id);

        tracing::debug!(
            utterance = id,
            language = %profile.language,
            rate = profile.rate,
            "Synthesis started"
        );
        Ok(id)
    }

    pub fn cancel(&mut self) {
        if let Some(id) = self.active.take() {
            self.engine.cancel();
            tracing::debug!(utterance = id, "Synthesis cancelled");
        }
    }

    /// Accept a completion signal. Returns false for cancelled, unknown or
    /// already completed utterances.
    pub fn complete(&mut self, utterance: u64) -> bool {
        if self.active == Some(utterance) {
            self.active = None;
            true
        } else {
            tracing::debug!(utterance, "Discarding stale synthesis completion");
            false
        }
    }

    pub fn is_speaking(&self) -> bool {
        self.active.is_some()
    }
}
