//! Pure state transition function
//!
//! Given the same state, context and event this always produces the same
//! new state and effects, with no I/O.

use super::{ConvContext, ConvState, Effect, Event};
use crate::chat::ChatOutcome;
use crate::conversation::ERROR_SENTINEL;
use crate::speech::RecognitionErrorKind;
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ConvState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ConvState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    /// Stay in `state` without side effects
    pub fn unchanged(state: &ConvState) -> Self {
        Self::new(state.clone())
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Cannot start or stop listening while a reply is in progress")]
    Busy,
    #[error("Nothing is being spoken")]
    NotSpeaking,
    #[error("Reply already interrupted")]
    AlreadyInterrupted,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

pub fn transition(
    state: &ConvState,
    context: &ConvContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // ============================================================
        // Start / stop intent
        // ============================================================
        // Stay in Initial until the session is actually open
        (ConvState::Initial, Event::StartOrStopListening) => {
            Ok(TransitionResult::unchanged(state).with_effect(Effect::StartRecognition))
        }

        (ConvState::Initial, Event::RecognitionStarted) => {
            Ok(TransitionResult::new(ConvState::recording())
                .with_effect(Effect::NotifyStateChange))
        }

        (ConvState::Initial, Event::RecognitionUnavailable { .. }) => {
            Ok(TransitionResult::unchanged(state))
        }

        (ConvState::Recording { .. }, Event::StartOrStopListening) => {
            Ok(TransitionResult::new(ConvState::Initial)
                .with_effect(Effect::DestroyRecognition)
                .with_effect(Effect::NotifyStateChange))
        }

        (ConvState::Generating | ConvState::Speaking { .. }, Event::StartOrStopListening) => {
            Err(TransitionError::Busy)
        }

        // ============================================================
        // Recognition
        // ============================================================
        (ConvState::Recording { .. }, Event::RecognitionResult { transcript, is_final }) => {
            let transcript = transcript.trim();
            if !is_final || transcript.is_empty() {
                return Ok(TransitionResult::unchanged(state));
            }

            Ok(TransitionResult::new(ConvState::Generating)
                .with_effect(Effect::append_user(transcript))
                .with_effect(Effect::PauseRecognition)
                .with_effect(Effect::RequestChat)
                .with_effect(Effect::NotifyStateChange))
        }

        (
            ConvState::Recording { .. },
            Event::RecognitionError {
                kind: RecognitionErrorKind::NoSpeech,
            },
        ) => Ok(TransitionResult::unchanged(state).with_effect(Effect::ResumeRecognition)),

        // Other engine errors, and anything the paused engine still delivers
        (_, Event::RecognitionResult { .. } | Event::RecognitionError { .. }) => {
            Ok(TransitionResult::unchanged(state))
        }

        // ============================================================
        // Idle supervision
        // ============================================================
        (ConvState::Recording { idle_ticks }, Event::IdleTick) => {
            let idle_ticks = idle_ticks.saturating_add(1);
            if idle_ticks >= context.idle_tick_limit {
                Ok(TransitionResult::new(ConvState::Initial)
                    .with_effect(Effect::DestroyRecognition)
                    .with_effect(Effect::NotifyStateChange))
            } else {
                Ok(TransitionResult::new(ConvState::Recording { idle_ticks }))
            }
        }

        (_, Event::IdleTick) => Ok(TransitionResult::unchanged(state)),

        // ============================================================
        // Chat replies
        // ============================================================
        (ConvState::Generating, Event::ChatReply { outcome }) => match outcome {
            ChatOutcome::Success(text) => {
                let profile = context.voices.select(&text);
                Ok(TransitionResult::new(ConvState::speaking())
                    .with_effect(Effect::append_assistant(text.clone()))
                    .with_effect(Effect::speak(text, profile))
                    .with_effect(Effect::NotifyStateChange))
            }
            ChatOutcome::RetryableFailure { .. } | ChatOutcome::FatalFailure { .. } => {
                Ok(TransitionResult::new(ConvState::recording())
                    .with_effect(Effect::append_assistant(ERROR_SENTINEL))
                    .with_effect(Effect::ResumeRecognition)
                    .with_effect(Effect::NotifyStateChange))
            }
        },

        // ============================================================
        // Synthesis
        // ============================================================
        (ConvState::Speaking { interrupted: false }, Event::InterruptSpeech) => {
            let profile = context.voices.select(&context.filler);
            Ok(TransitionResult::new(ConvState::Speaking { interrupted: true })
                .with_effect(Effect::CancelSpeech)
                .with_effect(Effect::speak(context.filler.clone(), profile)))
        }

        (ConvState::Speaking { interrupted: true }, Event::InterruptSpeech) => {
            Err(TransitionError::AlreadyInterrupted)
        }

        (_, Event::InterruptSpeech) => Err(TransitionError::NotSpeaking),

        (ConvState::Speaking { .. }, Event::SpeechFinished) => {
            Ok(TransitionResult::new(ConvState::recording())
                .with_effect(Effect::ResumeRecognition)
                .with_effect(Effect::NotifyStateChange))
        }

        // ============================================================
        // Invalid Transitions
        // ============================================================
        (state, event) => Err(TransitionError::InvalidTransition(format!(
            "No transition from {state:?} with event {event:?}"
        ))),
    }
}
