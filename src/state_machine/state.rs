//! Orchestrator state types

use crate::speech::VoiceProfiles;
use serde::{Deserialize, Serialize};

/// Default number of idle ticks in Recording before the session is torn down
pub const DEFAULT_IDLE_TICK_LIMIT: u32 = 10;

/// Default utterance spoken when the user interrupts a reply
pub const DEFAULT_FILLER: &str = "あっ";

/// Turn-taking state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConvState {
    /// No recognition session
    #[default]
    Initial,

    /// Listening for a final transcript
    Recording {
        /// One-second ticks since entering this state
        idle_ticks: u32,
    },

    /// Recognition paused, chat request in flight
    Generating,

    /// Reply being voiced, recognition paused
    Speaking {
        /// The reply was cut off and the filler utterance is playing
        interrupted: bool,
    },
}

impl ConvState {
    pub fn recording() -> Self {
        ConvState::Recording { idle_ticks: 0 }
    }

    pub fn speaking() -> Self {
        ConvState::Speaking { interrupted: false }
    }

    /// The render-visible part of the state
    pub fn phase(&self) -> Phase {
        match self {
            ConvState::Initial => Phase::Initial,
            ConvState::Recording { .. } => Phase::Recording,
            ConvState::Generating => Phase::Generating,
            ConvState::Speaking { .. } => Phase::Speaking,
        }
    }

    /// Whether the interrupt intent would be accepted
    pub fn is_interruptible(&self) -> bool {
        matches!(self, ConvState::Speaking { interrupted: false })
    }
}

/// What the presentation layer sees of [`ConvState`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Initial,
    Recording,
    Generating,
    Speaking,
}

/// Settings the transition function reads (immutable for a session)
#[derive(Debug, Clone)]
pub struct ConvContext {
    /// Ticks in Recording that force a return to Initial
    pub idle_tick_limit: u32,
    /// Spoken in place of an interrupted reply
    pub filler: String,
    pub voices: VoiceProfiles,
}

impl Default for ConvContext {
    fn default() -> Self {
        Self {
            idle_tick_limit: DEFAULT_IDLE_TICK_LIMIT,
            filler: DEFAULT_FILLER.to_string(),
            voices: VoiceProfiles::default(),
        }
    }
}
