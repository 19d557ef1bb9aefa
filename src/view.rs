//! Presentation helpers
//!
//! Pure functions from a [`Snapshot`] to what a front-end shows. A
//! front-end renders these and sends intents through the handle; it never
//! decides turn-taking itself.

use crate::conversation::{Speaker, Turn};
use crate::runtime::Snapshot;
use crate::state_machine::Phase;

pub const INTERRUPT_LABEL: &str = "黙らせる";

pub fn main_button_label(phase: Phase) -> &'static str {
    match phase {
        Phase::Initial => "開始",
        Phase::Recording => "停止",
        Phase::Generating => "返答を考え中",
        Phase::Speaking => "返答中",
    }
}

/// The main button only works while idle or listening
pub fn is_main_button_enabled(phase: Phase) -> bool {
    matches!(phase, Phase::Initial | Phase::Recording)
}

pub fn show_interrupt(snapshot: &Snapshot) -> bool {
    snapshot.phase == Phase::Speaking && snapshot.interruptible
}

pub fn speaker_tag(speaker: Speaker) -> &'static str {
    match speaker {
        Speaker::User => "User",
        Speaker::Assistant => "AI",
    }
}

/// One line of the transcript as displayed
pub fn render_turn(turn: &Turn) -> String {
    format!("{}: {}", speaker_tag(turn.speaker), turn.display_text())
}
