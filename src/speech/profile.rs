//! Voice selection for synthesized replies

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Replies made up only of these characters are voiced with the foreign profile.
///
/// This is a content heuristic, not a language detector: an English reply
/// containing a digit or a dash falls through to the local profile.
static FOREIGN_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z\s\\.,!?']+$").expect("foreign text pattern is valid")
});

pub fn is_foreign_text(text: &str) -> bool {
    FOREIGN_TEXT.is_match(text)
}

/// Language and speaking rate handed to the synthesis engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceProfile {
    pub language: String,
    pub rate: f32,
}

impl VoiceProfile {
    pub fn new(language: impl Into<String>, rate: f32) -> Self {
        Self {
            language: language.into(),
            rate,
        }
    }
}

/// The two profiles a reply can be voiced with
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceProfiles {
    pub foreign: VoiceProfile,
    pub local: VoiceProfile,
}

impl Default for VoiceProfiles {
    fn default() -> Self {
        Self {
            foreign: VoiceProfile::new("en-US", 1.0),
            local: VoiceProfile::new("ja-JP", 2.0),
        }
    }
}

impl VoiceProfiles {
    pub fn select(&self, text: &str) -> &VoiceProfile {
        if is_foreign_text(text) {
            &self.foreign
        } else {
            &self.local
        }
    }
}
