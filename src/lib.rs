//! Talkback - voice-driven conversational assistant
//!
//! Turn-taking between a listening user and a spoken assistant, built as a
//! pure state machine driven by a single runtime task.

pub mod chat;
pub mod config;
pub mod conversation;
pub mod runtime;
pub mod speech;
pub mod state_machine;
pub mod view;
