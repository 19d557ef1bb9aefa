//! Runtime for driving a conversation
//!
//! The orchestrator task owns all mutable state. The presentation layer talks
//! to it through an [`OrchestratorHandle`]: it submits intents and observes
//! snapshots, and never touches the log or the engines directly.

mod executor;
pub mod traits;


pub use executor::Orchestrator;
pub use traits::*;

use crate::conversation::Turn;
use crate::speech::RecognitionConfig;
use crate::state_machine::{ConvContext, Event, Phase};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, watch};
use tokio_util::sync::CancellationToken;

/// Default cadence of the idle tick
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Static settings for one orchestrator
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub context: ConvContext,
    pub recognition: RecognitionConfig,
    pub tick_interval: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            context: ConvContext::default(),
            recognition: RecognitionConfig::default(),
            tick_interval: DEFAULT_TICK_INTERVAL,
        }
    }
}

/// What the presentation layer renders
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    pub turns: Vec<Turn>,
    pub phase: Phase,
    pub synthesis_active: bool,
    /// Speaking, not yet interrupted, and an utterance is playing
    pub interruptible: bool,
}

/// Incremental notifications for presentation layers that prefer a stream
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewEvent {
    TurnAppended { turn: Turn },
    StateChange { phase: Phase, synthesis_active: bool },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("Orchestrator is not running")]
    Stopped,
}

/// Cloneable front door to a running orchestrator
#[derive(Debug, Clone)]
pub struct OrchestratorHandle {
    event_tx: mpsc::Sender<Event>,
    snapshot_rx: watch::Receiver<Snapshot>,
    view_tx: broadcast::Sender<ViewEvent>,
    shutdown: CancellationToken,
}

impl OrchestratorHandle {
    /// The main button: start a session, or stop the current one
    pub async fn start_or_stop_listening(&self) -> Result<(), RuntimeError> {
        self.dispatch(Event::StartOrStopListening).await
    }

    /// Cut the assistant off mid-utterance
    pub async fn interrupt_speech(&self) -> Result<(), RuntimeError> {
        self.dispatch(Event::InterruptSpeech).await
    }

    async fn dispatch(&self, event: Event) -> Result<(), RuntimeError> {
        if self.shutdown.is_cancelled() {
            return Err(RuntimeError::Stopped);
        }
        self.event_tx
            .send(event)
            .await
            .map_err(|_| RuntimeError::Stopped)
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot_rx.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<Snapshot> {
        self.snapshot_rx.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ViewEvent> {
        self.view_tx.subscribe()
    }

    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}
