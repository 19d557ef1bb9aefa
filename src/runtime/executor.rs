//! Orchestrator event loop

use super::traits::ChatBackend;
use super::{OrchestratorConfig, OrchestratorHandle, Snapshot, ViewEvent};
use crate::chat::ChatOutcome;
use crate::conversation::ConversationLog;
use crate::speech::{
    RecognitionBackend, RecognitionConfig, RecognitionEvent, RecognitionSession, SignalSender,
    SpeechSignal, SynthesisAdapter, SynthesisEngine,
};
use crate::state_machine::{transition, ConvContext, ConvState, Effect, Event, TransitionError};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Single owner of the conversation: state, log, recognition session and
/// synthesis adapter all live here and are only touched from `run`.
pub struct Orchestrator<C>
where
    C: ChatBackend + 'static,
{
    context: ConvContext,
    state: ConvState,
    log: ConversationLog,
    chat: Arc<C>,
    recognition_backend: Arc<dyn RecognitionBackend>,
    recognition_config: RecognitionConfig,
    /// The live recognition session, if any (at most one)
    session: Option<RecognitionSession>,
    next_session_id: u64,
    synthesis: SynthesisAdapter,
    tick_interval: Duration,
    event_rx: mpsc::Receiver<Event>,
    event_tx: mpsc::Sender<Event>,
    signal_rx: mpsc::UnboundedReceiver<SpeechSignal>,
    signal_tx: SignalSender,
    snapshot_tx: watch::Sender<Snapshot>,
    view_tx: broadcast::Sender<ViewEvent>,
    shutdown: CancellationToken,
}

impl<C> Orchestrator<C>
where
    C: ChatBackend + 'static,
{
    pub fn new(
        config: OrchestratorConfig,
        chat: C,
        recognition_backend: Arc<dyn RecognitionBackend>,
        synthesis_engine: Box<dyn SynthesisEngine>,
    ) -> (Self, OrchestratorHandle) {
        let (event_tx, event_rx) = mpsc::channel(32);
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(Snapshot::default());
        let (view_tx, _) = broadcast::channel(128);
        let shutdown = CancellationToken::new();

        let handle = OrchestratorHandle {
            event_tx: event_tx.clone(),
            snapshot_rx,
            view_tx: view_tx.clone(),
            shutdown: shutdown.clone(),
        };

        let orchestrator = Self {
            context: config.context,
            state: ConvState::Initial,
            log: ConversationLog::new(),
            chat: Arc::new(chat),
            recognition_backend,
            recognition_config: config.recognition,
            session: None,
            next_session_id: 1,
            synthesis: SynthesisAdapter::new(synthesis_engine, signal_tx.clone()),
            tick_interval: config.tick_interval,
            event_rx,
            event_tx,
            signal_rx,
            signal_tx,
            snapshot_tx,
            view_tx,
            shutdown,
        };

        (orchestrator, handle)
    }

    pub async fn run(mut self) {
        tracing::info!(
            idle_tick_limit = self.context.idle_tick_limit,
            tick_ms = %self.tick_interval.as_millis(),
            "Starting orchestrator"
        );

        let mut ticker = time::interval_at(Instant::now() + self.tick_interval, self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // Process events one at a time - no re-entrancy
        loop {
            let phase_changed = tokio::select! {
                biased;

                () = self.shutdown.cancelled() => break,

                Some(event) = self.event_rx.recv() => self.process_event(event),

                Some(signal) = self.signal_rx.recv() => match self.accept_signal(signal) {
                    Some(event) => self.process_event(event),
                    None => false,
                },

                _ = ticker.tick() => self.process_event(Event::IdleTick),
            };

            // The idle clock restarts on every visible state change
            if phase_changed {
                ticker.reset();
            }
        }

        self.teardown();
        tracing::info!(turns = self.log.len(), "Orchestrator stopped");
    }

    /// Run one event and everything it chains to. Returns whether the
    /// render-visible phase changed.
    fn process_event(&mut self, event: Event) -> bool {
        let before = self.state.phase();
        let mut events_to_process = VecDeque::from([event]);

        while let Some(current_event) = events_to_process.pop_front() {
            // Pure state transition
            let result = match transition(&self.state, &self.context, current_event) {
                Ok(r) => r,
                Err(e @ TransitionError::InvalidTransition(_)) => {
                    tracing::warn!(error = %e, "Dropping event");
                    continue;
                }
                Err(e) => {
                    tracing::debug!(state = ?self.state, error = %e, "Intent rejected");
                    continue;
                }
            };

            self.state = result.new_state;

            // Execute effects and collect generated events
            for effect in result.effects {
                if let Some(generated_event) = self.execute_effect(effect) {
                    events_to_process.push_back(generated_event);
                }
            }
        }

        self.publish_snapshot();
        self.state.phase() != before
    }

    /// Translate an engine callback into an event, dropping stale ones
    fn accept_signal(&mut self, signal: SpeechSignal) -> Option<Event> {
        match signal {
            SpeechSignal::Recognition { session, event } => {
                let live = self.session.as_ref().map(RecognitionSession::id);
                if live != Some(session) {
                    tracing::debug!(session, ?live, "Dropping event from inactive session");
                    return None;
                }
                match event {
                    RecognitionEvent::Result {
                        transcript,
                        is_final,
                    } => Some(Event::RecognitionResult {
                        transcript,
                        is_final,
                    }),
                    RecognitionEvent::Error { kind } => {
                        tracing::info!(session, error = %kind, "Recognition error");
                        Some(Event::RecognitionError { kind })
                    }
                }
            }
            SpeechSignal::SynthesisFinished { utterance } => self
                .synthesis
                .complete(utterance)
                .then_some(Event::SpeechFinished),
        }
    }

    /// Execute an effect and optionally return a generated event
    fn execute_effect(&mut self, effect: Effect) -> Option<Event> {
        match effect {
            Effect::AppendTurn(turn) => {
                self.log.append(turn.clone());
                let _ = self.view_tx.send(ViewEvent::TurnAppended { turn });
                None
            }

            Effect::StartRecognition => {
                // Never two sessions at once
                self.session = None;

                let id = self.next_session_id;
                self.next_session_id += 1;

                match RecognitionSession::open(
                    id,
                    self.recognition_backend.as_ref(),
                    &self.recognition_config,
                    self.signal_tx.clone(),
                ) {
                    Ok(session) => {
                        self.session = Some(session);
                        Some(Event::RecognitionStarted)
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Recognition engine unavailable");
                        Some(Event::RecognitionUnavailable {
                            message: e.to_string(),
                        })
                    }
                }
            }

            Effect::ResumeRecognition => {
                match &mut self.session {
                    Some(session) => session.restart(),
                    None => tracing::debug!("No recognition session to resume"),
                }
                None
            }

            Effect::PauseRecognition => {
                if let Some(session) = &mut self.session {
                    session.pause();
                }
                None
            }

            Effect::DestroyRecognition => {
                self.session = None;
                None
            }

            Effect::RequestChat => {
                self.request_chat();
                None
            }

            Effect::Speak { text, profile } => match self.synthesis.speak(&text, &profile) {
                Ok(_) => None,
                Err(e) => {
                    // Nothing will be voiced; treat the utterance as done
                    tracing::warn!(error = %e, "Synthesis failed to start");
                    Some(Event::SpeechFinished)
                }
            },

            Effect::CancelSpeech => {
                self.synthesis.cancel();
                None
            }

            Effect::NotifyStateChange => {
                tracing::info!(state = ?self.state, turns = self.log.len(), "State changed");
                let _ = self.view_tx.send(ViewEvent::StateChange {
                    phase: self.state.phase(),
                    synthesis_active: self.synthesis.is_speaking(),
                });
                None
            }
        }
    }

    fn request_chat(&self) {
        let chat = Arc::clone(&self.chat);
        let history = self.log.turns().to_vec();
        let event_tx = self.event_tx.clone();

        tokio::spawn(async move {
            tracing::info!(turns = history.len(), "Requesting chat reply (background)");

            // A panic inside the client surfaces here as a JoinError
            let task = tokio::spawn(async move { chat.reply(&history).await });
            let outcome = match task.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!(error = %e, "Chat task failed");
                    ChatOutcome::FatalFailure {
                        reason: format!("chat task failed: {e}"),
                    }
                }
            };

            match &outcome {
                ChatOutcome::Success(_) => {}
                ChatOutcome::RetryableFailure { attempts, reason } => {
                    tracing::warn!(attempts, reason = %reason, "Chat retries exhausted");
                }
                ChatOutcome::FatalFailure { reason } => {
                    tracing::error!(reason = %reason, "Chat failed outside retry path");
                }
            }

            let _ = event_tx.send(Event::ChatReply { outcome }).await;
        });
    }

    fn publish_snapshot(&self) {
        let phase = self.state.phase();
        let synthesis_active = self.synthesis.is_speaking();
        let interruptible = synthesis_active && self.state.is_interruptible();
        let turns = self.log.turns();

        self.snapshot_tx.send_if_modified(|snapshot| {
            if snapshot.phase == phase
                && snapshot.synthesis_active == synthesis_active
                && snapshot.interruptible == interruptible
                && snapshot.turns.len() == turns.len()
            {
                return false;
            }
            *snapshot = Snapshot {
                turns: turns.to_vec(),
                phase,
                synthesis_active,
                interruptible,
            };
            true
        });
    }

    fn teardown(&mut self) {
        self.synthesis.cancel();
        self.session = None;
    }
}
