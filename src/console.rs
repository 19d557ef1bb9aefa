//! Console front-end
//!
//! Typed lines stand in for speech while a session is listening. Replies are
//! "spoken" by printing them and waiting roughly as long as reading them
//! aloud would take.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use talkback::runtime::{OrchestratorHandle, RuntimeError, ViewEvent};
use talkback::speech::{
    RecognitionBackend, RecognitionConfig, RecognitionEngine, RecognitionSink, SpeechError,
    SynthesisEngine, SynthesisSink, Utterance,
};
use talkback::state_machine::Phase;
use talkback::view;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio_util::sync::CancellationToken;

const READING_PACE: Duration = Duration::from_millis(150);
const MIN_SPEAKING_TIME: Duration = Duration::from_millis(300);

#[derive(Default)]
struct EarState {
    sink: Option<RecognitionSink>,
    listening: bool,
}

/// Recognition backend fed by stdin
#[derive(Clone, Default)]
pub struct ConsoleEar {
    state: Arc<Mutex<EarState>>,
}

impl ConsoleEar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver a typed line; returns false when nobody is listening
    pub fn hear(&self, text: &str) -> bool {
        let state = lock(&self.state);
        match (&state.sink, state.listening) {
            (Some(sink), true) => {
                sink.result(text, true);
                true
            }
            _ => false,
        }
    }
}

impl RecognitionBackend for ConsoleEar {
    fn create(
        &self,
        config: &RecognitionConfig,
        sink: RecognitionSink,
    ) -> Result<Box<dyn RecognitionEngine>, SpeechError> {
        tracing::debug!(session = sink.session(), language = %config.language, "Console recognizer created");
        let mut state = lock(&self.state);
        state.sink = Some(sink);
        state.listening = false;
        Ok(Box::new(ConsoleEarEngine {
            state: Arc::clone(&self.state),
        }))
    }
}

struct ConsoleEarEngine {
    state: Arc<Mutex<EarState>>,
}

impl RecognitionEngine for ConsoleEarEngine {
    fn start(&mut self) -> Result<(), SpeechError> {
        let mut state = lock(&self.state);
        if state.listening {
            return Err(SpeechError::AlreadyStarted);
        }
        state.listening = true;
        Ok(())
    }

    fn abort(&mut self) {
        lock(&self.state).listening = false;
    }
}

/// Synthesis engine that prints and then waits out the utterance
#[derive(Default)]
pub struct ConsoleVoice {
    playing: Option<CancellationToken>,
}

impl ConsoleVoice {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SynthesisEngine for ConsoleVoice {
    fn speak(&mut self, utterance: &Utterance, done: SynthesisSink) -> Result<(), SpeechError> {
        let duration = speaking_time(&utterance.text, utterance.profile.rate);
        println!(
            "  (speaking {} at {}x, {:.1}s)",
            utterance.profile.language,
            utterance.profile.rate,
            duration.as_secs_f64()
        );

        let token = CancellationToken::new();
        self.playing = Some(token.clone());
        tokio::spawn(async move {
            tokio::select! {
                () = token.cancelled() => {}
                () = tokio::time::sleep(duration) => done.finished(),
            }
        });
        Ok(())
    }

    fn cancel(&mut self) {
        if let Some(token) = self.playing.take() {
            token.cancel();
        }
    }
}

fn speaking_time(text: &str, rate: f32) -> Duration {
    let chars = u32::try_from(text.chars().count()).unwrap_or(u32::MAX);
    let secs = READING_PACE.as_secs_f64() * f64::from(chars) / f64::from(rate.max(0.1));
    Duration::from_secs_f64(secs).max(MIN_SPEAKING_TIME)
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub fn print_help() {
    println!("/start  start listening      /stop  stop listening");
    println!("/shush  {}          /quit  exit", view::INTERRUPT_LABEL);
    println!("Anything else is heard as speech while listening.");
}

/// Read stdin until EOF or `/quit`
pub async fn read_input(handle: &OrchestratorHandle, ear: &ConsoleEar) -> std::io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let phase = handle.snapshot().phase;
        let result: Result<(), RuntimeError> = match line.trim() {
            "" => continue,
            "/quit" => break,
            "/start" if phase == Phase::Initial => handle.start_or_stop_listening().await,
            "/stop" if phase == Phase::Recording => handle.start_or_stop_listening().await,
            "/start" | "/stop" => {
                println!("  [{}]", view::main_button_label(phase));
                Ok(())
            }
            "/shush" => handle.interrupt_speech().await,
            text => {
                if !ear.hear(text) {
                    println!("  (not listening)");
                }
                Ok(())
            }
        };

        if let Err(e) = result {
            tracing::warn!(error = %e, "Console input stopped");
            break;
        }
    }

    Ok(())
}

/// Print the transcript and phase changes as they happen
pub async fn render(mut events: broadcast::Receiver<ViewEvent>) {
    loop {
        match events.recv().await {
            Ok(ViewEvent::TurnAppended { turn }) => println!("{}", view::render_turn(&turn)),
            Ok(ViewEvent::StateChange {
                phase,
                synthesis_active,
            }) => {
                println!("[{}]", view::main_button_label(phase));
                if phase == Phase::Speaking && synthesis_active {
                    println!("  /shush: {}", view::INTERRUPT_LABEL);
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Console fell behind");
            }
            Err(RecvError::Closed) => break,
        }
    }
}
