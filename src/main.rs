//! Talkback - console front-end for the voice conversation orchestrator

mod console;

use std::sync::Arc;
use std::time::Duration;
use talkback::chat::{ChatClient, LoggingService, OpenAIService};
use talkback::config::AppConfig;
use talkback::runtime::Orchestrator;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging; stdout belongs to the conversation
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "talkback=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Configuration
    let config = AppConfig::from_env()?;
    let api_key = config.require_api_key()?;

    let service = OpenAIService::new(
        api_key,
        config.chat.model.clone(),
        config.chat_url.as_deref(),
        REQUEST_TIMEOUT,
    )?;
    let chat = ChatClient::new(LoggingService::new(service), config.chat.clone())
        .with_retry(config.retry);

    tracing::info!(
        model = %config.chat.model,
        language = %config.orchestrator.recognition.language,
        idle_ticks = config.orchestrator.context.idle_tick_limit,
        "Starting talkback"
    );

    let ear = console::ConsoleEar::new();
    let (orchestrator, handle) = Orchestrator::new(
        config.orchestrator,
        chat,
        Arc::new(ear.clone()),
        Box::new(console::ConsoleVoice::new()),
    );

    let runtime = tokio::spawn(orchestrator.run());
    tokio::spawn(console::render(handle.subscribe()));

    console::print_help();
    console::read_input(&handle, &ear).await?;

    handle.shutdown();
    runtime.await?;
    Ok(())
}
