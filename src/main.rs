//! Event assistant — HTTP entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Load config
//!   3. Init logger at configured level
//!   4. Build handler state (LLM provider, GitHub client, mailer)
//!   5. Serve until Ctrl-C

use event_assistant::{config, error::AppError, logger, subsystems::comms::axum_channel};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    // Load .env if present — the file is optional.
    let _ = dotenvy::dotenv();

    let config = config::load()?;

    logger::init(&config.log_level)?;

    info!(
        bind = %config.server.bind,
        llm_provider = %config.llm.provider,
        model = %config.llm.openai.model,
        events = config.context.events.len(),
        log_level = %config.log_level,
        "config loaded"
    );
    if config.llm_api_key.is_none() && config.llm.provider != "dummy" {
        warn!("LLM_API_KEY is not set; requests go out unauthenticated");
    }
    if config.github_token.is_none() {
        warn!("GITHUB_TOKEN is not set; /github requests will fail");
    }

    let state = axum_channel::AxumState::from_config(&config)?;

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("ctrl-c received, shutting down");
                signal_token.cancel();
            }
            Err(e) => warn!("failed to listen for ctrl-c: {e}"),
        }
    });

    axum_channel::AxumChannel::new(config.server.bind.clone(), state)
        .run(shutdown)
        .await
}
