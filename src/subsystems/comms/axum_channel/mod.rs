//! Axum-based HTTP channel — the service's only public surface.
//!
//! `run()` drives the axum event loop; the [`CancellationToken`] is wired to
//! axum's graceful shutdown.
//!
//! ## URL layout
//!
//! ```text
//! GET  /                  → welcome message
//! GET  /health
//! POST /ask               → chat proxy
//! POST /chat/ask          → alias of /ask
//! POST /github            → repository create / delete
//! POST /linkedin/connect  → canned stub
//! POST /send-email
//! ```
//!
//! Every handled outcome is HTTP 200 with either a result or an `error` field.

mod api;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::Config;
use crate::context::PromptContext;
use crate::error::AppError;
use crate::intent::{IntentParser, RegexIntentParser};
use crate::llm::{LlmProvider, providers};
use crate::subsystems::tools::email::Mailer;
use crate::subsystems::tools::github::GitHubClient;

// ── Shared request state ──────────────────────────────────────────────────────

/// Axum router state injected into every handler via [`axum::extract::State`].
///
/// Cheap to clone — all fields are reference-counted.
#[derive(Clone)]
pub struct AxumState {
    pub(crate) llm: LlmProvider,
    pub(crate) context: Arc<PromptContext>,
    pub(crate) github: GitHubClient,
    pub(crate) intent: Arc<dyn IntentParser>,
    pub(crate) mailer: Arc<Mailer>,
    pub(crate) linkedin_user: Arc<str>,
}

impl AxumState {
    /// Wire every capability from resolved config. Secrets move out of
    /// `config` into the clients that use them.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let llm = providers::build(&config.llm, config.llm_api_key.clone())
            .map_err(|e| AppError::Config(e.to_string()))?;
        let github = GitHubClient::new(&config.github, config.github_token.clone())
            .map_err(|e| AppError::Config(e.to_string()))?;
        let mailer = Mailer::from_config(&config.mail, config.smtp_password.clone())
            .map_err(|e| AppError::Config(e.to_string()))?;

        Ok(Self {
            llm,
            context: Arc::new(PromptContext::from_config(&config.context)),
            github,
            intent: Arc::new(RegexIntentParser::new(config.intent.last_token_fallback)),
            mailer: Arc::new(mailer),
            linkedin_user: Arc::from(config.linkedin.target_user.as_str()),
        })
    }
}

// ── AxumChannel ───────────────────────────────────────────────────────────────

pub struct AxumChannel {
    bind_addr: String,
    state: AxumState,
}

impl AxumChannel {
    pub fn new(bind_addr: impl Into<String>, state: AxumState) -> Self {
        Self { bind_addr: bind_addr.into(), state }
    }

    /// Serve until `shutdown` is cancelled.
    pub async fn run(self, shutdown: CancellationToken) -> Result<(), AppError> {
        let bind_addr = self.bind_addr;
        let llm_provider = self.state.llm.name();
        let router = build_router(self.state);

        let listener = TcpListener::bind(&bind_addr)
            .await
            .map_err(|e| AppError::Server(format!("axum bind failed on {bind_addr}: {e}")))?;

        info!(%bind_addr, llm_provider, "http channel listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await
            .map_err(|e| AppError::Server(format!("axum server error: {e}")))?;

        info!("http channel shut down");
        Ok(())
    }
}

// ── Router ────────────────────────────────────────────────────────────────────

pub fn build_router(state: AxumState) -> Router {
    Router::new()
        .route("/",                 get(api::root))
        .route("/health",           get(api::health))
        .route("/ask",              post(api::ask))
        .route("/chat/ask",         post(api::ask))
        .route("/github",           post(api::github))
        .route("/linkedin/connect", post(api::linkedin_connect))
        .route("/send-email",       post(api::send_email))
        .with_state(state)
}
