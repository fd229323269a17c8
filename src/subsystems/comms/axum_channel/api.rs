//! Axum handlers.
//!
//! Each handler receives [`AxumState`] via [`axum::extract::State`], makes at
//! most one outbound call (two for a delete with no configured owner) and
//! always answers 200 with a JSON envelope.

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::AxumState;
use crate::intent::RepoIntent;
use crate::subsystems::tools::linkedin;

pub(crate) const NO_GITHUB_INSTRUCTION: &str = "No valid GitHub instruction found. Try 'create a GitHub repo named <name>' or 'delete github repo <name>'.";

// ── Request types ─────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct Query {
    question: String,
    /// Accepted for client compatibility; routing never looks at it.
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

#[derive(Deserialize)]
pub(super) struct EmailData {
    to_email: String,
    subject: String,
    body: String,
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Build the error envelope. `details` carries the raw downstream body when
/// there is one.
fn json_error(kind: &str, msg: impl std::fmt::Display, details: Option<&Value>) -> Json<Value> {
    let mut body = json!({ "error": msg.to_string(), "kind": kind });
    if let Some(details) = details {
        body["details"] = details.clone();
    }
    Json(body)
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// GET /
pub(super) async fn root() -> Json<Value> {
    Json(json!({ "message": "Welcome to the event assistant API" }))
}

/// GET /health — no outbound calls.
pub(super) async fn health(State(state): State<AxumState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "llm_provider": state.llm.name(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// POST /ask and POST /chat/ask
#[instrument(name = "ask", skip_all, fields(request_id = %Uuid::new_v4()))]
pub(super) async fn ask(State(state): State<AxumState>, Json(query): Json<Query>) -> Json<Value> {
    let messages = state.context.messages_for(&query.question);
    debug!(question_len = query.question.len(), messages = messages.len(), "chat request");

    match state.llm.complete(&messages).await {
        Ok(answer) => Json(json!({ "answer": answer })),
        Err(e) => {
            warn!(kind = e.kind(), "chat completion failed: {e}");
            let payload = match &e {
                crate::llm::ProviderError::Provider { payload } => Some(payload),
                _ => None,
            };
            json_error(e.kind(), &e, payload)
        }
    }
}

/// POST /github
#[instrument(name = "github", skip_all, fields(request_id = %Uuid::new_v4()))]
pub(super) async fn github(State(state): State<AxumState>, Json(query): Json<Query>) -> Json<Value> {
    if let Some(kind) = &query.kind {
        debug!(%kind, "ignoring request type hint");
    }

    match state.intent.parse(&query.question) {
        RepoIntent::Create(target) => {
            info!(repo = %target.name, source = ?target.source, "create intent");
            match state.github.create_repo(&target.name).await {
                Ok(repo) => Json(json!({
                    "message": format!("Repository '{}' created successfully.", repo.name),
                    "repo": repo.name,
                    "url": repo.html_url,
                    "name_source": target.source,
                })),
                Err(e) => json_error(
                    e.kind(),
                    format!("Failed to create repository '{}': {e}", target.name),
                    e.details(),
                ),
            }
        }
        RepoIntent::Delete(target) => {
            info!(repo = %target.name, source = ?target.source, "delete intent");
            match state.github.delete_repo(&target.name).await {
                Ok(full_name) => Json(json!({
                    "message": format!("Repository '{full_name}' deleted successfully."),
                    "repo": target.name,
                    "name_source": target.source,
                })),
                Err(e) => json_error(
                    e.kind(),
                    format!("Failed to delete repository '{}': {e}", target.name),
                    e.details(),
                ),
            }
        }
        RepoIntent::Unresolved(action) => {
            debug!(%action, "intent without usable repository name");
            json_error(
                "intent",
                format!("Could not determine which repository to {action}. Name it explicitly, e.g. '{action} github repo my-repo'."),
                None,
            )
        }
        RepoIntent::NoMatch => json_error("intent", NO_GITHUB_INSTRUCTION, None),
    }
}

/// POST /linkedin/connect
pub(super) async fn linkedin_connect(
    State(state): State<AxumState>,
    Json(query): Json<Query>,
) -> Json<Value> {
    match linkedin::connect(&query.question, &state.linkedin_user) {
        Some(message) => Json(json!({ "message": message })),
        None => Json(json!({ "error": linkedin::NO_INSTRUCTION })),
    }
}

/// POST /send-email
#[instrument(name = "send_email", skip_all, fields(request_id = %Uuid::new_v4()))]
pub(super) async fn send_email(
    State(state): State<AxumState>,
    Json(data): Json<EmailData>,
) -> Json<Value> {
    match state.mailer.send(&data.to_email, &data.subject, &data.body).await {
        Ok(()) => Json(json!({ "message": format!("Email sent successfully to {}", data.to_email) })),
        Err(e) => json_error(e.kind(), format!("Failed to send email: {e}"), None),
    }
}
