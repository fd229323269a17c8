//! tracing-subscriber setup for the HTTP service.
//!
//! `RUST_LOG` wins when it is set and parses; otherwise the level from
//! `[server] log_level` (or `EVENT_ASSISTANT_LOG_LEVEL`) applies.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::error::AppError;

/// Install the global subscriber, writing to stderr.
pub fn init(level: &str) -> Result<(), AppError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => configured_filter(level)?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| AppError::Logger(format!("failed to set subscriber: {e}")))
}

/// Filter for the configured level. Only plain level names are accepted
/// here; per-target directives belong in `RUST_LOG`.
fn configured_filter(level: &str) -> Result<EnvFilter, AppError> {
    let level = parse_level(level)?;
    Ok(EnvFilter::default().add_directive(level.into()))
}

/// Validate a configured level (`"error"` … `"trace"`, `"off"`).
pub fn parse_level(level: &str) -> Result<LevelFilter, AppError> {
    if level.trim().is_empty() {
        return Err(AppError::Logger("log_level must not be empty".into()));
    }
    level
        .trim()
        .parse::<LevelFilter>()
        .map_err(|_| AppError::Logger(format!("unrecognised log_level: '{level}'")))
}
