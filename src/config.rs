//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` relative to the current working directory
//! (or the path in `EVENT_ASSISTANT_CONFIG`), then applies
//! `EVENT_ASSISTANT_BIND` and `EVENT_ASSISTANT_LOG_LEVEL` overrides.
//!
//! Secrets (`LLM_API_KEY`, `GITHUB_TOKEN`, `SMTP_PASSWORD`) are only ever
//! read from the environment. They have no TOML key and no default.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::context::{CreatorInfo, Event};
use crate::error::AppError;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// HTTP server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address the axum listener binds to.
    pub bind: String,
}

/// OpenAI / OpenAI-compatible provider configuration.
/// Populated from `[llm.openai]` in the TOML.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Full chat completions endpoint URL.
    pub api_base_url: String,
    /// Model name passed in the request body.
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
}

/// LLM subsystem configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Which provider is active (`"dummy"` or `"openai"`).
    pub provider: String,
    pub openai: OpenAiConfig,
}

/// Static prompt context. Read-only for the process lifetime.
#[derive(Debug, Clone)]
pub struct ContextConfig {
    pub system_prompt: String,
    pub events: Vec<Event>,
    pub creator: Option<CreatorInfo>,
}

/// GitHub REST API configuration.
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    pub api_base_url: String,
    /// Account that owns repositories targeted by delete. Resolved from
    /// `GET /user` when unset.
    pub owner: Option<String>,
    pub timeout_seconds: u64,
}

/// Intent parser tuning.
#[derive(Debug, Clone)]
pub struct IntentConfig {
    /// Fall back to the last whitespace token when no naming keyword matches.
    pub last_token_fallback: bool,
}

/// Mail relay configuration.
#[derive(Debug, Clone)]
pub struct MailConfig {
    /// `"smtp"` or `"stub"`.
    pub transport: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: Option<String>,
    /// Sender address; defaults to `username`.
    pub from: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LinkedInConfig {
    /// Name reported in the canned connect response.
    pub target_user: String,
}

/// Fully-resolved service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub context: ContextConfig,
    pub github: GitHubConfig,
    pub intent: IntentConfig,
    pub mail: MailConfig,
    pub linkedin: LinkedInConfig,
    /// From `LLM_API_KEY` — `None` for keyless local models.
    pub llm_api_key: Option<String>,
    /// From `GITHUB_TOKEN`.
    pub github_token: Option<String>,
    /// From `SMTP_PASSWORD`.
    pub smtp_password: Option<String>,
}

/// Values taken from the process environment.
///
/// Tests build this directly instead of mutating env vars.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub bind: Option<String>,
    pub log_level: Option<String>,
    pub llm_api_key: Option<String>,
    pub github_token: Option<String>,
    pub smtp_password: Option<String>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Resolve overrides through `lookup`. Blank secrets count as unset.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let secret = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        Self {
            bind: lookup("EVENT_ASSISTANT_BIND"),
            log_level: lookup("EVENT_ASSISTANT_LOG_LEVEL"),
            llm_api_key: secret("LLM_API_KEY"),
            github_token: secret("GITHUB_TOKEN"),
            smtp_password: secret("SMTP_PASSWORD"),
        }
    }
}

/// Raw TOML shape — `serde` target before resolution.
#[derive(Deserialize)]
struct RawConfig {
    server: RawServer,
    #[serde(default)]
    llm: RawLlm,
    #[serde(default)]
    context: RawContext,
    #[serde(default)]
    github: RawGitHub,
    #[serde(default)]
    intent: RawIntent,
    #[serde(default)]
    mail: RawMail,
    #[serde(default)]
    linkedin: RawLinkedIn,
}

#[derive(Deserialize)]
struct RawServer {
    log_level: String,
    #[serde(default = "default_bind")]
    bind: String,
}

#[derive(Deserialize)]
struct RawLlm {
    /// Maps to `default = "..."` in `[llm]`.
    #[serde(rename = "default", default = "default_llm_provider")]
    provider: String,
    #[serde(default)]
    openai: RawOpenAiConfig,
}

impl Default for RawLlm {
    fn default() -> Self {
        Self { provider: default_llm_provider(), openai: RawOpenAiConfig::default() }
    }
}

#[derive(Deserialize)]
struct RawOpenAiConfig {
    #[serde(default = "default_openai_api_base_url")]
    api_base_url: String,
    #[serde(default = "default_openai_model")]
    model: String,
    #[serde(default = "default_openai_temperature")]
    temperature: f32,
    #[serde(default = "default_openai_max_tokens")]
    max_tokens: u32,
    #[serde(default = "default_timeout_seconds")]
    timeout_seconds: u64,
}

impl Default for RawOpenAiConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_openai_api_base_url(),
            model: default_openai_model(),
            temperature: default_openai_temperature(),
            max_tokens: default_openai_max_tokens(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

#[derive(Deserialize)]
struct RawContext {
    #[serde(default = "default_system_prompt")]
    system_prompt: String,
    #[serde(default)]
    events: Vec<Event>,
    #[serde(default)]
    creator: Option<CreatorInfo>,
}

impl Default for RawContext {
    fn default() -> Self {
        Self { system_prompt: default_system_prompt(), events: Vec::new(), creator: None }
    }
}

#[derive(Deserialize)]
struct RawGitHub {
    #[serde(default = "default_github_api_base_url")]
    api_base_url: String,
    #[serde(default)]
    owner: Option<String>,
    #[serde(default = "default_timeout_seconds")]
    timeout_seconds: u64,
}

impl Default for RawGitHub {
    fn default() -> Self {
        Self {
            api_base_url: default_github_api_base_url(),
            owner: None,
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

#[derive(Deserialize)]
struct RawIntent {
    #[serde(default = "default_true")]
    last_token_fallback: bool,
}

impl Default for RawIntent {
    fn default() -> Self {
        Self { last_token_fallback: true }
    }
}

#[derive(Deserialize)]
struct RawMail {
    #[serde(default = "default_mail_transport")]
    transport: String,
    #[serde(default = "default_smtp_host")]
    smtp_host: String,
    #[serde(default = "default_smtp_port")]
    smtp_port: u16,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    from: Option<String>,
}

impl Default for RawMail {
    fn default() -> Self {
        Self {
            transport: default_mail_transport(),
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            username: None,
            from: None,
        }
    }
}

#[derive(Deserialize)]
struct RawLinkedIn {
    #[serde(default = "default_linkedin_target")]
    target_user: String,
}

impl Default for RawLinkedIn {
    fn default() -> Self {
        Self { target_user: default_linkedin_target() }
    }
}

fn default_bind() -> String { "127.0.0.1:8000".to_string() }
fn default_llm_provider() -> String { "dummy".to_string() }
fn default_openai_api_base_url() -> String { "https://api.groq.com/openai/v1/chat/completions".to_string() }
fn default_openai_model() -> String { "mixtral-8x7b-32768".to_string() }
fn default_openai_temperature() -> f32 { 0.7 }
fn default_openai_max_tokens() -> u32 { 150 }
fn default_timeout_seconds() -> u64 { 60 }
fn default_system_prompt() -> String {
    "You are an AI assistant for a college event management website. Answer queries about upcoming events.".to_string()
}
fn default_github_api_base_url() -> String { "https://api.github.com".to_string() }
fn default_mail_transport() -> String { "smtp".to_string() }
fn default_smtp_host() -> String { "smtp.gmail.com".to_string() }
fn default_smtp_port() -> u16 { 587 }
fn default_linkedin_target() -> String { "user".to_string() }
fn default_true() -> bool { true }

/// Load config from the default path, then apply env-var overrides.
pub fn load() -> Result<Config, AppError> {
    let path = env::var("EVENT_ASSISTANT_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
    load_from(&path, EnvOverrides::from_env())
}

/// Internal loader — accepts an explicit path and overrides.
pub fn load_from(path: &Path, overrides: EnvOverrides) -> Result<Config, AppError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;

    let parsed: RawConfig = toml::from_str(&raw)
        .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?;

    let s = parsed.server;
    let log_level = overrides.log_level.unwrap_or(s.log_level);
    let bind = overrides.bind.unwrap_or(s.bind);

    Ok(Config {
        log_level,
        server: ServerConfig { bind },
        llm: LlmConfig {
            provider: parsed.llm.provider,
            openai: OpenAiConfig {
                api_base_url: parsed.llm.openai.api_base_url,
                model: parsed.llm.openai.model,
                temperature: parsed.llm.openai.temperature,
                max_tokens: parsed.llm.openai.max_tokens,
                timeout_seconds: parsed.llm.openai.timeout_seconds,
            },
        },
        context: ContextConfig {
            system_prompt: parsed.context.system_prompt,
            events: parsed.context.events,
            creator: parsed.context.creator,
        },
        github: GitHubConfig {
            api_base_url: parsed.github.api_base_url.trim_end_matches('/').to_string(),
            owner: parsed.github.owner.filter(|o| !o.is_empty()),
            timeout_seconds: parsed.github.timeout_seconds,
        },
        intent: IntentConfig { last_token_fallback: parsed.intent.last_token_fallback },
        mail: MailConfig {
            transport: parsed.mail.transport,
            smtp_host: parsed.mail.smtp_host,
            smtp_port: parsed.mail.smtp_port,
            username: parsed.mail.username.filter(|u| !u.is_empty()),
            from: parsed.mail.from.filter(|f| !f.is_empty()),
        },
        linkedin: LinkedInConfig { target_user: parsed.linkedin.target_user },
        llm_api_key: overrides.llm_api_key,
        github_token: overrides.github_token,
        smtp_password: overrides.smtp_password,
    })
}

// ── test helpers ──────────────────────────────────────────────────────────────

/// Safe `Config` for unit tests — dummy LLM, stub mail, no secrets, no external calls.
#[cfg(test)]
impl Config {
    pub fn test_default() -> Self {
        Self {
            log_level: "info".into(),
            server: ServerConfig { bind: default_bind() },
            llm: LlmConfig {
                provider: "dummy".into(),
                openai: OpenAiConfig {
                    api_base_url: "http://localhost:0/v1/chat/completions".into(),
                    model: "test-model".into(),
                    temperature: 0.0,
                    max_tokens: 16,
                    timeout_seconds: 1,
                },
            },
            context: ContextConfig {
                system_prompt: default_system_prompt(),
                events: Vec::new(),
                creator: None,
            },
            github: GitHubConfig {
                api_base_url: "http://localhost:0".into(),
                owner: None,
                timeout_seconds: 1,
            },
            intent: IntentConfig { last_token_fallback: true },
            mail: MailConfig {
                transport: "stub".into(),
                smtp_host: "localhost".into(),
                smtp_port: 587,
                username: Some("assistant@example.com".into()),
                from: None,
            },
            linkedin: LinkedInConfig { target_user: default_linkedin_target() },
            llm_api_key: None,
            github_token: None,
            smtp_password: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn blank_secrets_count_as_unset() {
        let vars: std::collections::HashMap<&str, &str> = [
            ("EVENT_ASSISTANT_BIND", "127.0.0.1:9999"),
            ("LLM_API_KEY", ""),
            ("GITHUB_TOKEN", "   "),
            ("SMTP_PASSWORD", "hunter2"),
        ]
        .into_iter()
        .collect();
        let overrides = EnvOverrides::from_vars(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(overrides.bind.as_deref(), Some("127.0.0.1:9999"));
        assert!(overrides.log_level.is_none());
        assert!(overrides.llm_api_key.is_none());
        assert!(overrides.github_token.is_none());
        assert_eq!(overrides.smtp_password.as_deref(), Some("hunter2"));
    }

    const MINIMAL_TOML: &str = r#"
[server]
log_level = "info"
"#;

    const FULL_TOML: &str = r#"
[server]
log_level = "debug"
bind = "0.0.0.0:9000"

[llm]
default = "openai"

[llm.openai]
model = "llama3-8b-8192"
max_tokens = 300

[context]
system_prompt = "You answer questions about the robotics club."

[[context.events]]
name = "Hackathon"
date = "March 15"
organizer = "Tech Club"

[[context.events]]
name = "Cultural Fest"
date = "April 10"
organizer = "Arts Society"

[context.creator]
name = "Ada"
bio = "Builds things."

[github]
api_base_url = "https://github.example.com/api/v3/"
owner = "octo-org"

[intent]
last_token_fallback = false

[mail]
smtp_host = "smtp.example.com"
username = "bot@example.com"
"#;

    fn write_toml(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn parse_minimal_config_uses_defaults() {
        let f = write_toml(MINIMAL_TOML);
        let cfg = load_from(f.path(), EnvOverrides::default()).unwrap();
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.server.bind, "127.0.0.1:8000");
        assert_eq!(cfg.llm.provider, "dummy");
        assert_eq!(cfg.llm.openai.max_tokens, 150);
        assert!((cfg.llm.openai.temperature - 0.7).abs() < f32::EPSILON);
        assert!(cfg.context.events.is_empty());
        assert!(cfg.context.creator.is_none());
        assert_eq!(cfg.mail.smtp_port, 587);
        assert_eq!(cfg.linkedin.target_user, "user");
        assert!(cfg.intent.last_token_fallback);
    }

    #[test]
    fn parse_full_config() {
        let f = write_toml(FULL_TOML);
        let cfg = load_from(f.path(), EnvOverrides::default()).unwrap();
        assert_eq!(cfg.server.bind, "0.0.0.0:9000");
        assert_eq!(cfg.llm.provider, "openai");
        assert_eq!(cfg.llm.openai.model, "llama3-8b-8192");
        assert_eq!(cfg.llm.openai.max_tokens, 300);
        assert_eq!(cfg.context.events.len(), 2);
        assert_eq!(cfg.context.events[1].organizer, "Arts Society");
        assert_eq!(cfg.context.creator.as_ref().unwrap().name, "Ada");
        assert_eq!(cfg.github.api_base_url, "https://github.example.com/api/v3");
        assert_eq!(cfg.github.owner.as_deref(), Some("octo-org"));
        assert!(!cfg.intent.last_token_fallback);
        assert_eq!(cfg.mail.username.as_deref(), Some("bot@example.com"));
    }

    #[test]
    fn missing_file_errors() {
        let result = load_from(Path::new("/nonexistent/config.toml"), EnvOverrides::default());
        let msg = result.unwrap_err().to_string();
        assert!(msg.contains("config error"));
    }

    #[test]
    fn missing_server_section_errors() {
        let f = write_toml("[llm]\ndefault = \"dummy\"\n");
        let msg = load_from(f.path(), EnvOverrides::default()).unwrap_err().to_string();
        assert!(msg.contains("parse error"));
    }

    #[test]
    fn env_overrides_apply() {
        let f = write_toml(MINIMAL_TOML);
        let overrides = EnvOverrides {
            bind: Some("0.0.0.0:1234".into()),
            log_level: Some("trace".into()),
            llm_api_key: Some("sk-test".into()),
            github_token: Some("ghp-test".into()),
            smtp_password: Some("hunter2".into()),
        };
        let cfg = load_from(f.path(), overrides).unwrap();
        assert_eq!(cfg.server.bind, "0.0.0.0:1234");
        assert_eq!(cfg.log_level, "trace");
        assert_eq!(cfg.llm_api_key.as_deref(), Some("sk-test"));
        assert_eq!(cfg.github_token.as_deref(), Some("ghp-test"));
        assert_eq!(cfg.smtp_password.as_deref(), Some("hunter2"));
    }

    #[test]
    fn secrets_in_toml_are_ignored() {
        // Unknown keys are ignored; secrets only come from the environment.
        let f = write_toml("[server]\nlog_level = \"info\"\n\n[llm]\napi_key = \"sk-leaked\"\n");
        let cfg = load_from(f.path(), EnvOverrides::default()).unwrap();
        assert!(cfg.llm_api_key.is_none());
    }
}
