//! Plain-text email through an SMTP relay (STARTTLS, usually port 587).
//!
//! The transport is an enum: a real lettre SMTP transport, lettre's stub
//! transport (config `mail.transport = "stub"`, and tests), or a disabled
//! mailer that records why it cannot send. Every failure comes back as a
//! [`MailError`]; nothing here panics or propagates past the handler.

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::stub::AsyncStubTransport;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::config::MailConfig;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("unknown mail transport: {0}")]
    UnknownTransport(String),
    #[error("mailer not configured: {0}")]
    NotConfigured(String),
    #[error("invalid address '{address}': {reason}")]
    Address { address: String, reason: String },
    #[error("could not build message: {0}")]
    Message(String),
    #[error("{0}")]
    Transport(String),
}

impl MailError {
    pub fn kind(&self) -> &'static str {
        match self {
            MailError::UnknownTransport(_) | MailError::NotConfigured(_) => "config",
            MailError::Address { .. } => "address",
            MailError::Message(_) => "malformed",
            MailError::Transport(_) => "transport",
        }
    }
}

enum MailTransport {
    Smtp(AsyncSmtpTransport<Tokio1Executor>),
    Stub(AsyncStubTransport),
    Disabled(String),
}

/// Sends one message per call. Shared behind an `Arc` in handler state.
pub struct Mailer {
    transport: MailTransport,
    from: Option<Mailbox>,
}

impl Mailer {
    /// Build from config plus `SMTP_PASSWORD`.
    ///
    /// A missing password or sender yields a disabled mailer rather than a
    /// startup failure; an unparsable sender or unknown transport is an error.
    pub fn from_config(config: &MailConfig, password: Option<String>) -> Result<Self, MailError> {
        let from = config
            .from
            .as_deref()
            .or(config.username.as_deref())
            .map(parse_mailbox)
            .transpose()?;

        let transport = match config.transport.as_str() {
            "stub" => MailTransport::Stub(AsyncStubTransport::new_ok()),
            "smtp" => match (&config.username, password) {
                (Some(username), Some(password)) => {
                    let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
                        .map_err(|e| MailError::Transport(format!("invalid relay {}: {e}", config.smtp_host)))?
                        .port(config.smtp_port)
                        .credentials(Credentials::new(username.clone(), password))
                        .build();
                    info!(host = %config.smtp_host, port = config.smtp_port, "SMTP mailer ready");
                    MailTransport::Smtp(transport)
                }
                (None, _) => disabled("mail.username is not set"),
                (_, None) => disabled("SMTP_PASSWORD is not set"),
            },
            other => return Err(MailError::UnknownTransport(other.to_string())),
        };

        Ok(Self { transport, from })
    }

    /// Mailer over lettre's stub transport. `ok = false` fails every send.
    pub fn stub(from: &str, ok: bool) -> Result<Self, MailError> {
        let stub = if ok { AsyncStubTransport::new_ok() } else { AsyncStubTransport::new_error() };
        Ok(Self { transport: MailTransport::Stub(stub), from: Some(parse_mailbox(from)?) })
    }

    /// A disabled mailer still validates the message, then reports why it
    /// cannot deliver.
    pub async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        let from = self
            .from
            .clone()
            .ok_or_else(|| MailError::NotConfigured("no sender address".into()))?;

        let message = Message::builder()
            .from(from)
            .to(parse_mailbox(to)?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| MailError::Message(e.to_string()))?;

        debug!(%to, subject_len = subject.len(), body_len = body.len(), "sending email");

        let result = match &self.transport {
            MailTransport::Smtp(t) => t.send(message).await.map(|_| ()).map_err(|e| e.to_string()),
            MailTransport::Stub(t) => t.send(message).await.map(|_| ()).map_err(|e| e.to_string()),
            MailTransport::Disabled(reason) => return Err(MailError::NotConfigured(reason.clone())),
        };

        match result {
            Ok(()) => {
                info!(%to, "email sent");
                Ok(())
            }
            Err(e) => {
                error!(%to, error = %e, "email send failed");
                Err(MailError::Transport(e))
            }
        }
    }
}

fn disabled(reason: &str) -> MailTransport {
    warn!(reason, "SMTP mailer disabled");
    MailTransport::Disabled(reason.to_string())
}

fn parse_mailbox(address: &str) -> Result<Mailbox, MailError> {
    address.trim().parse::<Mailbox>().map_err(|e| MailError::Address {
        address: address.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mail_config(transport: &str) -> MailConfig {
        MailConfig {
            transport: transport.into(),
            smtp_host: "smtp.example.com".into(),
            smtp_port: 587,
            username: Some("bot@example.com".into()),
            from: None,
        }
    }

    #[tokio::test]
    async fn stub_send_succeeds() {
        let mailer = Mailer::stub("bot@example.com", true).unwrap();
        mailer.send("alice@example.com", "Hello", "Body text").await.unwrap();
    }

    #[tokio::test]
    async fn failing_transport_is_transport_error() {
        let mailer = Mailer::stub("bot@example.com", false).unwrap();
        let err = mailer.send("alice@example.com", "Hello", "Body").await.unwrap_err();
        assert_eq!(err.kind(), "transport");
    }

    #[tokio::test]
    async fn bad_recipient_is_address_error() {
        let mailer = Mailer::stub("bot@example.com", true).unwrap();
        let err = mailer.send("not an address", "s", "b").await.unwrap_err();
        assert!(matches!(err, MailError::Address { .. }));
    }

    #[tokio::test]
    async fn smtp_without_password_is_disabled() {
        let mailer = Mailer::from_config(&mail_config("smtp"), None).unwrap();
        let err = mailer.send("alice@example.com", "s", "b").await.unwrap_err();
        assert!(matches!(err, MailError::NotConfigured(ref r) if r.contains("SMTP_PASSWORD")));
    }

    #[tokio::test]
    async fn disabled_mailer_validates_before_reporting() {
        let mut cfg = mail_config("smtp");
        cfg.username = None;
        cfg.from = Some("bot@example.com".into());
        let mailer = Mailer::from_config(&cfg, Some("pw".into())).unwrap();

        let bad = mailer.send("nobody", "s", "b").await.unwrap_err();
        assert!(matches!(bad, MailError::Address { .. }));

        let err = mailer.send("alice@example.com", "s", "b").await.unwrap_err();
        assert_eq!(err.kind(), "config");
        assert!(err.to_string().contains("mail.username"));
    }

    #[test]
    fn unknown_transport_errors() {
        assert!(matches!(
            Mailer::from_config(&mail_config("carrier-pigeon"), None),
            Err(MailError::UnknownTransport(_))
        ));
    }

    #[test]
    fn invalid_sender_errors() {
        let mut cfg = mail_config("stub");
        cfg.from = Some("@@".into());
        assert!(matches!(Mailer::from_config(&cfg, None), Err(MailError::Address { .. })));
    }
}
