//! Outbound tools used by the HTTP handlers.
//!
//! - **github** — repository create / delete over the REST API.
//! - **email** — SMTP mailer.
//! - **linkedin** — canned-response stub.

pub mod email;
pub mod github;
pub mod linkedin;
