//! Subsystems wired together by `main`.
//!
//! - **comms** — the axum HTTP channel and its handlers.
//! - **tools** — outbound GitHub, email and LinkedIn actions.

pub mod comms;
pub mod tools;
