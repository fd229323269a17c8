//! Comms subsystem — inbound channels.
//!
//! Only the axum HTTP channel exists.

pub mod axum_channel;
