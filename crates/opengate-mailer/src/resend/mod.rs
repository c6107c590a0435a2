//! Resend-compatible HTTP delivery backend.

mod client;
mod config;

pub use client::ResendClient;
pub use config::ResendConfig;

/// Tracing target for the Resend backend.
pub(crate) const TRACING_TARGET: &str = "opengate_mailer::resend";
