//! No-op provider for development and tests.

use crate::{MailMessage, MailProvider, MailReceipt, Result, TRACING_TARGET};

/// Provider that accepts every message without sending anything.
///
/// Used when no API key is configured (local development) and in tests, so
/// registration flows can run end to end without an external dependency.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMailer;

impl NoopMailer {
    /// Creates a new no-op provider.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl MailProvider for NoopMailer {
    async fn send(&self, message: &MailMessage) -> Result<MailReceipt> {
        tracing::info!(
            target: TRACING_TARGET,
            to = %message.to,
            subject = %message.subject,
            "email delivery disabled, message dropped"
        );

        Ok(MailReceipt::new(None))
    }

    fn provider_name(&self) -> &'static str {
        "noop"
    }
}
