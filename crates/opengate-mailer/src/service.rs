//! Cloneable service handle over a mail provider.

use std::fmt;
use std::sync::Arc;

use crate::{MailMessage, MailProvider, MailReceipt, Result, TRACING_TARGET};

/// Shared handle to a [`MailProvider`] for dependency injection.
///
/// The handle validates messages before delegating to the provider and logs
/// the outcome; it is cheap to clone and safe to store in HTTP state.
#[derive(Clone)]
pub struct MailerService {
    provider: Arc<dyn MailProvider>,
}

impl MailerService {
    /// Creates a new service wrapping the given provider.
    pub fn new(provider: impl MailProvider + 'static) -> Self {
        Self {
            provider: Arc::new(provider),
        }
    }

    /// Delivers a message through the underlying provider.
    ///
    /// # Errors
    ///
    /// Returns the provider's error unchanged; the message is validated
    /// first, so providers never see empty recipients.
    pub async fn send(&self, message: &MailMessage) -> Result<MailReceipt> {
        message.validate()?;

        tracing::debug!(
            target: TRACING_TARGET,
            provider = self.provider.provider_name(),
            to = %message.to,
            subject = %message.subject,
            "delivering message"
        );

        let receipt = self.provider.send(message).await.inspect_err(|error| {
            tracing::warn!(
                target: TRACING_TARGET,
                provider = self.provider.provider_name(),
                to = %message.to,
                error = %error,
                retryable = error.is_retryable(),
                "message delivery failed"
            );
        })?;

        tracing::info!(
            target: TRACING_TARGET,
            provider = self.provider.provider_name(),
            to = %message.to,
            provider_id = receipt.provider_id().unwrap_or("-"),
            "message accepted by provider"
        );

        Ok(receipt)
    }

    /// Returns the name of the wrapped provider.
    pub fn provider_name(&self) -> &'static str {
        self.provider.provider_name()
    }
}

impl fmt::Debug for MailerService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailerService")
            .field("provider", &self.provider.provider_name())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NoopMailer;

    #[tokio::test]
    async fn noop_service_accepts_valid_messages() {
        let service = MailerService::new(NoopMailer::new());
        let message = MailMessage::new("user@example.com", "Hi", "<p>Hi</p>");

        let receipt = service.send(&message).await.unwrap();
        assert!(receipt.provider_id().is_none());
        assert_eq!(service.provider_name(), "noop");
    }

    #[tokio::test]
    async fn service_rejects_invalid_messages_before_provider() {
        let service = MailerService::new(NoopMailer::new());
        let message = MailMessage::new("", "Hi", "<p>Hi</p>");

        assert!(service.send(&message).await.is_err());
    }
}
