//! Delivery receipts returned by providers.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Proof that a provider accepted a message for delivery.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailReceipt {
    /// Provider-assigned message identifier, when the provider returns one.
    pub provider_id: Option<String>,
    /// Timestamp at which the provider accepted the message.
    pub accepted_at: Timestamp,
}

impl MailReceipt {
    /// Creates a receipt accepted now.
    pub fn new(provider_id: Option<String>) -> Self {
        Self {
            provider_id,
            accepted_at: Timestamp::now(),
        }
    }

    /// Returns the provider id usable for log correlation.
    pub fn provider_id(&self) -> Option<&str> {
        self.provider_id.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn receipt_carries_provider_id() {
        let receipt = MailReceipt::new(Some("msg_123".to_owned()));
        assert_eq!(receipt.provider_id(), Some("msg_123"));
    }

    #[test]
    fn receipt_without_provider_id() {
        let receipt = MailReceipt::new(None);
        assert!(receipt.provider_id().is_none());
    }
}
