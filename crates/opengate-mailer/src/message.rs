//! Outbound message representation.

use serde::{Deserialize, Serialize};

use crate::{Error, ErrorKind, Result};

/// A single transactional message ready for delivery.
///
/// The sender address is a provider-level setting, not part of the message:
/// every message a deployment sends comes from the same configured address.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailMessage {
    /// Recipient email address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub html: String,
}

impl MailMessage {
    /// Creates a new message.
    pub fn new(
        to: impl Into<String>,
        subject: impl Into<String>,
        html: impl Into<String>,
    ) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            html: html.into(),
        }
    }

    /// Validates the message before handing it to a provider.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidInput`] when the recipient or subject is
    /// empty, or the recipient is not plausibly an email address.
    pub fn validate(&self) -> Result<()> {
        if self.to.trim().is_empty() {
            return Err(Error::new(ErrorKind::InvalidInput).with_message("Recipient is empty"));
        }

        if !self.to.contains('@') {
            return Err(Error::new(ErrorKind::InvalidInput)
                .with_message("Recipient is not an email address"));
        }

        if self.subject.trim().is_empty() {
            return Err(Error::new(ErrorKind::InvalidInput).with_message("Subject is empty"));
        }

        Ok(())
    }
}
