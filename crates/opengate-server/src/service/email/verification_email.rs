//! Verification email composition.

use opengate_mailer::MailMessage;

use crate::service::FrontendUrl;

/// Email verification message sent at registration and on resend.
///
/// The embedded link points at the browser front end, which forwards the
/// token back to the confirmation endpoint.
#[must_use]
#[derive(Debug, Clone)]
pub struct VerificationEmail {
    to: String,
    verify_url: String,
}

impl VerificationEmail {
    /// Subject line for all verification emails.
    pub const SUBJECT: &'static str = "Verify your email address";

    /// Composes a verification email for the given recipient and token.
    pub fn new(to: impl Into<String>, frontend_url: &FrontendUrl, token: &str) -> Self {
        Self {
            to: to.into(),
            verify_url: frontend_url.verify_email_link(token),
        }
    }

    /// Returns the verification link embedded in the message body.
    pub fn verify_url(&self) -> &str {
        &self.verify_url
    }

    /// Renders this email into a deliverable message.
    pub fn into_message(self) -> MailMessage {
        let html = format!(
            "<h1>Email Verification</h1>\n\
             <p>Please click the link below to verify your email address:</p>\n\
             <a href=\"{}\">Verify Email</a>\n\
             <p>This link will expire in 24 hours.</p>",
            self.verify_url
        );

        MailMessage::new(self.to, Self::SUBJECT, html)
    }
}

#[cfg(test)]
mod tests {
    use crate::service::FrontendUrl;

    use super::*;

    #[test]
    fn message_embeds_exact_token_in_link() {
        let frontend = FrontendUrl::new("https://app.example.com");
        let token = "ab".repeat(32);
        let email = VerificationEmail::new("user@example.com", &frontend, &token);

        let expected_link = format!("https://app.example.com/verify-email?token={token}");
        assert_eq!(email.verify_url(), expected_link);

        let message = email.into_message();
        assert_eq!(message.to, "user@example.com");
        assert_eq!(message.subject, VerificationEmail::SUBJECT);
        assert!(message.html.contains(&expected_link));
        assert!(message.html.contains("expire in 24 hours"));
    }

    #[test]
    fn message_passes_mailer_validation() {
        let frontend = FrontendUrl::new("http://localhost:5173");
        let email = VerificationEmail::new("user@example.com", &frontend, "deadbeef");

        assert!(email.into_message().validate().is_ok());
    }
}
