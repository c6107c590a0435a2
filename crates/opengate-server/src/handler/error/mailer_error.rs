//! Mail delivery error to HTTP error conversion.
//!
//! A failed provider call is fatal to the surrounding request, but the
//! client only ever sees the generic 500: provider detail (API responses,
//! rate-limit headers, addresses) stays in the server logs.

use opengate_mailer::Error as MailerError;

use crate::handler::{Error, ErrorKind};

/// Tracing target for mail delivery error mapping.
const TRACING_TARGET: &str = "opengate_server::handler::mailer_error";

impl From<MailerError> for Error<'static> {
    fn from(error: MailerError) -> Self {
        tracing::error!(
            target: TRACING_TARGET,
            kind = %error.kind,
            error = %error,
            retryable = error.is_retryable(),
            "email delivery failed"
        );

        ErrorKind::InternalServerError.into_error()
    }
}

#[cfg(test)]
mod tests {
    use opengate_mailer::ErrorKind as MailerErrorKind;

    use super::*;

    #[test]
    fn provider_failures_collapse_to_500_without_detail() {
        let provider_error = MailerError::new(MailerErrorKind::ProviderError)
            .with_message("recipient mailbox rejected by api.resend.com");

        let error: Error = provider_error.into();

        assert_eq!(error.kind(), ErrorKind::InternalServerError);
        assert_eq!(error.message(), None);
        assert_eq!(error.context(), None);
    }
}
