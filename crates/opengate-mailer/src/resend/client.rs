//! Reqwest-based client for the Resend HTTP API.

use std::sync::Arc;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use super::{ResendConfig, TRACING_TARGET};
use crate::{Error, ErrorKind, MailMessage, MailProvider, MailReceipt, Result};

/// Wire format of a send request.
#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

/// Wire format of a successful send response.
#[derive(Debug, Deserialize)]
struct SendEmailResponse {
    id: String,
}

/// Wire format of an error response.
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    message: String,
}

struct ResendClientInner {
    http: Client,
    config: ResendConfig,
}

/// HTTP client delivering messages to a Resend-compatible API.
///
/// Cloning is cheap; all clones share the same connection pool.
#[derive(Clone)]
pub struct ResendClient {
    inner: Arc<ResendClientInner>,
}

impl std::fmt::Debug for ResendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResendClient")
            .field("base_url", &self.inner.config.resend_base_url)
            .field("from", &self.inner.config.mail_from)
            .finish_non_exhaustive()
    }
}

impl ResendClient {
    /// Creates a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Configuration`] when the configuration is
    /// invalid or the HTTP client cannot be constructed.
    pub fn new(config: ResendConfig) -> Result<Self> {
        config.validate()?;

        tracing::debug!(
            target: TRACING_TARGET,
            base_url = %config.resend_base_url,
            timeout_secs = config.mail_timeout_secs,
            "Creating Resend client"
        );

        let http = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("opengate/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                Error::from_source(ErrorKind::Configuration, e)
                    .with_message("Failed to create HTTP client")
            })?;

        let inner = ResendClientInner { http, config };
        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Gets the client configuration.
    pub fn config(&self) -> &ResendConfig {
        &self.inner.config
    }

    /// Converts this client into a [`MailerService`] for dependency injection.
    ///
    /// [`MailerService`]: crate::MailerService
    pub fn into_service(self) -> crate::MailerService {
        crate::MailerService::new(self)
    }

    /// Maps a non-success HTTP status to a delivery error.
    fn status_error(status: StatusCode, detail: String) -> Error {
        let kind = match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ErrorKind::Authentication,
            StatusCode::TOO_MANY_REQUESTS => ErrorKind::RateLimited,
            s if s.is_server_error() => ErrorKind::ServiceUnavailable,
            _ => ErrorKind::ProviderError,
        };

        let message = if detail.is_empty() {
            format!("Provider responded with status {}", status.as_u16())
        } else {
            detail
        };

        Error::new(kind).with_message(message)
    }
}

#[async_trait::async_trait]
impl MailProvider for ResendClient {
    async fn send(&self, message: &MailMessage) -> Result<MailReceipt> {
        let config = &self.inner.config;
        let payload = SendEmailRequest {
            from: &config.mail_from,
            to: [message.to.as_str()],
            subject: &message.subject,
            html: &message.html,
        };

        tracing::debug!(
            target: TRACING_TARGET,
            to = %message.to,
            subject = %message.subject,
            "posting message to provider"
        );

        let response = self
            .inner
            .http
            .post(config.emails_endpoint())
            .bearer_auth(&config.resend_api_key)
            .json(&payload)
            .send()
            .await
            .map_err(Error::from)?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<ApiErrorResponse>()
                .await
                .map(|e| e.message)
                .unwrap_or_default();

            tracing::warn!(
                target: TRACING_TARGET,
                to = %message.to,
                status = status.as_u16(),
                detail = %detail,
                "provider rejected message"
            );

            return Err(Self::status_error(status, detail));
        }

        let body: SendEmailResponse = response.json().await.map_err(|e| {
            Error::from_source(ErrorKind::Serialization, e)
                .with_message("Provider returned an unexpected response body")
        })?;

        tracing::debug!(
            target: TRACING_TARGET,
            to = %message.to,
            provider_id = %body.id,
            "provider accepted message"
        );

        Ok(MailReceipt::new(Some(body.id)))
    }

    fn provider_name(&self) -> &'static str {
        "resend"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_requires_api_key() {
        assert!(ResendClient::new(ResendConfig::default()).is_err());
        assert!(ResendClient::new(ResendConfig::new("re_test_key")).is_ok());
    }

    #[test]
    fn request_payload_shape() {
        let payload = SendEmailRequest {
            from: "noreply@example.com",
            to: ["user@example.com"],
            subject: "Verify your email address",
            html: "<p>Hello</p>",
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["from"], "noreply@example.com");
        assert_eq!(json["to"][0], "user@example.com");
        assert_eq!(json["subject"], "Verify your email address");
        assert_eq!(json["html"], "<p>Hello</p>");
    }

    #[test]
    fn status_mapping() {
        let auth = ResendClient::status_error(StatusCode::UNAUTHORIZED, String::new());
        assert_eq!(auth.kind, ErrorKind::Authentication);

        let limited = ResendClient::status_error(StatusCode::TOO_MANY_REQUESTS, String::new());
        assert_eq!(limited.kind, ErrorKind::RateLimited);
        assert!(limited.is_retryable());

        let unavailable = ResendClient::status_error(StatusCode::BAD_GATEWAY, String::new());
        assert_eq!(unavailable.kind, ErrorKind::ServiceUnavailable);

        let rejected = ResendClient::status_error(StatusCode::UNPROCESSABLE_ENTITY, String::new());
        assert_eq!(rejected.kind, ErrorKind::ProviderError);
        assert!(!rejected.is_retryable());
    }

    #[test]
    fn status_error_prefers_provider_detail() {
        let error =
            ResendClient::status_error(StatusCode::UNPROCESSABLE_ENTITY, "bad address".into());
        assert!(error.to_string().contains("bad address"));
    }
}
