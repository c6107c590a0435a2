//! Application services, configuration, and shared state.

pub mod email;
pub mod security;

mod service_config;
mod service_state;

pub use email::VerificationEmail;
pub use security::{PasswordHasher, SessionKeys, VerificationChallenge};
pub use service_config::ServiceConfig;
pub use service_state::ServiceState;

/// Attributes applied to the session cookie, derived from deployment mode.
///
/// The cookie is always HTTP-only and same-site strict; the `Secure`
/// attribute is set only when the server runs behind TLS in production.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct CookiePolicy {
    /// Whether the session cookie carries the `Secure` attribute.
    pub secure: bool,
}

impl CookiePolicy {
    /// Policy for production deployments (cookie restricted to HTTPS).
    pub const fn production() -> Self {
        Self { secure: true }
    }

    /// Policy for local development over plain HTTP.
    pub const fn development() -> Self {
        Self { secure: false }
    }
}

/// Base URL of the browser front end, used to build links embedded in
/// outgoing emails.
#[derive(Debug, Clone)]
#[must_use]
pub struct FrontendUrl(std::sync::Arc<str>);

impl FrontendUrl {
    /// Creates a new frontend URL handle.
    pub fn new(base: impl AsRef<str>) -> Self {
        Self(base.as_ref().trim_end_matches('/').into())
    }

    /// Returns the base URL without a trailing slash.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the client-side email verification link for the given token.
    ///
    /// The token is the exact hex value persisted with the account; the
    /// client route forwards it back to `GET /verify-email`.
    pub fn verify_email_link(&self, token: &str) -> String {
        format!("{}/verify-email?token={}", self.0, token)
    }
}
