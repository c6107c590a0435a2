//! Request extractors and response parts.

mod auth;
mod reject;

pub use auth::{AuthSession, SESSION_COOKIE_NAME, SessionClaims, SessionCookie};
pub use reject::{Json, ValidateJson};

/// Tracing target for authentication extraction.
pub(crate) const TRACING_TARGET_AUTHENTICATION: &str = "opengate_server::extract::authentication";
