//! Authenticated session request guard.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum_extra::extract::cookie::CookieJar;

use super::{SESSION_COOKIE_NAME, SessionClaims};
use crate::extract::TRACING_TARGET_AUTHENTICATION;
use crate::handler::{Error, ErrorKind};
use crate::service::SessionKeys;

/// Request guard that requires a valid session cookie.
///
/// Extraction reads the `auth` cookie, verifies the token signature and
/// expiry, and yields the validated [`SessionClaims`]. Handlers that take
/// this extractor are unreachable without authentication.
///
/// Validated claims are cached in request extensions, so stacking this
/// guard with middleware does not re-verify the token.
#[must_use]
#[derive(Debug, Clone)]
pub struct AuthSession(pub SessionClaims);

impl AuthSession {
    /// Consumes the guard and returns the session claims.
    #[inline]
    pub fn into_claims(self) -> SessionClaims {
        self.0
    }
}

impl<S> FromRequestParts<S> for AuthSession
where
    S: Send + Sync,
    SessionKeys: FromRef<S>,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Return cached claims if another extractor already validated them
        if let Some(claims) = parts.extensions.get::<SessionClaims>() {
            return Ok(Self(claims.clone()));
        }

        let jar = CookieJar::from_headers(&parts.headers);
        let Some(cookie) = jar.get(SESSION_COOKIE_NAME) else {
            tracing::debug!(
                target: TRACING_TARGET_AUTHENTICATION,
                "request rejected: session cookie missing"
            );

            return Err(ErrorKind::MissingAuthToken
                .with_message("Authentication required")
                .with_context("Missing session cookie")
                .with_resource("authentication"));
        };

        let session_keys = SessionKeys::from_ref(state);
        let claims = SessionClaims::decode(cookie.value(), session_keys.decoding_key())?;

        // Cache for subsequent extractors in the same request
        parts.extensions.insert(claims.clone());
        Ok(Self(claims))
    }
}
