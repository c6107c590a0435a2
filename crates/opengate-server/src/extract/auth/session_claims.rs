//! JWT claims for session tokens.

use std::borrow::Cow;

use jiff::{SignedDuration, Timestamp};
use jsonwebtoken::errors::{Error as JwtError, ErrorKind as JwtErrorKind};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::extract::TRACING_TARGET_AUTHENTICATION;
use crate::handler::{Error, ErrorKind, Result};

/// JWT claims for session tokens.
///
/// Contains the RFC 7519 registered claims this service uses. Sessions are
/// stateless: nothing is persisted server-side, so a token is valid exactly
/// when its signature checks out and its expiry has not passed.
///
/// | Claim | Field | Description |
/// |-------|-------|-------------|
/// | `iss` | `issued_by` | Token issuer identifier |
/// | `aud` | `audience` | Token audience identifier |
/// | `jti` | `token_id` | Unique token identifier for log correlation |
/// | `sub` | `account_id` | Account ID this session belongs to |
/// | `iat` | `issued_at` | Token creation timestamp (unix seconds) |
/// | `exp` | `expires_at` | Token expiration timestamp (unix seconds) |
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct SessionClaims {
    /// Issuer (who created the token).
    #[serde(rename = "iss")]
    issued_by: Cow<'static, str>,
    /// Audience (who the token is intended for).
    #[serde(rename = "aud")]
    audience: Cow<'static, str>,

    /// JWT ID (unique identifier for this token).
    #[serde(rename = "jti")]
    pub token_id: Uuid,
    /// Subject: the account this session belongs to.
    #[serde(rename = "sub")]
    pub account_id: Uuid,

    /// Issued at (as unix seconds).
    #[serde(rename = "iat", with = "jiff::fmt::serde::timestamp::second::required")]
    pub issued_at: Timestamp,
    /// Expiration time (as unix seconds).
    #[serde(rename = "exp", with = "jiff::fmt::serde::timestamp::second::required")]
    pub expires_at: Timestamp,
}

impl SessionClaims {
    /// JWT audience identifier for session tokens.
    const JWT_AUDIENCE: &'static str = "opengate:accounts";
    /// JWT issuer identifier for session tokens.
    const JWT_ISSUER: &'static str = "opengate";
    /// Fixed session lifetime: one year.
    pub const SESSION_LIFETIME: SignedDuration = SignedDuration::from_hours(24 * 365);

    /// Creates claims for a new session expiring [`SESSION_LIFETIME`] from now.
    ///
    /// [`SESSION_LIFETIME`]: Self::SESSION_LIFETIME
    pub fn new(account_id: Uuid) -> Self {
        Self::with_lifetime(account_id, Self::SESSION_LIFETIME)
    }

    /// Creates claims with an explicit lifetime.
    ///
    /// Primarily useful in tests, where expiry behavior is exercised by
    /// issuing tokens that are already expired.
    pub fn with_lifetime(account_id: Uuid, lifetime: SignedDuration) -> Self {
        let issued_at = Timestamp::now();

        Self {
            issued_by: Cow::Borrowed(Self::JWT_ISSUER),
            audience: Cow::Borrowed(Self::JWT_AUDIENCE),
            token_id: Uuid::new_v4(),
            account_id,
            issued_at,
            expires_at: issued_at
                .saturating_add(lifetime)
                .expect("SignedDuration arithmetic saturates and cannot error"),
        }
    }

    /// Checks if the token has expired based on current UTC time.
    #[inline]
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Timestamp::now()
    }

    /// Returns the remaining lifetime of this token, or zero if expired.
    #[inline]
    #[must_use]
    pub fn remaining_lifetime(&self) -> SignedDuration {
        let remaining = self.expires_at.duration_since(Timestamp::now());
        remaining.max(SignedDuration::ZERO)
    }

    /// Returns the total lifetime this token was issued with.
    #[inline]
    #[must_use]
    pub fn total_lifetime(&self) -> SignedDuration {
        self.expires_at.duration_since(self.issued_at)
    }

    /// Encodes the claims into a signed JWT token.
    ///
    /// # Errors
    ///
    /// Returns a generic 500 when signing fails; a failure here means the
    /// signing key is misconfigured.
    pub fn encode(&self, encoding_key: &EncodingKey) -> Result<String> {
        let header = Header::new(Algorithm::HS256);

        encode(&header, self, encoding_key).map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET_AUTHENTICATION,
                error = %e,
                account_id = %self.account_id,
                "failed to encode session token"
            );

            ErrorKind::InternalServerError
                .with_message("Authentication token generation failed")
                .with_context("Unable to create session token")
                .with_resource("authentication")
        })
    }

    /// Parses and validates a JWT token.
    ///
    /// Validation covers the signature, standard claims (issuer, audience,
    /// expiry), and the presence of every claim this service issues.
    ///
    /// # Errors
    ///
    /// Returns distinct authentication errors for expired, tampered, and
    /// malformed tokens.
    pub fn decode(token: &str, decoding_key: &DecodingKey) -> Result<Self> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_aud = true;
        validation.set_audience(&[Self::JWT_AUDIENCE]);
        validation.set_issuer(&[Self::JWT_ISSUER]);
        validation.set_required_spec_claims(&["iss", "aud", "jti", "sub", "iat", "exp"]);

        let token_data = decode::<Self>(token, decoding_key, &validation)?;
        let claims = token_data.claims;

        // The library already validated `exp` with leeway; this re-check
        // keeps a token from slipping through exactly at the boundary.
        if claims.is_expired() {
            tracing::warn!(
                target: TRACING_TARGET_AUTHENTICATION,
                token_id = %claims.token_id,
                account_id = %claims.account_id,
                expired_at = %claims.expires_at,
                "session token validation failed: token expired"
            );

            return Err(ErrorKind::Unauthorized
                .with_message("Authentication session has expired")
                .with_context("Please sign in again to continue")
                .with_resource("authentication"));
        }

        tracing::debug!(
            target: TRACING_TARGET_AUTHENTICATION,
            token_id = %claims.token_id,
            account_id = %claims.account_id,
            "session token validation completed successfully"
        );

        Ok(claims)
    }
}

impl From<JwtError> for Error<'static> {
    fn from(error: JwtError) -> Self {
        match error.kind() {
            JwtErrorKind::ExpiredSignature => ErrorKind::Unauthorized
                .with_message("Your session has expired")
                .with_context("Please sign in again to continue"),
            JwtErrorKind::InvalidSignature => ErrorKind::Unauthorized
                .with_message("Authentication token verification failed")
                .with_context("Token signature could not be verified"),
            JwtErrorKind::InvalidToken => ErrorKind::MalformedAuthToken
                .with_message("Authentication token is invalid")
                .with_context("The provided token format is unrecognized"),
            JwtErrorKind::InvalidAlgorithm => ErrorKind::MalformedAuthToken
                .with_message("Authentication token uses unsupported format")
                .with_context("Token was signed with an incompatible algorithm"),
            JwtErrorKind::InvalidAudience => ErrorKind::Unauthorized
                .with_message("Authentication token is not valid for this service")
                .with_context("Token was issued for a different application"),
            JwtErrorKind::InvalidIssuer => ErrorKind::Unauthorized
                .with_message("Authentication token is from an untrusted source")
                .with_context("Token was not issued by this authentication system"),
            JwtErrorKind::MissingRequiredClaim(claim) => ErrorKind::MalformedAuthToken
                .with_message("Authentication token is incomplete")
                .with_context(format!("Token is missing required field: {}", claim)),
            JwtErrorKind::Base64(_) => ErrorKind::MalformedAuthToken
                .with_message("Authentication token format is corrupted")
                .with_context("Token contains invalid base64 encoding"),
            JwtErrorKind::Json(_) => ErrorKind::MalformedAuthToken
                .with_message("Authentication token structure is invalid")
                .with_context("Token payload contains malformed data"),
            _ => ErrorKind::InternalServerError
                .with_message("Authentication processing failed")
                .with_context("An unexpected error occurred during token validation"),
        }
    }
}
