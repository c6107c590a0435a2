//! Email verification challenge generation.
//!
//! A challenge is an opaque 256-bit token drawn from the OS CSPRNG and a
//! fixed 24-hour expiry. The entropy makes guessing infeasible within the
//! expiry window; single use is enforced by the store, which clears the
//! token on confirmation.

use jiff::{SignedDuration, Timestamp};
use rand::TryRngCore;
use rand::rngs::OsRng;

use crate::handler::{ErrorKind, Result};

/// Tracing target for verification token generation.
const TRACING_TARGET: &str = "opengate_server::service::verification_token";

/// Number of random bytes in a verification token (256 bits).
pub const VERIFICATION_TOKEN_BYTES: usize = 32;

/// Lifetime of a verification challenge.
pub const VERIFICATION_TTL: SignedDuration = SignedDuration::from_hours(24);

/// A pending email ownership challenge.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationChallenge {
    /// Hex-encoded random token embedded in the verification link.
    pub token: String,
    /// Instant after which the challenge can no longer be confirmed.
    pub expires_at: Timestamp,
}

impl VerificationChallenge {
    /// Generates a fresh challenge expiring [`VERIFICATION_TTL`] from now.
    ///
    /// # Errors
    ///
    /// Returns `ErrorKind::InternalServerError` when the OS random source
    /// is unavailable.
    pub fn generate() -> Result<Self> {
        let mut bytes = [0u8; VERIFICATION_TOKEN_BYTES];
        OsRng.try_fill_bytes(&mut bytes).map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET,
                error = %e,
                "failed to draw verification token from OS random source"
            );

            ErrorKind::InternalServerError
                .with_message("Verification token generation failed")
                .with_resource("authentication")
        })?;

        Ok(Self {
            token: hex::encode(bytes),
            expires_at: Timestamp::now() + VERIFICATION_TTL,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_hex_encoded_with_full_entropy() {
        let challenge = VerificationChallenge::generate().unwrap();

        assert_eq!(challenge.token.len(), VERIFICATION_TOKEN_BYTES * 2);
        assert!(challenge.token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn tokens_differ_across_generations() {
        let first = VerificationChallenge::generate().unwrap();
        let second = VerificationChallenge::generate().unwrap();

        assert_ne!(first.token, second.token);
    }

    #[test]
    fn expiry_is_twenty_four_hours_out() {
        let challenge = VerificationChallenge::generate().unwrap();
        let remaining = challenge.expires_at.duration_since(Timestamp::now());

        assert!(remaining.as_secs() > 23 * 3600);
        assert!(remaining.as_secs() <= 24 * 3600);
    }
}
