//! Secure password hashing and verification using Argon2id.
//!
//! Hashing always generates a fresh random salt, so hashing the same
//! plaintext twice yields different digests. Verification distinguishes a
//! mismatch (an expected outcome, `Ok(false)`) from a malformed stored
//! digest (a server-side defect, surfaced as an error).

use argon2::password_hash::{Error as ArgonError, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher as _, PasswordVerifier};
use rand::rngs::OsRng;

use crate::handler::{ErrorKind, Result};

/// Tracing target for password hashing operations.
const TRACING_TARGET: &str = "opengate_server::service::password_hasher";

/// Password hashing and verification service using Argon2id.
///
/// Uses the algorithm's default parameters as the fixed work factor; the
/// resulting PHC string embeds parameters and salt, so digests remain
/// verifiable across parameter upgrades.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// Creates a new instance of the [`PasswordHasher`] service.
    pub fn new() -> Self {
        let argon2 = Argon2::default();
        Self { argon2 }
    }

    /// Hashes a password with a cryptographically secure random salt.
    ///
    /// # Returns
    ///
    /// A PHC string format hash including the algorithm, parameters, salt,
    /// and hash value, suitable for direct database storage.
    ///
    /// # Errors
    ///
    /// Returns `ErrorKind::InternalServerError` if salt generation or the
    /// hashing operation fails. The plaintext is never logged.
    pub fn hash_password(&self, password: &str) -> Result<String> {
        let salt = SaltString::try_from_rng(&mut OsRng).map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET,
                error = %e,
                "failed to generate cryptographically secure salt"
            );

            ErrorKind::InternalServerError
                .with_message("Password processing failed")
                .with_context("Salt generation error")
                .with_resource("authentication")
        })?;

        let password_hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %e,
                    "password hashing operation failed"
                );

                ErrorKind::InternalServerError
                    .with_message("Password processing failed")
                    .with_context("Hash generation error")
                    .with_resource("authentication")
            })?;

        Ok(password_hash.to_string())
    }

    /// Verifies a password against a stored digest.
    ///
    /// Comparison is timing-safe. A wrong password is a normal outcome and
    /// returns `Ok(false)`; only a malformed digest or a verifier failure
    /// produces an error.
    ///
    /// # Errors
    ///
    /// Returns `ErrorKind::InternalServerError` when the stored digest is
    /// not a valid PHC string or the verifier itself fails.
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(stored_hash).map_err(|e| {
            tracing::warn!(
                target: TRACING_TARGET,
                error = %e,
                "invalid password digest format in storage"
            );

            ErrorKind::InternalServerError
                .with_message("Authentication system temporarily unavailable")
                .with_context("Digest format error")
                .with_resource("authentication")
        })?;

        match self
            .argon2
            .verify_password(password.as_bytes(), &parsed_hash)
        {
            Ok(()) => Ok(true),
            Err(ArgonError::Password) => Ok(false),
            Err(e) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %e,
                    "password verification system error"
                );

                Err(ErrorKind::InternalServerError
                    .with_message("Authentication temporarily unavailable")
                    .with_context("Verification error")
                    .with_resource("authentication"))
            }
        }
    }

    /// Performs a dummy verification to maintain consistent timing.
    ///
    /// Used when an account does not exist, so login attempts cannot
    /// distinguish unknown addresses from wrong passwords by timing. Always
    /// returns `false` but performs the full cryptographic work.
    pub fn verify_dummy_password(&self, password: &str) -> bool {
        use rand::Rng;

        let password_len = rand::random_range(16..32);
        let dummy_password: String = (0..password_len)
            .map(|_| rand::rng().sample(rand::distr::Alphanumeric) as char)
            .collect();

        if let Ok(dummy_hash) = self.hash_password(&dummy_password) {
            let _ = self.verify_password(password, &dummy_hash);
        }

        false
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}
