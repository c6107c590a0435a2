//! Session signing keys for JWT-based authentication.
//!
//! Tokens are signed with HMAC-SHA256 using a single server-held secret
//! taken from configuration, so both keys below derive from the same
//! material.

use std::fmt;
use std::sync::Arc;

use jsonwebtoken::{DecodingKey, EncodingKey};

use crate::{Error, Result};

/// Tracing target for session key management.
const TRACING_TARGET: &str = "opengate_server::service::session_keys";

/// Minimum accepted secret length in bytes.
///
/// HS256 derives its strength from the secret; anything shorter than the
/// hash output is rejected as a misconfiguration.
const MIN_SECRET_BYTES: usize = 32;

/// Secret keys used for signing and verifying session tokens.
///
/// Thread-safe and cheap to clone; all clones share the same key material.
#[derive(Clone)]
pub struct SessionKeys {
    inner: Arc<SessionKeysInner>,
}

struct SessionKeysInner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl SessionKeys {
    /// Creates session keys from the configured signing secret.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the secret is shorter than
    /// [`MIN_SECRET_BYTES`].
    pub fn from_secret(secret: &str) -> Result<Self> {
        if secret.len() < MIN_SECRET_BYTES {
            return Err(Error::config(format!(
                "Session secret must be at least {} bytes",
                MIN_SECRET_BYTES
            )));
        }

        tracing::debug!(
            target: TRACING_TARGET,
            secret_bytes = secret.len(),
            "session signing keys initialized"
        );

        let inner = SessionKeysInner {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        };

        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Returns the key used to sign session tokens.
    #[inline]
    pub fn encoding_key(&self) -> &EncodingKey {
        &self.inner.encoding_key
    }

    /// Returns the key used to verify session tokens.
    #[inline]
    pub fn decoding_key(&self) -> &DecodingKey {
        &self.inner.decoding_key
    }

    /// Validates that the keys are functional for JWT operations.
    ///
    /// Performs a round-trip by signing and verifying a short-lived test
    /// token.
    ///
    /// # Errors
    ///
    /// Returns an auth error when either half of the round trip fails.
    pub fn validate_keys(&self) -> Result<()> {
        use jsonwebtoken::{Algorithm, Header, Validation, decode, encode};
        use serde::{Deserialize, Serialize};

        #[derive(Debug, Serialize, Deserialize)]
        struct TestClaims {
            sub: String,
            exp: i64,
        }

        let claims = TestClaims {
            sub: "key-validation".to_owned(),
            exp: jiff::Timestamp::now().as_second() + 300,
        };

        let header = Header::new(Algorithm::HS256);
        let token = encode(&header, &claims, self.encoding_key()).map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET,
                error = %e,
                "key validation failed during encoding"
            );
            Error::auth("key validation encoding failed").with_source(e)
        })?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        decode::<TestClaims>(&token, self.decoding_key(), &validation).map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET,
                error = %e,
                "key validation failed during decoding"
            );
            Error::auth("key validation decoding failed").with_source(e)
        })?;

        Ok(())
    }
}

impl fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionKeys").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "an-adequately-long-test-secret-value";

    #[test]
    fn accepts_adequate_secret() {
        let keys = SessionKeys::from_secret(TEST_SECRET).unwrap();
        assert!(keys.validate_keys().is_ok());
    }

    #[test]
    fn rejects_short_secret() {
        assert!(SessionKeys::from_secret("short").is_err());
        assert!(SessionKeys::from_secret("").is_err());
    }

    #[test]
    fn different_secrets_do_not_cross_verify() {
        use jsonwebtoken::{Algorithm, Header, Validation, decode, encode};
        use serde::{Deserialize, Serialize};

        #[derive(Debug, Serialize, Deserialize)]
        struct TestClaims {
            sub: String,
            exp: i64,
        }

        let keys_a = SessionKeys::from_secret(TEST_SECRET).unwrap();
        let keys_b =
            SessionKeys::from_secret("a-completely-different-signing-secret").unwrap();

        let claims = TestClaims {
            sub: "account".to_owned(),
            exp: jiff::Timestamp::now().as_second() + 300,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            keys_a.encoding_key(),
        )
        .unwrap();

        let validation = Validation::new(Algorithm::HS256);
        assert!(decode::<TestClaims>(&token, keys_b.decoding_key(), &validation).is_err());
    }

    #[test]
    fn debug_output_hides_key_material() {
        let keys = SessionKeys::from_secret(TEST_SECRET).unwrap();
        let debug = format!("{:?}", keys);
        assert!(!debug.contains(TEST_SECRET));
    }
}
