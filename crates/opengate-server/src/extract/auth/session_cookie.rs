//! Session cookie response part.
//!
//! The session token travels in an HTTP-only cookie rather than a response
//! body, so browser scripts never see it. The cookie is same-site strict
//! and, in production, restricted to HTTPS.

use axum::response::{IntoResponseParts, ResponseParts};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use super::SessionClaims;
use crate::handler::{Error, Result};
use crate::service::{CookiePolicy, SessionKeys};

/// Name of the session cookie.
pub const SESSION_COOKIE_NAME: &str = "auth";

/// Session cookie generator for successful registration and login.
///
/// Returned from handlers as a response part; serialization signs the
/// claims and emits the `Set-Cookie` header.
#[must_use]
#[derive(Debug, Clone)]
pub struct SessionCookie {
    claims: SessionClaims,
    keys: SessionKeys,
    policy: CookiePolicy,
}

impl SessionCookie {
    /// Creates a new session cookie with the given claims and keys.
    #[inline]
    pub const fn new(claims: SessionClaims, keys: SessionKeys, policy: CookiePolicy) -> Self {
        Self {
            claims,
            keys,
            policy,
        }
    }

    /// Returns a reference to the session claims.
    #[inline]
    pub const fn as_claims(&self) -> &SessionClaims {
        &self.claims
    }

    /// Builds the signed cookie.
    ///
    /// # Errors
    ///
    /// Returns an error when signing the claims fails.
    fn into_cookie(self) -> Result<Cookie<'static>> {
        let max_age_secs = self.claims.total_lifetime().as_secs();
        let token = self.claims.encode(self.keys.encoding_key())?;

        let cookie = Cookie::build((SESSION_COOKIE_NAME, token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(self.policy.secure)
            .max_age(time::Duration::seconds(max_age_secs))
            .build();

        Ok(cookie)
    }

    /// Returns a jar holding the removal cookie for logout.
    ///
    /// Setting an empty value with a zero max-age instructs the browser to
    /// drop the session immediately; there is no server-side state to
    /// revoke.
    pub fn removal(policy: CookiePolicy) -> CookieJar {
        let cookie = Cookie::build((SESSION_COOKIE_NAME, ""))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(policy.secure)
            .max_age(time::Duration::ZERO)
            .build();

        CookieJar::new().add(cookie)
    }
}

impl IntoResponseParts for SessionCookie {
    type Error = Error<'static>;

    fn into_response_parts(self, res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        let jar = CookieJar::new().add(self.into_cookie()?);
        // .into_response_parts() for a CookieJar is infallible
        Ok(jar.into_response_parts(res).unwrap())
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use crate::service::SessionKeys;

    use super::*;

    fn test_cookie(policy: CookiePolicy) -> Cookie<'static> {
        let keys = SessionKeys::from_secret("an-adequately-long-test-secret-value").unwrap();
        let claims = SessionClaims::new(Uuid::new_v4());
        SessionCookie::new(claims, keys, policy)
            .into_cookie()
            .unwrap()
    }

    #[test]
    fn cookie_attributes_in_development() {
        let cookie = test_cookie(CookiePolicy::development());

        assert_eq!(cookie.name(), SESSION_COOKIE_NAME);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_ne!(cookie.secure(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(
            cookie.max_age(),
            Some(time::Duration::seconds(365 * 24 * 3600))
        );
        assert!(!cookie.value().is_empty());
    }

    #[test]
    fn cookie_is_secure_in_production() {
        let cookie = test_cookie(CookiePolicy::production());
        assert_eq!(cookie.secure(), Some(true));
    }

    #[test]
    fn cookie_value_is_a_signed_token_not_the_account_id() {
        let keys = SessionKeys::from_secret("an-adequately-long-test-secret-value").unwrap();
        let account_id = Uuid::new_v4();
        let claims = SessionClaims::new(account_id);
        let cookie = SessionCookie::new(claims, keys.clone(), CookiePolicy::development())
            .into_cookie()
            .unwrap();

        let decoded = SessionClaims::decode(cookie.value(), keys.decoding_key()).unwrap();
        assert_eq!(decoded.account_id, account_id);
        assert!(!cookie.value().contains(&account_id.to_string()));
    }

    #[test]
    fn removal_jar_clears_the_cookie() {
        let jar = SessionCookie::removal(CookiePolicy::development());
        let cookie = jar.get(SESSION_COOKIE_NAME).unwrap();

        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
    }
}
