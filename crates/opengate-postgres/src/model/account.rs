//! Account model for PostgreSQL database operations.
//!
//! The account is the identity record of the system: registration creates it,
//! the email confirmation flow flips it to verified, and the login flow reads
//! it to check credentials.
//!
//! ## Models
//!
//! - [`Account`] - Account model with credentials and verification state
//! - [`NewAccount`] - Data structure for creating new accounts
//! - [`UpdateAccount`] - Data structure for updating existing accounts

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::accounts;

/// Account model representing a registered user in the system.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = accounts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Account {
    /// Unique account identifier.
    pub id: Uuid,
    /// Whether email ownership has been confirmed.
    pub is_verified: bool,
    /// Human-readable name for UI and communications.
    pub display_name: String,
    /// Email used for authentication and communications, unique across
    /// all accounts and matched exactly as stored (case-sensitive).
    pub email_address: String,
    /// Argon2id digest in PHC string format, never plaintext.
    pub password_hash: String,
    /// Pending email verification token (hex), present only while
    /// confirmation is outstanding.
    pub verification_token: Option<String>,
    /// Expiry of the pending verification token.
    pub verification_expires_at: Option<Timestamp>,
    /// Timestamp when the account was created.
    pub created_at: Timestamp,
    /// Timestamp when the account was last updated.
    pub updated_at: Timestamp,
}

/// Data for creating a new account.
#[derive(Debug, Default, Clone, Insertable)]
#[diesel(table_name = accounts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewAccount {
    /// Human-readable name for UI and communications.
    pub display_name: String,
    /// Email used for authentication and communications.
    pub email_address: String,
    /// Argon2id digest in PHC string format.
    pub password_hash: String,
    /// Email verification token issued at registration.
    pub verification_token: Option<String>,
    /// Expiry of the verification token.
    pub verification_expires_at: Option<Timestamp>,
}

/// Data for updating an account.
///
/// Outer `None` skips the column; for the nullable verification columns,
/// `Some(None)` clears the stored value.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = accounts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateAccount {
    /// Human-readable name for UI and communications.
    pub display_name: Option<String>,
    /// Email used for authentication and communications.
    pub email_address: Option<String>,
    /// Argon2id digest in PHC string format.
    pub password_hash: Option<String>,
    /// Email ownership confirmation status.
    pub is_verified: Option<bool>,
    /// Pending email verification token.
    pub verification_token: Option<Option<String>>,
    /// Expiry of the pending verification token.
    pub verification_expires_at: Option<Option<Timestamp>>,
}

impl Account {
    /// Returns whether the account is verified.
    pub fn is_verified(&self) -> bool {
        self.is_verified
    }

    /// Returns whether the account still requires email verification.
    pub fn needs_verification(&self) -> bool {
        !self.is_verified
    }

    /// Returns whether a verification challenge is currently pending.
    pub fn has_pending_challenge(&self) -> bool {
        self.verification_token.is_some()
    }

    /// Returns whether the pending challenge has passed its expiry.
    ///
    /// An account without a challenge is treated as expired: there is
    /// nothing left to confirm against.
    pub fn challenge_expired(&self) -> bool {
        match self.verification_expires_at {
            Some(expires_at) => jiff::Timestamp::from(expires_at) <= jiff::Timestamp::now(),
            None => true,
        }
    }

    /// Returns whether the given token matches the pending challenge.
    pub fn challenge_matches(&self, token: &str) -> bool {
        self.verification_token.as_deref() == Some(token)
    }

    /// Returns whether the account can be confirmed with the given token.
    ///
    /// Confirmation requires an unverified account holding an unexpired
    /// challenge that matches the presented token.
    pub fn can_confirm_with(&self, token: &str) -> bool {
        self.needs_verification() && self.challenge_matches(token) && !self.challenge_expired()
    }

    /// Returns the remaining time until the pending challenge expires.
    pub fn challenge_time_remaining(&self) -> Option<jiff::Span> {
        let expires_at = jiff::Timestamp::from(self.verification_expires_at?);
        let now = jiff::Timestamp::now();
        (expires_at > now).then(|| expires_at - now)
    }
}

#[cfg(test)]
mod tests {
    use jiff::{Span, Timestamp};

    use super::*;

    fn account_with_challenge(is_verified: bool, expires_at: Option<Timestamp>) -> Account {
        Account {
            id: Uuid::new_v4(),
            is_verified,
            display_name: "Test User".to_owned(),
            email_address: "test@example.com".to_owned(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_owned(),
            verification_token: expires_at.is_some().then(|| "ab".repeat(32)),
            verification_expires_at: expires_at.map(Into::into),
            created_at: Timestamp::now().into(),
            updated_at: Timestamp::now().into(),
        }
    }

    #[test]
    fn pending_challenge_within_expiry_is_confirmable() {
        let expires_at = Timestamp::now() + Span::new().hours(24);
        let account = account_with_challenge(false, Some(expires_at));
        let token = account.verification_token.clone().unwrap();

        assert!(account.has_pending_challenge());
        assert!(!account.challenge_expired());
        assert!(account.can_confirm_with(&token));
        assert!(account.challenge_time_remaining().is_some());
    }

    #[test]
    fn expired_challenge_is_not_confirmable() {
        let expires_at = Timestamp::now() - Span::new().minutes(1);
        let account = account_with_challenge(false, Some(expires_at));
        let token = account.verification_token.clone().unwrap();

        assert!(account.challenge_expired());
        assert!(!account.can_confirm_with(&token));
        assert!(account.challenge_time_remaining().is_none());
    }

    #[test]
    fn wrong_token_is_not_confirmable() {
        let expires_at = Timestamp::now() + Span::new().hours(24);
        let account = account_with_challenge(false, Some(expires_at));

        assert!(!account.can_confirm_with("cd00"));
    }

    #[test]
    fn verified_account_without_challenge() {
        let account = account_with_challenge(true, None);

        assert!(account.is_verified());
        assert!(!account.needs_verification());
        assert!(!account.has_pending_challenge());
        assert!(account.challenge_expired());
        assert!(!account.can_confirm_with("anything"));
    }
}
