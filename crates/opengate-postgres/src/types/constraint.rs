//! Typed database constraint violations.
//!
//! Postgres reports constraint violations by name; this module parses those
//! names into enums so upstream layers can map them to precise client-facing
//! errors instead of string-matching.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Broad classification of a constraint violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintCategory {
    /// Input data failed a validation check.
    Validation,
    /// A uniqueness guarantee was violated.
    Uniqueness,
    /// An internal consistency rule was violated.
    Consistency,
}

/// Accounts table constraint violations.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum AccountConstraints {
    // Account validation constraints
    #[strum(serialize = "accounts_display_name_not_empty")]
    DisplayNameNotEmpty,
    #[strum(serialize = "accounts_display_name_length_max")]
    DisplayNameLengthMax,
    #[strum(serialize = "accounts_email_not_empty")]
    EmailNotEmpty,
    #[strum(serialize = "accounts_email_length_max")]
    EmailLengthMax,
    #[strum(serialize = "accounts_password_hash_not_empty")]
    PasswordHashNotEmpty,

    // Verification challenge consistency
    #[strum(serialize = "accounts_verification_challenge_paired")]
    VerificationChallengePaired,

    // Account unique constraints
    #[strum(serialize = "accounts_email_address_unique_idx")]
    EmailAddressUnique,
    #[strum(serialize = "accounts_verification_token_unique_idx")]
    VerificationTokenUnique,
}

impl AccountConstraints {
    /// Creates a new [`AccountConstraints`] from the constraint name.
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    /// Returns the category of this constraint violation.
    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            AccountConstraints::DisplayNameNotEmpty
            | AccountConstraints::DisplayNameLengthMax
            | AccountConstraints::EmailNotEmpty
            | AccountConstraints::EmailLengthMax
            | AccountConstraints::PasswordHashNotEmpty => ConstraintCategory::Validation,

            AccountConstraints::VerificationChallengePaired => ConstraintCategory::Consistency,

            AccountConstraints::EmailAddressUnique
            | AccountConstraints::VerificationTokenUnique => ConstraintCategory::Uniqueness,
        }
    }
}

impl From<AccountConstraints> for String {
    #[inline]
    fn from(val: AccountConstraints) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for AccountConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Unified constraint violation enum covering every table in the schema.
///
/// Wraps the per-table constraint enums behind a single interface so error
/// mapping code has one entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintViolation {
    /// Violation of an `accounts` table constraint.
    Account(AccountConstraints),
}

impl ConstraintViolation {
    /// Parses a Postgres constraint name into a typed violation.
    pub fn new(constraint: &str) -> Option<Self> {
        AccountConstraints::new(constraint).map(Self::Account)
    }

    /// Returns the category of this constraint violation.
    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            Self::Account(c) => c.categorize(),
        }
    }

    /// Returns whether this violation is the duplicate-email signal.
    ///
    /// The unique index is the sole source of truth for duplicates: the
    /// registration pre-check can pass for two concurrent requests, but
    /// only one insert survives this constraint.
    pub fn is_duplicate_email(&self) -> bool {
        matches!(self, Self::Account(AccountConstraints::EmailAddressUnique))
    }
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Account(c) => write!(f, "{c}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn parses_known_constraint_names() {
        let violation = ConstraintViolation::new("accounts_email_address_unique_idx");
        assert_eq!(
            violation,
            Some(ConstraintViolation::Account(
                AccountConstraints::EmailAddressUnique
            ))
        );
        assert!(violation.unwrap().is_duplicate_email());
    }

    #[test]
    fn rejects_unknown_constraint_names() {
        assert!(ConstraintViolation::new("accounts_nonexistent_check").is_none());
        assert!(ConstraintViolation::new("").is_none());
    }

    #[test]
    fn display_round_trips_for_all_variants() {
        for constraint in AccountConstraints::iter() {
            let name = constraint.to_string();
            assert_eq!(AccountConstraints::new(&name), Some(constraint));
        }
    }

    #[test]
    fn categorization_is_stable() {
        assert_eq!(
            AccountConstraints::EmailAddressUnique.categorize(),
            ConstraintCategory::Uniqueness
        );
        assert_eq!(
            AccountConstraints::DisplayNameNotEmpty.categorize(),
            ConstraintCategory::Validation
        );
        assert_eq!(
            AccountConstraints::VerificationChallengePaired.categorize(),
            ConstraintCategory::Consistency
        );
    }
}
