//! Account repository for managing registered users.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::model::{Account, NewAccount, UpdateAccount};
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for account database operations.
///
/// Handles the account lifecycle: registration, credential lookup, and the
/// email verification state machine.
///
/// Email addresses are stored and matched exactly as provided. Uniqueness is
/// ultimately enforced by the database index, so callers must treat a
/// unique-violation on insert as the authoritative duplicate signal even
/// after a successful [`email_exists`] pre-check.
///
/// [`email_exists`]: AccountRepository::email_exists
pub trait AccountRepository {
    /// Creates a new account.
    ///
    /// Inserts a new account record with the provided email, password hash,
    /// and pending verification challenge.
    fn create_account(
        &mut self,
        new_account: NewAccount,
    ) -> impl Future<Output = PgResult<Account>> + Send;

    /// Finds an account by its unique identifier.
    fn find_account_by_id(
        &mut self,
        account_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<Account>>> + Send;

    /// Finds an account by email address (exact match).
    fn find_account_by_email(
        &mut self,
        email: &str,
    ) -> impl Future<Output = PgResult<Option<Account>>> + Send;

    /// Finds the account holding the given pending verification token.
    ///
    /// Returns `None` when the token is unknown or was already consumed.
    fn find_account_by_verification_token(
        &mut self,
        token: &str,
    ) -> impl Future<Output = PgResult<Option<Account>>> + Send;

    /// Checks if an email address is already registered.
    ///
    /// Used during registration as a fast path before the insert races the
    /// unique index.
    fn email_exists(&mut self, email: &str) -> impl Future<Output = PgResult<bool>> + Send;

    /// Applies partial updates to an existing account.
    ///
    /// Only fields set to `Some(value)` are modified.
    fn update_account(
        &mut self,
        account_id: Uuid,
        updates: UpdateAccount,
    ) -> impl Future<Output = PgResult<Account>> + Send;

    /// Marks an account as verified and consumes its challenge.
    ///
    /// Sets the verification flag and clears both challenge columns in a
    /// single update, so a confirmed token can never be replayed.
    fn mark_account_verified(
        &mut self,
        account_id: Uuid,
    ) -> impl Future<Output = PgResult<Account>> + Send;

    /// Replaces the pending verification challenge.
    ///
    /// Used by the resend flow when a previous token expired or the email
    /// never arrived.
    fn renew_verification_challenge(
        &mut self,
        account_id: Uuid,
        token: String,
        expires_at: jiff::Timestamp,
    ) -> impl Future<Output = PgResult<Account>> + Send;
}

impl AccountRepository for PgConnection {
    async fn create_account(&mut self, mut new_account: NewAccount) -> PgResult<Account> {
        use schema::accounts;

        // Normalize the display name; the email is stored exactly as given.
        new_account.display_name = new_account.display_name.trim().to_owned();

        diesel::insert_into(accounts::table)
            .values(&new_account)
            .returning(Account::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn find_account_by_id(&mut self, account_id: Uuid) -> PgResult<Option<Account>> {
        use schema::accounts::{self, dsl};

        accounts::table
            .filter(dsl::id.eq(account_id))
            .select(Account::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn find_account_by_email(&mut self, email: &str) -> PgResult<Option<Account>> {
        use schema::accounts::{self, dsl};

        accounts::table
            .filter(dsl::email_address.eq(email))
            .select(Account::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn find_account_by_verification_token(
        &mut self,
        token: &str,
    ) -> PgResult<Option<Account>> {
        use schema::accounts::{self, dsl};

        accounts::table
            .filter(dsl::verification_token.eq(token))
            .select(Account::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn email_exists(&mut self, email: &str) -> PgResult<bool> {
        use schema::accounts::{self, dsl};

        let count: i64 = accounts::table
            .filter(dsl::email_address.eq(email))
            .count()
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        Ok(count > 0)
    }

    async fn update_account(
        &mut self,
        account_id: Uuid,
        mut updates: UpdateAccount,
    ) -> PgResult<Account> {
        use schema::accounts::{self, dsl};

        if let Some(name) = updates.display_name.as_mut() {
            *name = name.trim().to_owned();
        }

        diesel::update(accounts::table.filter(dsl::id.eq(account_id)))
            .set(&updates)
            .returning(Account::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn mark_account_verified(&mut self, account_id: Uuid) -> PgResult<Account> {
        self.update_account(
            account_id,
            UpdateAccount {
                is_verified: Some(true),
                verification_token: Some(None),
                verification_expires_at: Some(None),
                ..Default::default()
            },
        )
        .await
    }

    async fn renew_verification_challenge(
        &mut self,
        account_id: Uuid,
        token: String,
        expires_at: jiff::Timestamp,
    ) -> PgResult<Account> {
        self.update_account(
            account_id,
            UpdateAccount {
                verification_token: Some(Some(token)),
                verification_expires_at: Some(Some(expires_at.into())),
                ..Default::default()
            },
        )
        .await
    }
}
