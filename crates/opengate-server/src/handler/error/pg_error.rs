//! Database error to HTTP error conversion.
//!
//! Internal error detail is logged here and never forwarded to clients;
//! only known constraint violations map to specific client-facing errors.

use opengate_postgres::PgError;
use opengate_postgres::types::{AccountConstraints, ConstraintViolation};

use crate::handler::{Error, ErrorKind};

/// Tracing target for database error mapping.
const TRACING_TARGET: &str = "opengate_server::handler::pg_error";

impl From<AccountConstraints> for Error<'static> {
    fn from(c: AccountConstraints) -> Self {
        let error = match c {
            AccountConstraints::DisplayNameNotEmpty => {
                ErrorKind::BadRequest.with_message("Display name cannot be empty")
            }
            AccountConstraints::DisplayNameLengthMax => {
                ErrorKind::BadRequest.with_message("Display name is too long")
            }
            AccountConstraints::EmailNotEmpty => {
                ErrorKind::BadRequest.with_message("Email address cannot be empty")
            }
            AccountConstraints::EmailLengthMax => {
                ErrorKind::BadRequest.with_message("Email address is too long")
            }
            AccountConstraints::PasswordHashNotEmpty => {
                ErrorKind::BadRequest.with_message("Password cannot be empty")
            }

            // The unique index is the authoritative duplicate signal; the
            // handler pre-check only shortcuts the common case.
            AccountConstraints::EmailAddressUnique => {
                ErrorKind::Conflict.with_message("Email already registered")
            }

            // Internal consistency rules; a violation is a server bug.
            AccountConstraints::VerificationChallengePaired
            | AccountConstraints::VerificationTokenUnique => {
                ErrorKind::InternalServerError.into_error()
            }
        };

        error.with_resource("account")
    }
}

impl From<ConstraintViolation> for Error<'static> {
    fn from(constraint: ConstraintViolation) -> Self {
        match constraint {
            ConstraintViolation::Account(c) => c.into(),
        }
    }
}

impl From<PgError> for Error<'static> {
    fn from(error: PgError) -> Self {
        match error {
            PgError::Config(config_error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %config_error,
                    "database configuration error"
                );
                ErrorKind::InternalServerError.into_error()
            }
            PgError::Timeout(timeout) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    timeout = ?timeout,
                    "database timeout",
                );
                ErrorKind::InternalServerError.into_error()
            }
            PgError::Connection(connection_error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %connection_error,
                    "database connection error"
                );
                ErrorKind::InternalServerError.into_error()
            }
            PgError::Migration(migration_error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %migration_error,
                    "database migration error"
                );
                ErrorKind::InternalServerError.into_error()
            }
            PgError::Query(ref query_error) => {
                // Try to extract a known constraint violation first
                if let Some(constraint_name) = error.constraint()
                    && let Some(constraint) = ConstraintViolation::new(constraint_name)
                {
                    tracing::warn!(
                        target: TRACING_TARGET,
                        constraint = constraint_name,
                        error = %query_error,
                        "query error (constraint violation)"
                    );
                    return constraint.into();
                }

                tracing::error!(
                    target: TRACING_TARGET,
                    error = %query_error,
                    "query error"
                );
                ErrorKind::InternalServerError.into_error()
            }
            PgError::Unexpected(unexpected_error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %unexpected_error,
                    "unexpected database error"
                );
                ErrorKind::InternalServerError.into_error()
            }
        }
    }
}
