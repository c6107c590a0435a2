//! Sanitized account projection.

use opengate_postgres::model::Account;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Client-facing view of an account.
///
/// This is the only shape in which accounts leave the API: the password
/// digest and any pending verification token are never serialized.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    /// ID of the account.
    pub id: Uuid,
    /// Display name of the account.
    pub display_name: String,
    /// Email address of the account.
    pub email_address: String,
    /// Whether email ownership has been confirmed.
    pub is_verified: bool,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            display_name: account.display_name,
            email_address: account.email_address,
            is_verified: account.is_verified,
        }
    }
}

impl From<&Account> for AccountResponse {
    fn from(account: &Account) -> Self {
        account.clone().into()
    }
}
