//! Account handlers for authenticated users.

use axum::extract::State;
use opengate_postgres::PgClient;
use opengate_postgres::query::AccountRepository;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::extract::{AuthSession, Json};
use crate::handler::{AccountResponse, ErrorKind, ErrorResponse, Result};
use crate::service::ServiceState;

/// Tracing target for account operations.
const TRACING_TARGET: &str = "opengate_server::handler::accounts";

/// Returns the account behind the current session.
///
/// The session token is stateless, so the account may have disappeared
/// since it was issued; that surfaces as 404 rather than 401.
#[utoipa::path(
    get, path = "/account", tag = "accounts",
    responses(
        (
            status = OK,
            description = "Account behind the current session",
            body = AccountResponse,
        ),
        (
            status = UNAUTHORIZED,
            description = "Missing or invalid session cookie",
            body = ErrorResponse,
        ),
        (
            status = NOT_FOUND,
            description = "Account no longer exists",
            body = ErrorResponse,
        ),
    ),
)]
async fn get_account(
    State(pg_client): State<PgClient>,
    AuthSession(claims): AuthSession,
) -> Result<Json<AccountResponse>> {
    let mut conn = pg_client.get_connection().await?;

    let Some(account) = conn.find_account_by_id(claims.account_id).await? else {
        tracing::warn!(
            target: TRACING_TARGET,
            account_id = %claims.account_id,
            token_id = %claims.token_id,
            "valid session for a missing account"
        );
        return Err(ErrorKind::NotFound
            .with_message("Account not found")
            .with_resource("account"));
    };

    Ok(Json(account.into()))
}

/// Returns a [`Router`] with all related routes.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new().routes(routes!(get_account))
}

#[cfg(test)]
mod test {
    use axum::http::StatusCode;

    use crate::handler::test::create_test_server;

    #[tokio::test]
    #[ignore = "requires a running Postgres"]
    async fn rejects_requests_without_a_session() -> anyhow::Result<()> {
        let server = create_test_server().await?;

        let response = server.get("/account").await;
        response.assert_status(StatusCode::UNAUTHORIZED);

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a running Postgres"]
    async fn returns_the_session_account() -> anyhow::Result<()> {
        let server = create_test_server().await?;
        let email = format!("me+{}@example.com", uuid::Uuid::new_v4().simple());

        let register = server
            .post("/register")
            .json(&serde_json::json!({
                "displayName": "Session User",
                "email": email,
                "password": "SecurePassword123!",
            }))
            .await;
        register.assert_status(StatusCode::CREATED);

        // axum-test carries cookies from previous responses on the same server
        let response = server.get("/account").await;
        response.assert_status_ok();

        let body: crate::handler::AccountResponse = response.json();
        assert_eq!(body.email_address, email);

        Ok(())
    }
}
