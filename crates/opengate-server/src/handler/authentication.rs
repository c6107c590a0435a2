//! Authentication handlers: registration, login, and email verification.
//!
//! Registration orchestrates the whole onboarding pipeline: uniqueness
//! check, password hashing, verification challenge creation, persistence,
//! email dispatch, and session issuance. The later stages of that pipeline
//! are not transactional; see the individual handlers for the failure
//! semantics.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum_extra::extract::cookie::CookieJar;
use opengate_mailer::MailerService;
use opengate_postgres::PgClient;
use opengate_postgres::query::AccountRepository;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use validator::Validate;

use crate::extract::{Json, SessionClaims, SessionCookie, ValidateJson};
use crate::handler::{AccountResponse, ErrorKind, ErrorResponse, Result};
use crate::service::{
    CookiePolicy, FrontendUrl, PasswordHasher, ServiceState, SessionKeys, VerificationChallenge,
    VerificationEmail,
};

/// Tracing target for authentication operations.
const TRACING_TARGET: &str = "opengate_server::handler::authentication";

/// Message returned with a successful registration.
const REGISTRATION_MESSAGE: &str =
    "Registration successful. Please check your email to verify your account.";

/// Message returned by the resend endpoint regardless of outcome, so the
/// endpoint cannot be used to probe which addresses are registered.
const RESEND_MESSAGE: &str =
    "If that address belongs to an unverified account, a new verification email has been sent.";

/// Request payload for registration.
#[must_use]
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "displayName": "Jordan Doe",
    "email": "jordan@example.com",
    "password": "a-long-passphrase"
}))]
struct RegisterRequest {
    /// Display name of the new account.
    #[validate(length(min = 1, max = 100))]
    pub display_name: String,
    /// Email address of the new account.
    #[validate(email)]
    pub email: String,
    /// Password of the new account.
    #[validate(length(min = 8))]
    pub password: String,
}

/// Response returned after successful registration.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct RegisterResponse {
    /// Human-readable confirmation message.
    pub message: String,
    /// Sanitized projection of the created account.
    pub account: AccountResponse,
}

/// Creates a new account and issues a session cookie.
///
/// The uniqueness pre-check is a fast path only: two concurrent
/// registrations can both pass it, and the losing insert surfaces the same
/// duplicate-email error through the unique index. If the verification
/// email cannot be dispatched, the request fails with a 500 but the
/// account row remains; the resend endpoint is the recovery path.
#[utoipa::path(
    post, path = "/register", tag = "authentication",
    request_body(
        content = RegisterRequest,
        description = "Registration details",
        content_type = "application/json",
    ),
    responses(
        (
            status = CREATED,
            description = "Account created - the session token is set as an HTTP-only cookie",
            body = RegisterResponse,
        ),
        (
            status = BAD_REQUEST,
            description = "Invalid input or email already registered",
            body = ErrorResponse,
            example = json!({
                "name": "conflict",
                "message": "Email already registered",
                "resource": "account"
            })
        ),
        (
            status = INTERNAL_SERVER_ERROR,
            description = "Internal server error",
            body = ErrorResponse,
        ),
    ),
)]
#[allow(clippy::too_many_arguments)]
async fn register(
    State(pg_client): State<PgClient>,
    State(password_hasher): State<PasswordHasher>,
    State(mailer): State<MailerService>,
    State(session_keys): State<SessionKeys>,
    State(cookie_policy): State<CookiePolicy>,
    State(frontend_url): State<FrontendUrl>,
    ValidateJson(request): ValidateJson<RegisterRequest>,
) -> Result<(StatusCode, SessionCookie, Json<RegisterResponse>)> {
    tracing::trace!(
        target: TRACING_TARGET,
        email = %request.email,
        display_name = %request.display_name,
        "registration attempt"
    );

    let mut conn = pg_client.get_connection().await?;

    if conn.email_exists(&request.email).await? {
        tracing::warn!(
            target: TRACING_TARGET,
            email = %request.email,
            "registration failed: email already exists"
        );
        return Err(ErrorKind::Conflict
            .with_message("Email already registered")
            .with_resource("account"));
    }

    let password_hash = password_hasher.hash_password(&request.password)?;
    let challenge = VerificationChallenge::generate()?;

    let new_account = opengate_postgres::model::NewAccount {
        display_name: request.display_name,
        email_address: request.email,
        password_hash,
        verification_token: Some(challenge.token.clone()),
        verification_expires_at: Some(challenge.expires_at.into()),
    };

    let account = conn.create_account(new_account).await?;
    tracing::info!(
        target: TRACING_TARGET,
        account_id = %account.id,
        email = %account.email_address,
        "account created"
    );

    // The account row is already committed; a dispatch failure fails the
    // request without rolling it back.
    let email = VerificationEmail::new(&account.email_address, &frontend_url, &challenge.token);
    mailer.send(&email.into_message()).await?;

    let claims = SessionClaims::new(account.id);
    let session_cookie = SessionCookie::new(claims, session_keys, cookie_policy);

    let response = RegisterResponse {
        message: REGISTRATION_MESSAGE.to_owned(),
        account: account.into(),
    };

    tracing::info!(
        target: TRACING_TARGET,
        account_id = %response.account.id,
        "registration successful: session issued"
    );

    Ok((StatusCode::CREATED, session_cookie, Json(response)))
}

/// Request payload for login.
#[must_use]
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
struct LoginRequest {
    /// Email address of the account.
    #[validate(email)]
    pub email: String,
    /// Password of the account.
    pub password: String,
}

/// Response returned after successful login.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    /// Sanitized projection of the authenticated account.
    pub account: AccountResponse,
}

/// Verifies credentials and issues a session cookie.
#[utoipa::path(
    post, path = "/login", tag = "authentication",
    request_body(
        content = LoginRequest,
        description = "Login credentials",
        content_type = "application/json",
    ),
    responses(
        (
            status = OK,
            description = "Login successful - the session token is set as an HTTP-only cookie",
            body = LoginResponse,
        ),
        (
            status = UNAUTHORIZED,
            description = "Unknown email or wrong password",
            body = ErrorResponse,
        ),
        (
            status = INTERNAL_SERVER_ERROR,
            description = "Internal server error",
            body = ErrorResponse,
        ),
    ),
)]
async fn login(
    State(pg_client): State<PgClient>,
    State(password_hasher): State<PasswordHasher>,
    State(session_keys): State<SessionKeys>,
    State(cookie_policy): State<CookiePolicy>,
    ValidateJson(request): ValidateJson<LoginRequest>,
) -> Result<(SessionCookie, Json<LoginResponse>)> {
    tracing::trace!(
        target: TRACING_TARGET,
        email = %request.email,
        "login attempt"
    );

    let mut conn = pg_client.get_connection().await?;
    let account = conn.find_account_by_email(&request.email).await?;

    // Always perform password hashing work, so unknown addresses cannot be
    // distinguished from wrong passwords by timing
    let password_valid = match &account {
        Some(account) => password_hasher
            .verify_password(&request.password, &account.password_hash)
            .unwrap_or(false),
        None => password_hasher.verify_dummy_password(&request.password),
    };

    let Some(account) = account.filter(|_| password_valid) else {
        tracing::warn!(
            target: TRACING_TARGET,
            email = %request.email,
            "login failed"
        );
        return Err(ErrorKind::Unauthorized
            .with_message("Invalid email or password")
            .with_resource("authentication"));
    };

    let claims = SessionClaims::new(account.id);
    let session_cookie = SessionCookie::new(claims, session_keys, cookie_policy);

    tracing::info!(
        target: TRACING_TARGET,
        account_id = %account.id,
        "login successful: session issued"
    );

    Ok((
        session_cookie,
        Json(LoginResponse {
            account: account.into(),
        }),
    ))
}

/// Response returned after logout.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct LogoutResponse {
    /// Human-readable confirmation message.
    pub message: String,
}

/// Clears the session cookie.
///
/// Sessions are stateless, so there is nothing to revoke server-side; the
/// cookie is simply expired in the browser.
#[utoipa::path(
    post, path = "/logout", tag = "authentication",
    responses(
        (
            status = OK,
            description = "Session cookie cleared",
            body = LogoutResponse,
        ),
    ),
)]
async fn logout(State(cookie_policy): State<CookiePolicy>) -> (CookieJar, Json<LogoutResponse>) {
    let jar = SessionCookie::removal(cookie_policy);

    (
        jar,
        Json(LogoutResponse {
            message: "Logged out.".to_owned(),
        }),
    )
}

/// Query parameters of the verification endpoint.
#[derive(Debug, Deserialize, IntoParams)]
struct VerifyEmailParams {
    /// Verification token from the emailed link.
    token: String,
}

/// Response returned after successful email verification.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct VerifyEmailResponse {
    /// Human-readable confirmation message.
    pub message: String,
    /// Sanitized projection of the verified account.
    pub account: AccountResponse,
}

/// Confirms email ownership with a token from the emailed link.
///
/// A token is consumable exactly once: confirmation clears it together
/// with its expiry, so a second attempt with the same link reports it as
/// invalid. Expired tokens must be replaced through the resend endpoint.
#[utoipa::path(
    get, path = "/verify-email", tag = "authentication",
    params(VerifyEmailParams),
    responses(
        (
            status = OK,
            description = "Email verified",
            body = VerifyEmailResponse,
        ),
        (
            status = BAD_REQUEST,
            description = "Unknown, already consumed, or expired token",
            body = ErrorResponse,
        ),
        (
            status = INTERNAL_SERVER_ERROR,
            description = "Internal server error",
            body = ErrorResponse,
        ),
    ),
)]
async fn verify_email(
    State(pg_client): State<PgClient>,
    Query(params): Query<VerifyEmailParams>,
) -> Result<Json<VerifyEmailResponse>> {
    let mut conn = pg_client.get_connection().await?;

    let Some(account) = conn
        .find_account_by_verification_token(&params.token)
        .await?
    else {
        tracing::debug!(
            target: TRACING_TARGET,
            "verification failed: unknown or consumed token"
        );
        return Err(ErrorKind::BadRequest
            .with_message("Verification link is invalid or has already been used")
            .with_resource("verification"));
    };

    if !account.can_confirm_with(&params.token) {
        tracing::debug!(
            target: TRACING_TARGET,
            account_id = %account.id,
            "verification failed: challenge expired"
        );
        return Err(ErrorKind::BadRequest
            .with_message("Verification link has expired")
            .with_resource("verification"));
    }

    let account = conn.mark_account_verified(account.id).await?;

    tracing::info!(
        target: TRACING_TARGET,
        account_id = %account.id,
        "email verified"
    );

    Ok(Json(VerifyEmailResponse {
        message: "Email verified successfully.".to_owned(),
        account: account.into(),
    }))
}

/// Request payload for resending the verification email.
#[must_use]
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
struct ResendVerificationRequest {
    /// Email address to resend the verification to.
    #[validate(email)]
    pub email: String,
}

/// Response returned by the resend endpoint.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct ResendVerificationResponse {
    /// Human-readable confirmation message.
    pub message: String,
}

/// Issues a fresh verification challenge for an unverified account.
///
/// The response is identical whether or not the address is registered.
/// This is also the recovery path for accounts stranded by an email
/// dispatch failure during registration.
#[utoipa::path(
    post, path = "/resend-verification", tag = "authentication",
    request_body(
        content = ResendVerificationRequest,
        description = "Address to resend the verification email to",
        content_type = "application/json",
    ),
    responses(
        (
            status = OK,
            description = "Accepted - a new email was sent when the address qualifies",
            body = ResendVerificationResponse,
        ),
        (
            status = INTERNAL_SERVER_ERROR,
            description = "Internal server error",
            body = ErrorResponse,
        ),
    ),
)]
async fn resend_verification(
    State(pg_client): State<PgClient>,
    State(mailer): State<MailerService>,
    State(frontend_url): State<FrontendUrl>,
    ValidateJson(request): ValidateJson<ResendVerificationRequest>,
) -> Result<Json<ResendVerificationResponse>> {
    let mut conn = pg_client.get_connection().await?;

    match conn.find_account_by_email(&request.email).await? {
        Some(account) if account.needs_verification() => {
            let challenge = VerificationChallenge::generate()?;
            let account = conn
                .renew_verification_challenge(
                    account.id,
                    challenge.token.clone(),
                    challenge.expires_at,
                )
                .await?;

            let email =
                VerificationEmail::new(&account.email_address, &frontend_url, &challenge.token);
            mailer.send(&email.into_message()).await?;

            tracing::info!(
                target: TRACING_TARGET,
                account_id = %account.id,
                "verification challenge renewed"
            );
        }
        Some(account) => {
            tracing::debug!(
                target: TRACING_TARGET,
                account_id = %account.id,
                "resend skipped: account already verified"
            );
        }
        None => {
            tracing::debug!(
                target: TRACING_TARGET,
                "resend skipped: unknown email"
            );
        }
    }

    Ok(Json(ResendVerificationResponse {
        message: RESEND_MESSAGE.to_owned(),
    }))
}

/// Returns a [`Router`] with all related routes.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new()
        .routes(routes!(register))
        .routes(routes!(login))
        .routes(routes!(logout))
        .routes(routes!(verify_email))
        .routes(routes!(resend_verification))
}

#[cfg(test)]
mod test {
    use axum::extract::FromRef;
    use opengate_postgres::query::AccountRepository;

    use crate::extract::SESSION_COOKIE_NAME;
    use crate::handler::test::{
        create_test_server, create_test_server_with_state, create_test_state,
    };

    use super::*;

    fn unique_email(prefix: &str) -> String {
        format!("{}+{}@example.com", prefix, uuid::Uuid::new_v4().simple())
    }

    fn register_body(email: &str) -> serde_json::Value {
        serde_json::json!({
            "displayName": "Test User",
            "email": email,
            "password": "SecurePassword123!",
        })
    }

    #[tokio::test]
    #[ignore = "requires a running Postgres"]
    async fn register_success_sets_session_cookie() -> anyhow::Result<()> {
        let server = create_test_server().await?;
        let email = unique_email("register");

        let response = server.post("/register").json(&register_body(&email)).await;
        response.assert_status(StatusCode::CREATED);

        let body: RegisterResponse = response.json();
        assert_eq!(body.account.email_address, email);
        assert_eq!(body.account.display_name, "Test User");
        assert!(!body.account.is_verified);
        assert_eq!(body.message, REGISTRATION_MESSAGE);

        let cookie = response.cookie(SESSION_COOKIE_NAME);
        assert!(cookie.http_only().unwrap_or(false));
        assert!(!cookie.value().is_empty());

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a running Postgres"]
    async fn register_duplicate_email_is_a_client_error() -> anyhow::Result<()> {
        let server = create_test_server().await?;
        let email = unique_email("duplicate");

        let response = server.post("/register").json(&register_body(&email)).await;
        response.assert_status(StatusCode::CREATED);
        let first: RegisterResponse = response.json();

        // Second registration with the same email must fail with 400 and
        // leave the original record untouched.
        let response = server.post("/register").json(&register_body(&email)).await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let (_, state) = create_test_state().await?;
        let pg_client = opengate_postgres::PgClient::from_ref(&state);
        let mut conn = pg_client.get_connection().await?;
        let stored = conn.find_account_by_email(&email).await?.unwrap();
        assert_eq!(stored.id, first.account.id);

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a running Postgres"]
    async fn register_rejects_invalid_payloads() -> anyhow::Result<()> {
        let server = create_test_server().await?;

        let response = server
            .post("/register")
            .json(&serde_json::json!({
                "displayName": "Test User",
                "email": "not-an-email",
                "password": "SecurePassword123!",
            }))
            .await;
        response.assert_status_bad_request();

        let response = server
            .post("/register")
            .json(&serde_json::json!({
                "displayName": "Test User",
                "email": unique_email("shortpw"),
                "password": "short",
            }))
            .await;
        response.assert_status_bad_request();

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a running Postgres"]
    async fn register_never_echoes_the_password() -> anyhow::Result<()> {
        let server = create_test_server().await?;
        let email = unique_email("leak");
        let password = "ExtremelyUniquePassword987!";

        let response = server
            .post("/register")
            .json(&serde_json::json!({
                "displayName": "Test User",
                "email": email,
                "password": password,
            }))
            .await;
        response.assert_status(StatusCode::CREATED);

        let text = response.text();
        assert!(!text.contains(password));
        assert!(!text.contains("argon2"));

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a running Postgres"]
    async fn login_round_trip() -> anyhow::Result<()> {
        let server = create_test_server().await?;
        let email = unique_email("login");

        server.post("/register").json(&register_body(&email)).await;

        let response = server
            .post("/login")
            .json(&serde_json::json!({
                "email": email,
                "password": "SecurePassword123!",
            }))
            .await;
        response.assert_status_ok();

        let body: LoginResponse = response.json();
        assert_eq!(body.account.email_address, email);

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a running Postgres"]
    async fn login_rejects_bad_credentials() -> anyhow::Result<()> {
        let server = create_test_server().await?;
        let email = unique_email("wrongpass");

        server.post("/register").json(&register_body(&email)).await;

        let response = server
            .post("/login")
            .json(&serde_json::json!({
                "email": email,
                "password": "WrongPassword456!",
            }))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);

        let response = server
            .post("/login")
            .json(&serde_json::json!({
                "email": unique_email("nonexistent"),
                "password": "SomePassword123!",
            }))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a running Postgres"]
    async fn verify_email_consumes_the_challenge() -> anyhow::Result<()> {
        let (server, state) = create_test_state().await?;
        let email = unique_email("verify");

        let response = server.post("/register").json(&register_body(&email)).await;
        response.assert_status(StatusCode::CREATED);

        // The token never appears in API responses; read it back the way
        // the emailed link would carry it.
        let pg_client = opengate_postgres::PgClient::from_ref(&state);
        let mut conn = pg_client.get_connection().await?;
        let account = conn.find_account_by_email(&email).await?.unwrap();
        let token = account.verification_token.unwrap();

        let response = server
            .get("/verify-email")
            .add_query_param("token", &token)
            .await;
        response.assert_status_ok();

        let body: VerifyEmailResponse = response.json();
        assert!(body.account.is_verified);

        let stored = conn.find_account_by_email(&email).await?.unwrap();
        assert!(stored.is_verified());
        assert!(stored.verification_token.is_none());
        assert!(stored.verification_expires_at.is_none());

        // The link is single use.
        let response = server
            .get("/verify-email")
            .add_query_param("token", &token)
            .await;
        response.assert_status_bad_request();

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a running Postgres"]
    async fn verify_email_rejects_unknown_tokens() -> anyhow::Result<()> {
        let server = create_test_server().await?;

        let response = server
            .get("/verify-email")
            .add_query_param("token", "00".repeat(32))
            .await;
        response.assert_status_bad_request();

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a running Postgres"]
    async fn resend_verification_rotates_the_challenge() -> anyhow::Result<()> {
        let (server, state) = create_test_state().await?;
        let email = unique_email("resend");

        server.post("/register").json(&register_body(&email)).await;

        let pg_client = opengate_postgres::PgClient::from_ref(&state);
        let mut conn = pg_client.get_connection().await?;
        let before = conn.find_account_by_email(&email).await?.unwrap();

        let response = server
            .post("/resend-verification")
            .json(&serde_json::json!({ "email": email }))
            .await;
        response.assert_status_ok();

        let after = conn.find_account_by_email(&email).await?.unwrap();
        assert_ne!(before.verification_token, after.verification_token);

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a running Postgres"]
    async fn resend_verification_does_not_reveal_registration() -> anyhow::Result<()> {
        let server = create_test_server().await?;

        let response = server
            .post("/resend-verification")
            .json(&serde_json::json!({ "email": unique_email("ghost") }))
            .await;
        response.assert_status_ok();

        let body: ResendVerificationResponse = response.json();
        assert_eq!(body.message, RESEND_MESSAGE);

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a running Postgres"]
    async fn email_dispatch_failure_leaves_the_account_behind() -> anyhow::Result<()> {
        use opengate_mailer::{
            Error as MailerError, ErrorKind as MailerErrorKind, MailMessage, MailProvider,
            MailReceipt, MailerService,
        };

        /// Provider that refuses every message, standing in for a
        /// transactional email outage.
        #[derive(Debug, Clone, Copy)]
        struct FailingMailer;

        #[async_trait::async_trait]
        impl MailProvider for FailingMailer {
            async fn send(&self, _message: &MailMessage) -> opengate_mailer::Result<MailReceipt> {
                Err(MailerError::new(MailerErrorKind::ServiceUnavailable)
                    .with_message("provider outage"))
            }

            fn provider_name(&self) -> &'static str {
                "failing"
            }
        }

        let (_, state) = create_test_state().await?;
        let state = state.with_mailer(MailerService::new(FailingMailer));
        let server = create_test_server_with_state(state.clone())?;

        let email = unique_email("outage");
        let response = server.post("/register").json(&register_body(&email)).await;

        // The request fails, yet the account row was already committed and
        // stays unverified with its challenge intact.
        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);

        let pg_client = opengate_postgres::PgClient::from_ref(&state);
        let mut conn = pg_client.get_connection().await?;
        let stored = conn.find_account_by_email(&email).await?.unwrap();
        assert!(!stored.is_verified());
        assert!(stored.verification_token.is_some());

        // No session cookie is issued on a failed registration.
        assert!(response.maybe_cookie(SESSION_COOKIE_NAME).is_none());

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a running Postgres"]
    async fn concurrent_registrations_admit_exactly_one() -> anyhow::Result<()> {
        let server = create_test_server().await?;
        let email = unique_email("race");

        let (first, second) = tokio::join!(
            async { server.post("/register").json(&register_body(&email)).await },
            async { server.post("/register").json(&register_body(&email)).await },
        );

        let statuses = [first.status_code(), second.status_code()];
        assert_eq!(
            statuses
                .iter()
                .filter(|s| **s == StatusCode::CREATED)
                .count(),
            1,
            "exactly one registration must win: {statuses:?}"
        );
        assert_eq!(
            statuses
                .iter()
                .filter(|s| **s == StatusCode::BAD_REQUEST)
                .count(),
            1,
            "the loser must see the duplicate-email error: {statuses:?}"
        );

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a running Postgres"]
    async fn logout_clears_the_cookie() -> anyhow::Result<()> {
        let server = create_test_server().await?;

        let response = server.post("/logout").await;
        response.assert_status_ok();

        let cookie = response.cookie(SESSION_COOKIE_NAME);
        assert_eq!(cookie.value(), "");

        Ok(())
    }
}
