//! All `axum::`[`Router`]s with related `axum::`[`Handler`]s.
//!
//! Authentication endpoints are public; everything else guards itself with
//! the [`AuthSession`] extractor, so a handler that needs a session is
//! unreachable without a valid cookie.
//!
//! [`Router`]: axum::routing::Router
//! [`Handler`]: axum::handler::Handler
//! [`AuthSession`]: crate::extract::AuthSession

mod accounts;
mod authentication;
mod error;
mod monitors;
mod response;

use axum::response::{IntoResponse, Response};
use utoipa_axum::router::OpenApiRouter;

pub use crate::handler::error::{Error, ErrorKind, Result};
pub use crate::handler::response::{AccountResponse, ErrorResponse};
use crate::service::ServiceState;

/// Fallback for unmatched paths, serialized like every other error.
pub async fn not_found() -> Response {
    ErrorKind::NotFound.into_response()
}

/// Returns an [`OpenApiRouter`] with all routes.
pub fn routes() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new()
        .merge(authentication::routes())
        .merge(accounts::routes())
        .merge(monitors::routes())
}
