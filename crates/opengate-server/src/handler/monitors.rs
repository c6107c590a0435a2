//! Health monitoring handlers.

use axum::extract::State;
use opengate_postgres::PgClient;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::extract::Json;
use crate::service::ServiceState;

/// Liveness report for the service.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    /// Overall service status.
    pub status: String,
    /// Version of the running binary.
    pub version: String,
    /// Connection pool utilization (0.0 to 1.0).
    pub database_utilization: f64,
}

/// Reports service liveness and connection pool pressure.
#[utoipa::path(
    get, path = "/health", tag = "monitors",
    responses(
        (
            status = OK,
            description = "Service is reachable",
            body = HealthResponse,
        ),
    ),
)]
async fn health(State(pg_client): State<PgClient>) -> Json<HealthResponse> {
    let pool_status = pg_client.pool_status();

    Json(HealthResponse {
        status: "healthy".to_owned(),
        version: env!("CARGO_PKG_VERSION").to_owned(),
        database_utilization: pool_status.utilization(),
    })
}

/// Returns a [`Router`] with all related routes.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new().routes(routes!(health))
}
