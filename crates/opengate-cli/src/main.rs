#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

mod config;
mod server;

use std::process;

use anyhow::Context;
use axum::Router;
use axum::routing::get;
use clap::Parser;
use opengate_server::handler;
use opengate_server::middleware::{RouterObservabilityExt, RouterSecurityExt};
use opengate_server::service::ServiceState;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{Cli, MiddlewareConfig};

// Tracing target constants
pub const TRACING_TARGET_SERVER_STARTUP: &str = "opengate_cli::server::startup";
pub const TRACING_TARGET_SERVER_SHUTDOWN: &str = "opengate_cli::server::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "opengate_cli::config";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::info!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            "application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            error = %error,
            "application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    // Load a local .env before configuration is parsed; absent files are fine.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    init_tracing();
    log_startup_info();
    log_service_config(&cli);

    cli.service
        .validate()
        .context("invalid service configuration")?;

    let state = ServiceState::from_config(&cli.service)
        .await
        .context("failed to create service state")?;
    let router = create_router(state, &cli.middleware);

    server::serve(router, cli.server).await
}

/// Creates the router with all middleware layers applied.
///
/// Middleware is applied in reverse order (last added = outermost):
/// 1. Observability - request tracing spans
/// 2. Security - cross-origin policy
/// 3. Routes (innermost) - actual request handlers
fn create_router(state: ServiceState, middleware: &MiddlewareConfig) -> Router {
    let (router, api) = handler::routes().with_state(state).split_for_parts();

    let router = router
        .route(
            "/openapi.json",
            get(move || {
                let api = api.clone();
                async move { axum::Json(api) }
            }),
        )
        .fallback(handler::not_found);

    router
        .with_security(middleware.cors.clone())
        .with_observability()
}

/// Initializes tracing with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Logs startup information.
fn log_startup_info() {
    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        version = env!("CARGO_PKG_VERSION"),
        "starting opengate server"
    );

    tracing::debug!(
        target: TRACING_TARGET_SERVER_STARTUP,
        pid = process::id(),
        arch = std::env::consts::ARCH,
        os = std::env::consts::OS,
        "build information"
    );
}

/// Logs the effective (non-secret) service configuration.
fn log_service_config(cli: &Cli) {
    tracing::info!(
        target: TRACING_TARGET_CONFIG,
        postgres_url = %cli.service.postgres.database_url_masked(),
        mail_provider = if cli.service.mailer.has_api_key() { "resend" } else { "noop" },
        frontend_url = %cli.service.frontend_url,
        production = cli.service.production,
        cors_origins = ?cli.middleware.cors.allowed_origins,
        cors_credentials = cli.middleware.cors.allow_credentials,
        "service configuration"
    );
}
