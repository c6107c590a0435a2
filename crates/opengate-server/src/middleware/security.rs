//! Cross-origin resource sharing middleware.

use axum::Router;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
#[cfg(any(test, feature = "config"))]
use clap::Args;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};

/// Tracing target for security middleware.
const TRACING_TARGET: &str = "opengate_server::middleware::security";

/// Cross-origin request policy.
///
/// The session cookie is same-site strict, so cross-origin browsers only
/// reach the API when an origin is explicitly allowed here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(any(test, feature = "config"), derive(Args))]
pub struct CorsConfig {
    /// Origins allowed to call the API; empty means same-origin only
    /// deployments behind a permissive policy without credentials
    #[cfg_attr(
        any(test, feature = "config"),
        arg(
            long = "cors-allowed-origins",
            env = "CORS_ALLOWED_ORIGINS",
            value_delimiter = ','
        )
    )]
    #[serde(default)]
    pub allowed_origins: Vec<String>,

    /// Whether cross-origin requests may carry the session cookie
    #[cfg_attr(
        any(test, feature = "config"),
        arg(long = "cors-allow-credentials", env = "CORS_ALLOW_CREDENTIALS")
    )]
    #[serde(default)]
    pub allow_credentials: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            allow_credentials: false,
        }
    }
}

/// Extension trait for `axum::`[`Router`] to apply security middleware.
///
/// [`Router`]: axum::Router
pub trait RouterSecurityExt {
    /// Applies the cross-origin policy from configuration.
    fn with_security(self, cors: CorsConfig) -> Self;
}

impl RouterSecurityExt for Router {
    fn with_security(self, cors: CorsConfig) -> Self {
        let origins: Vec<HeaderValue> = cors
            .allowed_origins
            .iter()
            .filter_map(|origin| match origin.parse::<HeaderValue>() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(
                        target: TRACING_TARGET,
                        origin = %origin,
                        "ignoring unparsable CORS origin"
                    );
                    None
                }
            })
            .collect();

        // A wildcard origin cannot be combined with credentials, so the
        // permissive fallback never allows them.
        let layer = if origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([CONTENT_TYPE, AUTHORIZATION])
                .allow_credentials(cors.allow_credentials)
        };

        self.layer(layer)
    }
}
