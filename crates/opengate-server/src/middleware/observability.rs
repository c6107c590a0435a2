//! Request tracing middleware.

use axum::Router;
use axum::body::Body;
use axum::http::Request;
use tower_http::trace::TraceLayer;

/// Extension trait for `axum::`[`Router`] to apply observability middleware.
///
/// [`Router`]: axum::Router
pub trait RouterObservabilityExt {
    /// Wraps every request in a tracing span with method and path.
    ///
    /// Span events follow the `tower_http::trace` defaults; filtering is
    /// controlled by the subscriber installed in the binary.
    fn with_observability(self) -> Self;
}

impl RouterObservabilityExt for Router {
    fn with_observability(self) -> Self {
        let layer = TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
            )
        });

        self.layer(layer)
    }
}
