//! Router-wide middleware layers.

mod observability;
mod security;

pub use observability::RouterObservabilityExt;
pub use security::{CorsConfig, RouterSecurityExt};
