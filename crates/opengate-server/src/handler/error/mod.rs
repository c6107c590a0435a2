//! HTTP error types and conversions from lower layers.

mod http_error;
mod mailer_error;
mod pg_error;

pub use http_error::{Error, ErrorKind, Result};
