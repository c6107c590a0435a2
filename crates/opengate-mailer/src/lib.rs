#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod error;
mod message;
mod noop;
mod receipt;
mod service;

pub mod resend;

pub use error::{BoxedError, Error, ErrorKind, Result};
pub use message::MailMessage;
pub use noop::NoopMailer;
pub use receipt::MailReceipt;
pub use service::MailerService;

/// Tracing target for mail delivery operations.
pub const TRACING_TARGET: &str = "opengate_mailer";

/// Core trait for transactional email delivery.
///
/// Implement this trait to create custom delivery providers. Providers are
/// expected to be cheap to clone behind [`MailerService`] and safe to share
/// across request handlers.
#[async_trait::async_trait]
pub trait MailProvider: Send + Sync {
    /// Delivers a single message to the provider.
    async fn send(&self, message: &MailMessage) -> Result<MailReceipt>;

    /// Returns a short human-readable provider name for logs.
    fn provider_name(&self) -> &'static str;
}
