//! Resend client configuration.

use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{Error, ErrorKind, Result};

/// Default API endpoint for the hosted Resend service.
pub const DEFAULT_BASE_URL: &str = "https://api.resend.com";

/// Default timeout for delivery requests: 30 seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for the Resend HTTP client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct ResendConfig {
    /// API key used as the bearer token
    #[cfg_attr(
        feature = "config",
        arg(long = "resend-api-key", env = "RESEND_API_KEY", default_value = "")
    )]
    #[serde(default)]
    pub resend_api_key: String,

    /// Base URL of the Resend-compatible API
    #[cfg_attr(
        feature = "config",
        arg(
            long = "resend-base-url",
            env = "RESEND_BASE_URL",
            default_value = DEFAULT_BASE_URL
        )
    )]
    #[serde(default = "default_base_url")]
    pub resend_base_url: String,

    /// Sender address placed on every outgoing message
    #[cfg_attr(
        feature = "config",
        arg(
            long = "mail-from",
            env = "MAIL_FROM",
            default_value = "noreply@opengate.dev"
        )
    )]
    #[serde(default = "default_from_address")]
    pub mail_from: String,

    /// Delivery request timeout in seconds
    #[cfg_attr(
        feature = "config",
        arg(long = "mail-timeout", env = "MAIL_TIMEOUT_SECS", default_value = "30")
    )]
    #[serde(default = "default_timeout_secs")]
    pub mail_timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_owned()
}

fn default_from_address() -> String {
    "noreply@opengate.dev".to_owned()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for ResendConfig {
    fn default() -> Self {
        Self {
            resend_api_key: String::new(),
            resend_base_url: default_base_url(),
            mail_from: default_from_address(),
            mail_timeout_secs: default_timeout_secs(),
        }
    }
}

impl ResendConfig {
    /// Creates a configuration with the given API key and defaults otherwise.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            resend_api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Returns whether an API key is configured at all.
    ///
    /// Deployments without a key fall back to the no-op provider.
    pub fn has_api_key(&self) -> bool {
        !self.resend_api_key.trim().is_empty()
    }

    /// Returns the request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.mail_timeout_secs)
    }

    /// Returns the fully-qualified URL of the send endpoint.
    pub fn emails_endpoint(&self) -> String {
        format!("{}/emails", self.resend_base_url.trim_end_matches('/'))
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Configuration`] when the API key is missing,
    /// the base URL does not parse, or the sender address is malformed.
    pub fn validate(&self) -> Result<()> {
        if !self.has_api_key() {
            return Err(
                Error::new(ErrorKind::Configuration).with_message("Resend API key is not set")
            );
        }

        Url::parse(&self.resend_base_url).map_err(|e| {
            Error::from_source(ErrorKind::Configuration, e)
                .with_message("Resend base URL is not a valid URL")
        })?;

        if !self.mail_from.contains('@') {
            return Err(Error::new(ErrorKind::Configuration)
                .with_message("Sender address is not an email address"));
        }

        Ok(())
    }

    /// Set the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.resend_base_url = base_url.into();
        self
    }

    /// Set the sender address.
    #[must_use]
    pub fn with_from_address(mut self, from: impl Into<String>) -> Self {
        self.mail_from = from.into();
        self
    }
}
