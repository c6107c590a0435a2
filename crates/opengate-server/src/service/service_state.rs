//! Application state and dependency injection.

use opengate_mailer::MailerService;
use opengate_postgres::PgClient;

use crate::Result;
use crate::service::{
    CookiePolicy, FrontendUrl, PasswordHasher, ServiceConfig, SessionKeys,
};

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection).
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Clone)]
pub struct ServiceState {
    pg_client: PgClient,
    mailer: MailerService,

    password_hasher: PasswordHasher,
    session_keys: SessionKeys,
    cookie_policy: CookiePolicy,
    frontend_url: FrontendUrl,
}

impl ServiceState {
    /// Initializes application state from configuration.
    ///
    /// Connects to external services and loads required resources; the
    /// database schema is migrated as part of the connection step.
    pub async fn from_config(config: &ServiceConfig) -> Result<Self> {
        config.validate()?;

        let service_state = Self {
            pg_client: config.connect_postgres().await?,
            mailer: config.create_mailer()?,

            password_hasher: PasswordHasher::new(),
            session_keys: config.session_keys()?,
            cookie_policy: config.cookie_policy(),
            frontend_url: config.frontend(),
        };

        Ok(service_state)
    }
}

#[cfg(test)]
impl ServiceState {
    /// Replaces the mail service, so tests can inject failing providers.
    pub(crate) fn with_mailer(mut self, mailer: MailerService) -> Self {
        self.mailer = mailer;
        self
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

impl_di!(pg_client: PgClient);
impl_di!(mailer: MailerService);

impl_di!(password_hasher: PasswordHasher);
impl_di!(session_keys: SessionKeys);
impl_di!(cookie_policy: CookiePolicy);
impl_di!(frontend_url: FrontendUrl);
