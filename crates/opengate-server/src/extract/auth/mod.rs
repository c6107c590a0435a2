//! Session authentication: claims, cookie transport, and request guard.

mod auth_session;
mod session_claims;
mod session_cookie;

pub use auth_session::AuthSession;
pub use session_claims::SessionClaims;
pub use session_cookie::{SESSION_COOKIE_NAME, SessionCookie};
