//! Security primitives: password hashing, session signing, verification tokens.

mod password_hasher;
mod session_keys;
mod verification_token;

pub use password_hasher::PasswordHasher;
pub use session_keys::SessionKeys;
pub use verification_token::{VERIFICATION_TOKEN_BYTES, VERIFICATION_TTL, VerificationChallenge};
