//! Outgoing email composition.

mod verification_email;

pub use verification_email::VerificationEmail;
