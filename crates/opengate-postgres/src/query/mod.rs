//! Database query repositories.
//!
//! This module contains repository traits that provide high-level database
//! operations for the models in this crate, encapsulating common patterns
//! and providing type-safe interfaces.

pub mod account;

pub use account::AccountRepository;
