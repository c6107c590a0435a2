//! Shared types used across models and queries.

mod constraint;

pub use constraint::{AccountConstraints, ConstraintCategory, ConstraintViolation};
