//! Database models mapping rows to strongly-typed structs.

mod account;

pub use account::{Account, NewAccount, UpdateAccount};
