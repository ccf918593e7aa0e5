//! User system for lexlist
//!
//! Provides user accounts with Argon2id password hashing, the `user`/`admin`
//! role split, and the [`Caller`] capability check that decides which lists
//! and entries a request may see.

pub mod crypto;
pub mod errors;
pub mod types;

pub use errors::UserError;
pub use types::*;
