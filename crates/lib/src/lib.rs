//!
//! lexlist: ordered lists that never renumber.
//! This library provides the rank engine, the list manager and the storage layer behind the `lexlist` server.
//!
//! ## Core Concepts
//!
//! * **Ranks (`rank::Rank`)**: Non-empty strings over `a`..`z` compared lexicographically. Any two distinct ranks that do not end in `a` have another rank between them, so an item can move anywhere in a list by rewriting only its own rank.
//! * **Midpoint (`rank::midpoint`)**: Computes the rank halfway between two others using base-26 arbitrary-precision arithmetic.
//! * **Rebalance (`rank::rebalance`)**: Reassigns short, evenly spread ranks to a whole list when ranks grow too long.
//! * **Lists and entries (`list::List`, `list::Entry`)**: A list owns entries; the entry ranks alone define the order.
//! * **List manager (`list::ListManager`)**: Append, insert, move, toggle and remove entries, each inside one [`backend::ListTransaction`] so concurrent writers never interleave on a list.
//! * **Backends (`backend::BackendImpl`)**: A pluggable storage layer. [`backend::database::InMemory`] keeps everything in memory with optional JSON snapshots; the SQL backends store rows in SQLite or PostgreSQL.
//! * **Store (`Store`, `Scope`)**: The application facade. Handles accounts and password checks, and scopes every list and entry operation to the caller's role.

pub mod backend;
pub mod clock;
pub mod constants;
pub mod ids;
pub mod list;
pub mod rank;
pub mod store;
pub mod user;

pub use clock::{Clock, SystemClock, format_timestamp};
#[cfg(any(test, feature = "testing"))]
pub use clock::FixedClock;
pub use ids::{EntryId, ListId, UserId};
pub use store::{ListView, Scope, Store, UserUpdate};

/// Result type used throughout the lexlist library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the lexlist library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured rank errors from the rank module
    #[error(transparent)]
    Rank(rank::RankError),

    /// Structured storage errors from the backend module
    #[error(transparent)]
    Backend(backend::BackendError),

    /// Structured list errors from the list module
    #[error(transparent)]
    List(list::ListError),

    /// Structured account errors from the user module
    #[error(transparent)]
    User(user::UserError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Rank(_) => "rank",
            Error::Backend(_) => "backend",
            Error::List(_) => "list",
            Error::User(_) => "user",
            Error::Io(_) => "io",
            Error::Serialize(_) => "serialize",
        }
    }

    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Backend(backend_err) => backend_err.is_not_found(),
            Error::List(list_err) => list_err.is_not_found(),
            Error::User(user_err) => user_err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error indicates permission was denied.
    pub fn is_permission_denied(&self) -> bool {
        match self {
            Error::User(user_err) => user_err.is_permission_denied(),
            _ => false,
        }
    }

    /// Check if this error indicates a conflict (already exists, or a
    /// concurrent writer won).
    pub fn is_conflict(&self) -> bool {
        match self {
            Error::Backend(backend_err) => backend_err.is_conflict(),
            Error::User(user_err) => user_err.is_conflict(),
            _ => false,
        }
    }

    /// Check if this error is authentication-related.
    pub fn is_authentication_error(&self) -> bool {
        match self {
            Error::User(user_err) => user_err.is_authentication_error(),
            _ => false,
        }
    }

    /// Check if this error is a broken internal precondition rather than
    /// bad input.
    pub fn is_contract_violation(&self) -> bool {
        match self {
            Error::Rank(rank_err) => rank_err.is_contract_violation(),
            _ => false,
        }
    }

    /// Check if this error is validation-related.
    pub fn is_validation_error(&self) -> bool {
        match self {
            Error::Rank(rank_err) => rank_err.is_validation_error(),
            Error::List(list_err) => list_err.is_validation_error(),
            Error::User(user_err) => user_err.is_validation_error(),
            _ => false,
        }
    }

    /// Check if this error indicates a data integrity issue.
    pub fn is_integrity_error(&self) -> bool {
        match self {
            Error::Backend(backend_err) => backend_err.is_integrity_error(),
            Error::List(list_err) => list_err.is_integrity_error(),
            _ => false,
        }
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        match self {
            Error::Io(_) => true,
            Error::Backend(backend_err) => backend_err.is_io_error(),
            _ => false,
        }
    }

    /// Check if this error is database/backend-related.
    pub fn is_database_error(&self) -> bool {
        matches!(self, Error::Backend(_))
    }
}
