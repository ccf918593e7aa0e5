//! Backend error types.
//!
//! Structured errors for storage operations, shared by every backend
//! implementation.

use thiserror::Error;

use crate::ids::{EntryId, ListId, UserId};

/// Errors that can occur during backend operations.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum BackendError {
    /// User not found by ID.
    #[error("User not found: {id}")]
    UserNotFound {
        /// The ID of the user that was not found
        id: UserId,
    },

    /// List not found by ID.
    #[error("List not found: {id}")]
    ListNotFound {
        /// The ID of the list that was not found
        id: ListId,
    },

    /// Entry not found by ID.
    #[error("Entry not found: {id}")]
    EntryNotFound {
        /// The ID of the entry that was not found
        id: EntryId,
    },

    /// A username uniqueness constraint was hit.
    #[error("Username already taken: {username}")]
    DuplicateUsername {
        /// The username that already exists
        username: String,
    },

    /// Another writer touched the same rows; retry the whole operation.
    #[error("Transaction conflict: {reason}")]
    TransactionConflict {
        /// Description of the conflict reported by the store
        reason: String,
    },

    /// Serialization failed.
    #[error("Serialization failed")]
    SerializationFailed {
        /// The underlying serialization error
        #[source]
        source: serde_json::Error,
    },

    /// Deserialization failed.
    #[error("Deserialization failed")]
    DeserializationFailed {
        /// The underlying deserialization error
        #[source]
        source: serde_json::Error,
    },

    /// File I/O error.
    #[error("File I/O error")]
    FileIo {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Stored data does not decode into a valid row.
    #[error("Corrupt row in {table}: {reason}")]
    CorruptRow {
        /// Table or collection holding the row
        table: &'static str,
        /// What failed to decode
        reason: String,
    },

    /// Backend state inconsistency detected.
    #[error("Backend state inconsistency: {reason}")]
    StateInconsistency {
        /// Description of the state inconsistency
        reason: String,
    },

    /// SQL database error (from sqlx).
    #[cfg(any(feature = "sqlite", feature = "postgres"))]
    #[error("SQL error: {reason}")]
    SqlxError {
        /// Context for the failed statement
        reason: String,
        /// The underlying sqlx error, if any
        #[source]
        source: Option<sqlx::Error>,
    },
}

impl BackendError {
    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            BackendError::UserNotFound { .. }
                | BackendError::ListNotFound { .. }
                | BackendError::EntryNotFound { .. }
        )
    }

    /// Check if the operation should be retried by the caller.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            BackendError::TransactionConflict { .. } | BackendError::DuplicateUsername { .. }
        )
    }

    /// Check if this error is related to I/O or encoding.
    pub fn is_io_error(&self) -> bool {
        matches!(
            self,
            BackendError::FileIo { .. }
                | BackendError::SerializationFailed { .. }
                | BackendError::DeserializationFailed { .. }
        )
    }

    /// Check if this error indicates a data integrity issue.
    pub fn is_integrity_error(&self) -> bool {
        matches!(
            self,
            BackendError::CorruptRow { .. } | BackendError::StateInconsistency { .. }
        )
    }
}

impl From<BackendError> for crate::Error {
    fn from(err: BackendError) -> Self {
        crate::Error::Backend(err)
    }
}
