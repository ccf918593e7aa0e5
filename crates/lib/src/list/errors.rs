//! Error types for list operations.

use thiserror::Error;

use crate::ids::{EntryId, ListId};

/// Errors raised by the ordered list manager.
#[non_exhaustive]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ListError {
    /// The entry does not belong to the list the operation was scoped to.
    #[error("Entry {entry_id} is not in list {list_id}")]
    EntryNotInList {
        /// The entry that was looked up
        entry_id: EntryId,
        /// The list that was searched
        list_id: ListId,
    },

    /// Two entries of a list share a rank, so their order is undefined.
    ///
    /// Only a rebalance can repair this.
    #[error("List {list_id} has more than one entry ranked {rank:?}")]
    RankCollision {
        /// The affected list
        list_id: ListId,
        /// The duplicated rank
        rank: String,
    },

    /// List names must not be blank.
    #[error("List name must not be empty")]
    EmptyName,
}

impl ListError {
    /// Check if this error indicates the entry could not be found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ListError::EntryNotInList { .. })
    }

    /// Check if this error comes from invalid caller input.
    pub fn is_validation_error(&self) -> bool {
        matches!(self, ListError::EmptyName)
    }

    /// Check if stored data breaks the ordering invariant.
    pub fn is_integrity_error(&self) -> bool {
        matches!(self, ListError::RankCollision { .. })
    }
}

impl From<ListError> for crate::Error {
    fn from(err: ListError) -> Self {
        crate::Error::List(err)
    }
}
