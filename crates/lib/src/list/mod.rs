//! Lists and their rank-ordered entries.
//!
//! A [`List`] holds no ordering data of its own. Its order is whatever the
//! [`Rank`]s of its [`Entry`] rows say when they are read back. The pure
//! placement rules live in [`ordering`]; [`ListManager`] wraps them in a
//! backend transaction.

pub mod errors;
pub mod manager;
pub mod ordering;

use serde::{Deserialize, Serialize};

use crate::ids::{EntryId, ListId, UserId};
use crate::rank::{Rank, Ranked};

pub use errors::ListError;
pub use manager::{ListConfig, ListManager};

/// A named, owned collection of entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct List {
    pub id: ListId,
    pub owner_id: UserId,
    pub name: String,
    pub created_at: i64,
}

impl List {
    /// Build a new list with a fresh ID.
    pub fn new(owner_id: UserId, name: impl Into<String>, created_at: i64) -> Self {
        Self {
            id: ListId::generate(),
            owner_id,
            name: name.into(),
            created_at,
        }
    }
}

/// One item of a list, positioned by its rank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub list_id: ListId,
    pub owner_id: UserId,
    pub rank: Rank,
    pub message: String,
    pub active: bool,
    pub created_at: i64,
}

impl Entry {
    /// Build a new, active entry. The rank is a placeholder until the entry
    /// is placed into its list.
    pub fn new(list_id: ListId, owner_id: UserId, message: impl Into<String>, created_at: i64) -> Self {
        Self {
            id: EntryId::generate(),
            list_id,
            owner_id,
            rank: Rank::first(),
            message: message.into(),
            active: true,
            created_at,
        }
    }
}

impl Ranked for Entry {
    fn rank(&self) -> &Rank {
        &self.rank
    }

    fn set_rank(&mut self, rank: Rank) {
        self.rank = rank;
    }
}

/// An entry together with its zero-based position in the list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedEntry {
    pub index: usize,
    #[serde(flatten)]
    pub entry: Entry,
}

/// Attach positions to entries that are already in rank order.
pub fn index_entries(entries: Vec<Entry>) -> Vec<IndexedEntry> {
    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| IndexedEntry { index, entry })
        .collect()
}
