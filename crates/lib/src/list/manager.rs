//! Transactional list operations.
//!
//! [`ListManager`] runs the pure [`ordering`](super::ordering) rules inside
//! a [`ListTransaction`]: load the list sorted by rank, re-rank in memory,
//! rebalance if a rewritten rank grew past the configured limit, write back
//! only the entries that changed, commit.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::{Entry, IndexedEntry, ListError, index_entries, ordering};
use crate::Result;
use crate::backend::{BackendImpl, ListTransaction};
use crate::clock::Clock;
use crate::constants::DEFAULT_MAX_RANK_LENGTH;
use crate::ids::{EntryId, ListId, UserId};
use crate::rank::{Rank, rebalance};

/// Tuning for the list manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListConfig {
    /// A re-ranked entry longer than this triggers a full rebalance.
    pub max_rank_length: usize,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            max_rank_length: DEFAULT_MAX_RANK_LENGTH,
        }
    }
}

/// Ordered list operations over a backend.
#[derive(Clone)]
pub struct ListManager {
    backend: Arc<dyn BackendImpl>,
    clock: Arc<dyn Clock>,
    config: ListConfig,
}

impl std::fmt::Debug for ListManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListManager")
            .field("clock", &self.clock)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ListManager {
    pub fn new(backend: Arc<dyn BackendImpl>, clock: Arc<dyn Clock>, config: ListConfig) -> Self {
        Self {
            backend,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &ListConfig {
        &self.config
    }

    /// Entries of `list` in rank order, with their positions.
    pub async fn ordered_entries(&self, list: &ListId) -> Result<Vec<IndexedEntry>> {
        let entries = self.backend.ordered_entries(list).await?;
        Ok(index_entries(entries))
    }

    /// Add a new entry at the end of `list`.
    pub async fn append(&self, list: &ListId, owner: &UserId, message: &str) -> Result<Entry> {
        self.insert(list, owner, message, None).await
    }

    /// Add a new entry at `index` (clamped) in `list`.
    pub async fn insert_at(
        &self,
        list: &ListId,
        owner: &UserId,
        message: &str,
        index: i64,
    ) -> Result<Entry> {
        self.insert(list, owner, message, Some(index)).await
    }

    async fn insert(
        &self,
        list: &ListId,
        owner: &UserId,
        message: &str,
        index: Option<i64>,
    ) -> Result<Entry> {
        let mut txn = self.backend.begin(list).await?;
        let result = async {
            let mut entries = self.load_ordered(txn.as_mut()).await?;
            let before = snapshot(&entries);

            let entry = Entry::new(*list, *owner, message, self.clock.now_secs());
            let id = entry.id;
            match index {
                None => ordering::append(&mut entries, entry)?,
                Some(index) => ordering::insert_at(&mut entries, entry, index)?,
            };
            debug!(list_id = %list, entry_id = %id, ?index, "placed new entry");

            self.persist(txn.as_mut(), &before, &mut entries).await?;
            find(&entries, &id, list).cloned()
        }
        .await;
        finish(txn, result).await
    }

    /// Move `entry` to `target` (clamped) and return the list in its new order.
    pub async fn move_to_index(
        &self,
        list: &ListId,
        entry: &EntryId,
        target: i64,
    ) -> Result<Vec<IndexedEntry>> {
        let mut txn = self.backend.begin(list).await?;
        let result = async {
            let mut entries = self.load_ordered(txn.as_mut()).await?;
            let before = snapshot(&entries);

            let from = position(&entries, entry, list)?;
            let to = ordering::move_to_index(&mut entries, from, target)?;
            debug!(list_id = %list, entry_id = %entry, from, to, "moved entry");

            self.persist(txn.as_mut(), &before, &mut entries).await?;
            Ok(index_entries(entries))
        }
        .await;
        finish(txn, result).await
    }

    /// Re-spread every rank of `list` and return it in order.
    ///
    /// Works on lists whose ranks collide, which no other operation accepts.
    pub async fn rebalance(&self, list: &ListId) -> Result<Vec<IndexedEntry>> {
        let mut txn = self.backend.begin(list).await?;
        let result = async {
            let mut entries = txn.load_ordered_entries().await?;
            let before = snapshot(&entries);

            rebalance(&mut entries)?;
            info!(list_id = %list, len = entries.len(), "rebalanced list");

            self.write_changed(txn.as_mut(), &before, &entries).await?;
            Ok(index_entries(entries))
        }
        .await;
        finish(txn, result).await
    }

    /// Replace the message of `entry`. Its position is untouched.
    pub async fn update_message(&self, list: &ListId, entry: &EntryId, message: &str) -> Result<Entry> {
        self.edit(list, entry, |e| e.message = message.to_string())
            .await
    }

    /// Flip the `active` flag of `entry`.
    pub async fn toggle(&self, list: &ListId, entry: &EntryId) -> Result<Entry> {
        self.edit(list, entry, |e| e.active = !e.active).await
    }

    async fn edit(
        &self,
        list: &ListId,
        entry: &EntryId,
        apply: impl FnOnce(&mut Entry) + Send,
    ) -> Result<Entry> {
        let mut txn = self.backend.begin(list).await?;
        let result = async {
            let entries = txn.load_ordered_entries().await?;
            let mut edited = find(&entries, entry, list)?.clone();
            apply(&mut edited);
            txn.save_entry(&edited).await?;
            Ok(edited)
        }
        .await;
        finish(txn, result).await
    }

    /// Delete `entry`. Sibling ranks are not touched.
    pub async fn remove(&self, list: &ListId, entry: &EntryId) -> Result<()> {
        let mut txn = self.backend.begin(list).await?;
        let result = async {
            let entries = txn.load_ordered_entries().await?;
            find(&entries, entry, list)?;
            txn.delete_entry(entry).await
        }
        .await;
        finish(txn, result).await
    }

    /// Load entries and refuse to place anything into a list with colliding ranks.
    async fn load_ordered(&self, txn: &mut (dyn ListTransaction + '_)) -> Result<Vec<Entry>> {
        let entries = txn.load_ordered_entries().await?;
        if let Some(rank) = ordering::first_collision(&entries) {
            return Err(ListError::RankCollision {
                list_id: *txn.list_id(),
                rank: rank.to_string(),
            }
            .into());
        }
        Ok(entries)
    }

    /// Rebalance if a rewritten rank is too long, then write what changed.
    async fn persist(
        &self,
        txn: &mut (dyn ListTransaction + '_),
        before: &HashMap<EntryId, Rank>,
        entries: &mut [Entry],
    ) -> Result<()> {
        let longest = entries
            .iter()
            .filter(|e| before.get(&e.id) != Some(&e.rank))
            .map(|e| e.rank.len())
            .max()
            .unwrap_or(0);

        if longest > self.config.max_rank_length {
            info!(
                list_id = %txn.list_id(),
                len = entries.len(),
                max_len = longest,
                limit = self.config.max_rank_length,
                "rank too long, rebalancing list"
            );
            rebalance(entries)?;
        }

        self.write_changed(txn, before, entries).await
    }

    async fn write_changed(
        &self,
        txn: &mut (dyn ListTransaction + '_),
        before: &HashMap<EntryId, Rank>,
        entries: &[Entry],
    ) -> Result<()> {
        let mut written = 0usize;
        for entry in entries {
            if before.get(&entry.id) != Some(&entry.rank) {
                txn.save_entry(entry).await?;
                written += 1;
            }
        }
        debug!(list_id = %txn.list_id(), written, "persisted re-ranked entries");
        Ok(())
    }
}

fn snapshot(entries: &[Entry]) -> HashMap<EntryId, Rank> {
    entries.iter().map(|e| (e.id, e.rank.clone())).collect()
}

fn position(entries: &[Entry], entry: &EntryId, list: &ListId) -> Result<usize> {
    entries.iter().position(|e| e.id == *entry).ok_or_else(|| {
        ListError::EntryNotInList {
            entry_id: *entry,
            list_id: *list,
        }
        .into()
    })
}

fn find<'a>(entries: &'a [Entry], entry: &EntryId, list: &ListId) -> Result<&'a Entry> {
    position(entries, entry, list).map(|i| &entries[i])
}

/// Commit on success, roll back on failure, returning the operation's result.
async fn finish<T>(txn: Box<dyn ListTransaction + '_>, result: Result<T>) -> Result<T> {
    match result {
        Ok(value) => {
            txn.commit().await?;
            Ok(value)
        }
        Err(err) => {
            let list = *txn.list_id();
            if let Err(rollback_err) = txn.rollback().await {
                warn!(list_id = %list, error = %rollback_err, "rollback failed");
            }
            if err.is_conflict() {
                warn!(list_id = %list, error = %err, "list transaction conflict");
            }
            Err(err)
        }
    }
}
