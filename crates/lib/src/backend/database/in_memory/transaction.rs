//! Staged list transactions for the InMemory database

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::OwnedMutexGuard;

use super::InMemory;
use super::storage::sort_by_rank;
use crate::{
    Result,
    backend::{ListTransaction, errors::BackendError},
    ids::{EntryId, ListId},
    list::Entry,
};

/// Writes are staged here and only reach the shared maps on commit.
///
/// `None` marks a staged deletion.
pub(crate) struct InMemoryTransaction<'a> {
    backend: &'a InMemory,
    list: ListId,
    staged: HashMap<EntryId, Option<Entry>>,
    _guard: OwnedMutexGuard<()>,
}

impl<'a> InMemoryTransaction<'a> {
    pub(crate) async fn begin(backend: &'a InMemory, list: &ListId) -> Result<Self> {
        let guard = backend.locks.acquire(list).await;

        // Checked under the lock so a concurrent delete_list is observed.
        if !backend.lists.read().await.contains_key(list) {
            return Err(BackendError::ListNotFound { id: *list }.into());
        }

        Ok(Self {
            backend,
            list: *list,
            staged: HashMap::new(),
            _guard: guard,
        })
    }
}

#[async_trait]
impl<'a> ListTransaction for InMemoryTransaction<'a> {
    fn list_id(&self) -> &ListId {
        &self.list
    }

    async fn load_ordered_entries(&mut self) -> Result<Vec<Entry>> {
        let mut merged: HashMap<EntryId, Entry> = {
            let entries = self.backend.entries.read().await;
            entries
                .values()
                .filter(|e| e.list_id == self.list)
                .map(|e| (e.id, e.clone()))
                .collect()
        };

        for (id, staged) in &self.staged {
            match staged {
                Some(entry) => {
                    merged.insert(*id, entry.clone());
                }
                None => {
                    merged.remove(id);
                }
            }
        }

        let mut ordered: Vec<Entry> = merged.into_values().collect();
        sort_by_rank(&mut ordered);
        Ok(ordered)
    }

    async fn save_entry(&mut self, entry: &Entry) -> Result<()> {
        if entry.list_id != self.list {
            return Err(BackendError::StateInconsistency {
                reason: format!(
                    "entry {} belongs to list {}, not {}",
                    entry.id, entry.list_id, self.list
                ),
            }
            .into());
        }
        self.staged.insert(entry.id, Some(entry.clone()));
        Ok(())
    }

    async fn delete_entry(&mut self, id: &EntryId) -> Result<()> {
        self.staged.insert(*id, None);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let this = *self;
        let mut entries = this.backend.entries.write().await;
        let count = this.staged.len();
        for (id, staged) in this.staged {
            match staged {
                Some(entry) => {
                    entries.insert(id, entry);
                }
                None => {
                    entries.remove(&id);
                }
            }
        }
        tracing::trace!(list_id = %this.list, count, "committed list transaction");
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        tracing::trace!(list_id = %self.list, discarded = self.staged.len(), "rolled back list transaction");
        Ok(())
    }
}
