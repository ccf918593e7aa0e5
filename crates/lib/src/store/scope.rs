//! Caller-scoped list and entry operations.

use handle_trait::Handle;
use serde::{Deserialize, Serialize};

use super::Store;
use crate::Result;
use crate::backend::BackendError;
use crate::ids::{EntryId, ListId};
use crate::list::{Entry, IndexedEntry, List, ListError};
use crate::user::Caller;

/// A list together with its entries in rank order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListView {
    #[serde(flatten)]
    pub list: List,
    pub entries: Vec<IndexedEntry>,
}

/// A [`Store`] bound to one caller.
///
/// Admins see every row. Other callers only see lists and entries they own;
/// anything else is reported as not found rather than forbidden.
#[derive(Debug, Clone)]
pub struct Scope {
    store: Store,
    caller: Caller,
}

impl Scope {
    pub(super) fn new(store: Store, caller: Caller) -> Self {
        Self { store, caller }
    }

    pub fn caller(&self) -> &Caller {
        &self.caller
    }

    // === Lists ===

    /// Visible lists, oldest first.
    pub async fn lists(&self) -> Result<Vec<List>> {
        let mut lists: Vec<List> = self
            .store
            .backend()
            .all_lists()
            .await?
            .into_iter()
            .filter(|l| self.caller.can_access(&l.owner_id))
            .collect();
        lists.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.name.cmp(&b.name)));
        Ok(lists)
    }

    pub async fn create_list(&self, name: &str) -> Result<List> {
        let list = List::new(
            self.caller.user_id,
            valid_name(name)?,
            self.store.clock().now_secs(),
        );
        self.store.backend().put_list(list.clone()).await?;
        tracing::debug!(list_id = %list.id, owner = %list.owner_id, "created list");
        Ok(list)
    }

    /// A list with its entries in order.
    pub async fn get_list(&self, id: &ListId) -> Result<ListView> {
        let list = self.visible_list(id).await?;
        let entries = self.store.lists().ordered_entries(id).await?;
        Ok(ListView { list, entries })
    }

    pub async fn rename_list(&self, id: &ListId, name: &str) -> Result<List> {
        let mut list = self.visible_list(id).await?;
        list.name = valid_name(name)?;
        self.store.backend().put_list(list.clone()).await?;
        Ok(list)
    }

    /// Delete a list and all of its entries.
    pub async fn delete_list(&self, id: &ListId) -> Result<()> {
        self.visible_list(id).await?;
        self.store.backend().delete_list(id).await
    }

    /// Move `entry` to position `index` (clamped) in `list`.
    pub async fn reorder(&self, list: &ListId, entry: &EntryId, index: i64) -> Result<Vec<IndexedEntry>> {
        self.visible_list(list).await?;
        self.store.lists().move_to_index(list, entry, index).await
    }

    /// Reassign every rank of `list`.
    pub async fn rebalance(&self, list: &ListId) -> Result<Vec<IndexedEntry>> {
        self.visible_list(list).await?;
        self.store.lists().rebalance(list).await
    }

    // === Entries ===

    /// Visible entries, grouped by list and in rank order within each list.
    pub async fn entries(&self) -> Result<Vec<Entry>> {
        let mut entries: Vec<Entry> = self
            .store
            .backend()
            .all_entries()
            .await?
            .into_iter()
            .filter(|e| self.caller.can_access(&e.owner_id))
            .collect();
        entries.sort_by(|a, b| a.list_id.cmp(&b.list_id).then_with(|| a.rank.cmp(&b.rank)));
        Ok(entries)
    }

    /// Append to `list`, or insert at `index` (clamped) when given.
    ///
    /// The entry belongs to the list's owner, whoever creates it.
    pub async fn create_entry(&self, list: &ListId, message: &str, index: Option<i64>) -> Result<Entry> {
        let owner = self.visible_list(list).await?.owner_id;
        match index {
            Some(index) => self.store.lists().insert_at(list, &owner, message, index).await,
            None => self.store.lists().append(list, &owner, message).await,
        }
    }

    pub async fn get_entry(&self, id: &EntryId) -> Result<Entry> {
        self.visible_entry(id).await
    }

    /// Replace an entry's message.
    pub async fn update_entry(&self, id: &EntryId, message: &str) -> Result<Entry> {
        let entry = self.visible_entry(id).await?;
        self.store
            .lists()
            .update_message(&entry.list_id, id, message)
            .await
    }

    pub async fn delete_entry(&self, id: &EntryId) -> Result<()> {
        let entry = self.visible_entry(id).await?;
        self.store.lists().remove(&entry.list_id, id).await
    }

    /// Flip an entry's `active` flag.
    pub async fn toggle_entry(&self, id: &EntryId) -> Result<Entry> {
        let entry = self.visible_entry(id).await?;
        self.store.lists().toggle(&entry.list_id, id).await
    }

    async fn visible_list(&self, id: &ListId) -> Result<List> {
        let list = self.store.backend().get_list(id).await?;
        if !self.caller.can_access(&list.owner_id) {
            return Err(BackendError::ListNotFound { id: *id }.into());
        }
        Ok(list)
    }

    async fn visible_entry(&self, id: &EntryId) -> Result<Entry> {
        let entry = self.store.backend().get_entry(id).await?;
        if !self.caller.can_access(&entry.owner_id) {
            return Err(BackendError::EntryNotFound { id: *id }.into());
        }
        Ok(entry)
    }
}

fn valid_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ListError::EmptyName.into());
    }
    Ok(name.to_string())
}

impl Handle for Scope {
    fn handle(&self) -> Self {
        Self {
            store: self.store.handle(),
            caller: self.caller.clone(),
        }
    }
}
