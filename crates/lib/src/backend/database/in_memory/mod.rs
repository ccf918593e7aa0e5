//! In-memory database backend implementation
//!
//! This module provides an in-memory implementation of the BackendImpl trait,
//! suitable for testing, development, or single-process deployments that
//! snapshot their state to a JSON file on shutdown.

mod persistence;
mod storage;
mod transaction;

use std::any::Any;
use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::Result;
use crate::backend::{BackendImpl, ListLocks, ListTransaction};
use crate::ids::{EntryId, ListId, UserId};
use crate::list::{Entry, List};
use crate::user::User;

/// A simple in-memory database implementation using `HashMap`s for storage.
///
/// It provides basic persistence capabilities via `save_to_file` and
/// `load_from_file`, serializing every table to JSON.
///
/// List transactions stage their writes privately and apply them under the
/// `entries` write lock on commit. Writers on the same list are serialized
/// by a per-list lock held for the life of the transaction.
#[derive(Debug, Default)]
pub struct InMemory {
    pub(crate) users: RwLock<HashMap<UserId, User>>,
    pub(crate) lists: RwLock<HashMap<ListId, List>>,
    pub(crate) entries: RwLock<HashMap<EntryId, Entry>>,
    pub(crate) locks: ListLocks,
}

impl InMemory {
    /// Creates a new, empty `InMemory` database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Saves the entire database state to a specified file as JSON.
    ///
    /// # Arguments
    /// * `path` - The path to the file where the state should be saved.
    ///
    /// # Returns
    /// A `Result` indicating success or an I/O or serialization error.
    pub async fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        persistence::save_to_file(self, path).await
    }

    /// Loads the database state from a specified JSON file.
    ///
    /// If the file does not exist, a new, empty `InMemory` database is returned.
    ///
    /// # Arguments
    /// * `path` - The path to the file from which to load the state.
    ///
    /// # Returns
    /// A `Result` containing the loaded `InMemory` database or an I/O or deserialization error.
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        persistence::load_from_file(path).await
    }
}

#[async_trait]
impl BackendImpl for InMemory {
    async fn put_user(&self, user: User) -> Result<()> {
        storage::put_user(self, user).await
    }

    async fn get_user(&self, id: &UserId) -> Result<User> {
        storage::get_user(self, id).await
    }

    async fn find_user_by_name(&self, username: &str) -> Result<Option<User>> {
        storage::find_user_by_name(self, username).await
    }

    async fn all_users(&self) -> Result<Vec<User>> {
        Ok(self.users.read().await.values().cloned().collect())
    }

    async fn put_list(&self, list: List) -> Result<()> {
        self.lists.write().await.insert(list.id, list);
        Ok(())
    }

    async fn get_list(&self, id: &ListId) -> Result<List> {
        storage::get_list(self, id).await
    }

    async fn all_lists(&self) -> Result<Vec<List>> {
        Ok(self.lists.read().await.values().cloned().collect())
    }

    async fn delete_list(&self, id: &ListId) -> Result<()> {
        storage::delete_list(self, id).await
    }

    async fn get_entry(&self, id: &EntryId) -> Result<Entry> {
        storage::get_entry(self, id).await
    }

    async fn ordered_entries(&self, list: &ListId) -> Result<Vec<Entry>> {
        storage::ordered_entries(self, list).await
    }

    async fn all_entries(&self) -> Result<Vec<Entry>> {
        Ok(self.entries.read().await.values().cloned().collect())
    }

    async fn begin<'a>(&'a self, list: &ListId) -> Result<Box<dyn ListTransaction + 'a>> {
        let txn = transaction::InMemoryTransaction::begin(self, list).await?;
        Ok(Box::new(txn))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
