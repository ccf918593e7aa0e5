//! Backend implementations for lexlist storage
//!
//! This module provides the [`BackendImpl`] trait and its implementations
//! organized by category (currently only `database`).
//!
//! The ordered list manager never talks to a storage engine directly. It
//! asks a backend for a [`ListTransaction`] scoped to one list, reads the
//! list's entries in rank order, stages its rank changes and commits them
//! as a unit. Everything outside a list transaction (users, list metadata,
//! read-only lookups) goes through plain `BackendImpl` methods.

use std::any::Any;

use async_trait::async_trait;

use crate::Result;
use crate::ids::{EntryId, ListId, UserId};
use crate::list::{Entry, List};
use crate::user::User;

// Category modules
pub mod database;
pub mod errors;
mod locks;

pub use errors::BackendError;
pub(crate) use locks::ListLocks;

/// Storage abstraction for users, lists and entries.
///
/// All implementations must be `Send + Sync` so a single backend can be
/// shared by every request handler, and `Any` so callers can downcast to a
/// concrete backend (for example to save an [`InMemory`](database::InMemory)
/// backend on shutdown).
#[async_trait]
pub trait BackendImpl: Send + Sync + Any {
    // === Users ===

    /// Insert or replace a user, keyed by `user.id`.
    async fn put_user(&self, user: User) -> Result<()>;

    /// Fetch a user by ID.
    ///
    /// # Errors
    /// [`BackendError::UserNotFound`] if no such user exists.
    async fn get_user(&self, id: &UserId) -> Result<User>;

    /// Look up a user by unique username.
    async fn find_user_by_name(&self, username: &str) -> Result<Option<User>>;

    /// All users, in no particular order.
    async fn all_users(&self) -> Result<Vec<User>>;

    // === Lists ===

    /// Insert or replace list metadata, keyed by `list.id`.
    async fn put_list(&self, list: List) -> Result<()>;

    /// Fetch list metadata by ID.
    ///
    /// # Errors
    /// [`BackendError::ListNotFound`] if no such list exists.
    async fn get_list(&self, id: &ListId) -> Result<List>;

    /// All lists, in no particular order.
    async fn all_lists(&self) -> Result<Vec<List>>;

    /// Delete a list together with all of its entries.
    ///
    /// Takes the list's lock so it cannot interleave with a running list
    /// transaction.
    async fn delete_list(&self, id: &ListId) -> Result<()>;

    // === Entries (read-only; writes go through ListTransaction) ===

    /// Fetch an entry by ID.
    ///
    /// # Errors
    /// [`BackendError::EntryNotFound`] if no such entry exists.
    async fn get_entry(&self, id: &EntryId) -> Result<Entry>;

    /// Entries of one list sorted by rank, outside of any transaction.
    async fn ordered_entries(&self, list: &ListId) -> Result<Vec<Entry>>;

    /// Every entry of every list.
    async fn all_entries(&self) -> Result<Vec<Entry>>;

    // === Transactions ===

    /// Open a transaction scoped to `list`.
    ///
    /// The transaction holds exclusive access to the list's entries until it
    /// is committed, rolled back or dropped. Dropping without committing
    /// discards all staged writes.
    async fn begin<'a>(&'a self, list: &ListId) -> Result<Box<dyn ListTransaction + 'a>>;

    /// Returns a reference to the backend instance as a dynamic `Any` type.
    ///
    /// This allows for downcasting to a concrete backend implementation if
    /// necessary.
    fn as_any(&self) -> &dyn Any;
}

/// A read-modify-write session over the entries of one list.
///
/// Reads observe the transaction's own staged writes. Nothing becomes
/// visible to other readers until [`commit`](ListTransaction::commit).
#[async_trait]
pub trait ListTransaction: Send {
    /// The list this transaction is scoped to.
    fn list_id(&self) -> &ListId;

    /// The list's entries sorted ascending by rank.
    async fn load_ordered_entries(&mut self) -> Result<Vec<Entry>>;

    /// Insert or replace an entry, keyed by `entry.id`.
    ///
    /// # Errors
    /// [`BackendError::StateInconsistency`] if the entry belongs to another list.
    async fn save_entry(&mut self, entry: &Entry) -> Result<()>;

    /// Delete an entry of this list.
    async fn delete_entry(&mut self, id: &EntryId) -> Result<()>;

    /// Make every staged write visible atomically.
    async fn commit(self: Box<Self>) -> Result<()>;

    /// Discard every staged write.
    async fn rollback(self: Box<Self>) -> Result<()>;
}
