//! Core storage operations for InMemory database

use super::InMemory;
use crate::{
    Result,
    backend::errors::BackendError,
    ids::{EntryId, ListId, UserId},
    list::{Entry, List},
    user::User,
};

/// Insert or replace a user, rejecting a username held by another user.
pub(crate) async fn put_user(backend: &InMemory, user: User) -> Result<()> {
    let mut users = backend.users.write().await;
    if users
        .values()
        .any(|u| u.username == user.username && u.id != user.id)
    {
        return Err(BackendError::DuplicateUsername {
            username: user.username,
        }
        .into());
    }
    users.insert(user.id, user);
    Ok(())
}

pub(crate) async fn get_user(backend: &InMemory, id: &UserId) -> Result<User> {
    let users = backend.users.read().await;
    users
        .get(id)
        .cloned()
        .ok_or_else(|| BackendError::UserNotFound { id: *id }.into())
}

pub(crate) async fn find_user_by_name(backend: &InMemory, username: &str) -> Result<Option<User>> {
    let users = backend.users.read().await;
    Ok(users.values().find(|u| u.username == username).cloned())
}

pub(crate) async fn get_list(backend: &InMemory, id: &ListId) -> Result<List> {
    let lists = backend.lists.read().await;
    lists
        .get(id)
        .cloned()
        .ok_or_else(|| BackendError::ListNotFound { id: *id }.into())
}

/// Remove a list and every entry in it.
///
/// Holds the list lock so the removal cannot land in the middle of a list
/// transaction.
pub(crate) async fn delete_list(backend: &InMemory, id: &ListId) -> Result<()> {
    let _guard = backend.locks.acquire(id).await;

    let removed = backend.lists.write().await.remove(id);
    if removed.is_none() {
        return Err(BackendError::ListNotFound { id: *id }.into());
    }

    let mut entries = backend.entries.write().await;
    let before = entries.len();
    entries.retain(|_, e| e.list_id != *id);
    tracing::debug!(list_id = %id, removed = before - entries.len(), "deleted list");

    backend.locks.forget(id);
    Ok(())
}

pub(crate) async fn get_entry(backend: &InMemory, id: &EntryId) -> Result<Entry> {
    let entries = backend.entries.read().await;
    entries
        .get(id)
        .cloned()
        .ok_or_else(|| BackendError::EntryNotFound { id: *id }.into())
}

pub(crate) async fn ordered_entries(backend: &InMemory, list: &ListId) -> Result<Vec<Entry>> {
    if !backend.lists.read().await.contains_key(list) {
        return Err(BackendError::ListNotFound { id: *list }.into());
    }
    let entries = backend.entries.read().await;
    let mut ordered: Vec<Entry> = entries
        .values()
        .filter(|e| e.list_id == *list)
        .cloned()
        .collect();
    sort_by_rank(&mut ordered);
    Ok(ordered)
}

/// Rank order, with the ID breaking ties between colliding ranks so the
/// result is deterministic.
pub(crate) fn sort_by_rank(entries: &mut [Entry]) {
    entries.sort_by(|a, b| a.rank.cmp(&b.rank).then_with(|| a.id.cmp(&b.id)));
}
