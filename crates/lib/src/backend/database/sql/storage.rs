//! Row storage operations for SQL backends.
//!
//! Users, list metadata and read-only entry queries. Entry writes go through
//! [`SqlxTransaction`](super::transaction::SqlxTransaction).

use std::str::FromStr;

use crate::Result;
use crate::backend::errors::BackendError;
use crate::ids::{EntryId, ListId, UserId};
use crate::list::{Entry, List};
use crate::rank::Rank;
use crate::user::{Role, User};

use super::{SqlxBackend, SqlxResultExt};

pub(crate) const USER_COLUMNS: &str = "id, username, password_hash, role, created_at";
pub(crate) const LIST_COLUMNS: &str = "id, owner_id, name, created_at";
pub(crate) const ENTRY_COLUMNS: &str = "id, list_id, owner_id, rank, message, active, created_at";

pub(crate) type UserRow = (String, String, String, String, i64);
pub(crate) type ListRow = (String, String, String, i64);
pub(crate) type EntryRow = (String, String, String, String, String, i64, i64);

fn parse_column<T: FromStr>(table: &'static str, column: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| {
        BackendError::CorruptRow {
            table,
            reason: format!("{column} {value:?}: {e}"),
        }
        .into()
    })
}

pub(crate) fn decode_user(row: UserRow) -> Result<User> {
    let (id, username, password_hash, role, created_at) = row;
    Ok(User {
        id: parse_column("users", "id", &id)?,
        username,
        password_hash,
        role: parse_column::<Role>("users", "role", &role)?,
        created_at,
    })
}

pub(crate) fn decode_list(row: ListRow) -> Result<List> {
    let (id, owner_id, name, created_at) = row;
    Ok(List {
        id: parse_column("lists", "id", &id)?,
        owner_id: parse_column("lists", "owner_id", &owner_id)?,
        name,
        created_at,
    })
}

pub(crate) fn decode_entry(row: EntryRow) -> Result<Entry> {
    let (id, list_id, owner_id, rank, message, active, created_at) = row;
    Ok(Entry {
        id: parse_column("entries", "id", &id)?,
        list_id: parse_column("entries", "list_id", &list_id)?,
        owner_id: parse_column("entries", "owner_id", &owner_id)?,
        rank: parse_column::<Rank>("entries", "rank", &rank)?,
        message,
        active: active != 0,
        created_at,
    })
}

/// Insert or update a user. A username taken by another row is reported as
/// [`BackendError::DuplicateUsername`].
pub async fn put_user(backend: &SqlxBackend, user: User) -> Result<()> {
    let result = sqlx::query(
        "INSERT INTO users (id, username, password_hash, role, created_at)
         VALUES ($1, $2, $3, $4, $5)
         ON CONFLICT (id) DO UPDATE SET
            username = EXCLUDED.username,
            password_hash = EXCLUDED.password_hash,
            role = EXCLUDED.role",
    )
    .bind(user.id.to_string())
    .bind(&user.username)
    .bind(&user.password_hash)
    .bind(user.role.as_str())
    .bind(user.created_at)
    .execute(backend.pool())
    .await;

    match result {
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
            Err(BackendError::DuplicateUsername {
                username: user.username,
            }
            .into())
        }
        other => other.map(|_| ()).sql_context("Failed to store user"),
    }
}

pub async fn get_user(backend: &SqlxBackend, id: &UserId) -> Result<User> {
    let row: Option<UserRow> =
        sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id.to_string())
            .fetch_optional(backend.pool())
            .await
            .sql_context("Failed to get user")?;

    match row {
        Some(row) => decode_user(row),
        None => Err(BackendError::UserNotFound { id: *id }.into()),
    }
}

pub async fn find_user_by_name(backend: &SqlxBackend, username: &str) -> Result<Option<User>> {
    let row: Option<UserRow> =
        sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1"))
            .bind(username)
            .fetch_optional(backend.pool())
            .await
            .sql_context("Failed to look up user by name")?;

    row.map(decode_user).transpose()
}

pub async fn all_users(backend: &SqlxBackend) -> Result<Vec<User>> {
    let rows: Vec<UserRow> = sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users"))
        .fetch_all(backend.pool())
        .await
        .sql_context("Failed to list users")?;

    rows.into_iter().map(decode_user).collect()
}

pub async fn put_list(backend: &SqlxBackend, list: List) -> Result<()> {
    sqlx::query(
        "INSERT INTO lists (id, owner_id, name, created_at)
         VALUES ($1, $2, $3, $4)
         ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name",
    )
    .bind(list.id.to_string())
    .bind(list.owner_id.to_string())
    .bind(&list.name)
    .bind(list.created_at)
    .execute(backend.pool())
    .await
    .sql_context("Failed to store list")?;

    Ok(())
}

pub async fn get_list(backend: &SqlxBackend, id: &ListId) -> Result<List> {
    let row: Option<ListRow> =
        sqlx::query_as(&format!("SELECT {LIST_COLUMNS} FROM lists WHERE id = $1"))
            .bind(id.to_string())
            .fetch_optional(backend.pool())
            .await
            .sql_context("Failed to get list")?;

    match row {
        Some(row) => decode_list(row),
        None => Err(BackendError::ListNotFound { id: *id }.into()),
    }
}

pub async fn all_lists(backend: &SqlxBackend) -> Result<Vec<List>> {
    let rows: Vec<ListRow> = sqlx::query_as(&format!("SELECT {LIST_COLUMNS} FROM lists"))
        .fetch_all(backend.pool())
        .await
        .sql_context("Failed to list lists")?;

    rows.into_iter().map(decode_list).collect()
}

/// Delete a list and its entries in one transaction, under the list lock.
pub async fn delete_list(backend: &SqlxBackend, id: &ListId) -> Result<()> {
    let _guard = backend.locks.acquire(id).await;

    let mut tx = backend
        .pool()
        .begin()
        .await
        .sql_context("Failed to begin transaction")?;

    let entries = sqlx::query("DELETE FROM entries WHERE list_id = $1")
        .bind(id.to_string())
        .execute(&mut *tx)
        .await
        .sql_context("Failed to delete list entries")?;

    let lists = sqlx::query("DELETE FROM lists WHERE id = $1")
        .bind(id.to_string())
        .execute(&mut *tx)
        .await
        .sql_context("Failed to delete list")?;

    if lists.rows_affected() == 0 {
        // Dropping `tx` rolls back.
        return Err(BackendError::ListNotFound { id: *id }.into());
    }

    tx.commit()
        .await
        .sql_context("Failed to commit transaction")?;

    tracing::debug!(list_id = %id, removed = entries.rows_affected(), "deleted list");
    backend.locks.forget(id);
    Ok(())
}

pub async fn get_entry(backend: &SqlxBackend, id: &EntryId) -> Result<Entry> {
    let row: Option<EntryRow> =
        sqlx::query_as(&format!("SELECT {ENTRY_COLUMNS} FROM entries WHERE id = $1"))
            .bind(id.to_string())
            .fetch_optional(backend.pool())
            .await
            .sql_context("Failed to get entry")?;

    match row {
        Some(row) => decode_entry(row),
        None => Err(BackendError::EntryNotFound { id: *id }.into()),
    }
}

pub async fn ordered_entries(backend: &SqlxBackend, list: &ListId) -> Result<Vec<Entry>> {
    // Distinguish an empty list from a missing one.
    get_list(backend, list).await?;

    let rows: Vec<EntryRow> = sqlx::query_as(&format!(
        "SELECT {ENTRY_COLUMNS} FROM entries WHERE list_id = $1 {}",
        backend.rank_order()
    ))
    .bind(list.to_string())
    .fetch_all(backend.pool())
    .await
    .sql_context("Failed to load list entries")?;

    rows.into_iter().map(decode_entry).collect()
}

pub async fn all_entries(backend: &SqlxBackend) -> Result<Vec<Entry>> {
    let rows: Vec<EntryRow> = sqlx::query_as(&format!("SELECT {ENTRY_COLUMNS} FROM entries"))
        .fetch_all(backend.pool())
        .await
        .sql_context("Failed to list entries")?;

    rows.into_iter().map(decode_entry).collect()
}
