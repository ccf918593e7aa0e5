//! List transactions for SQL backends.

use async_trait::async_trait;
use tokio::sync::OwnedMutexGuard;

use crate::Result;
use crate::backend::{ListTransaction, errors::BackendError};
use crate::ids::{EntryId, ListId};
use crate::list::Entry;

use super::storage::{ENTRY_COLUMNS, EntryRow, decode_entry};
use super::{SqlxBackend, SqlxResultExt};

/// A sqlx transaction scoped to one list.
///
/// Dropping it without `commit` rolls the database transaction back.
pub(crate) struct SqlxTransaction<'a> {
    backend: &'a SqlxBackend,
    list: ListId,
    tx: sqlx::Transaction<'static, sqlx::Any>,
    _guard: OwnedMutexGuard<()>,
}

impl<'a> SqlxTransaction<'a> {
    pub(crate) async fn begin(backend: &'a SqlxBackend, list: &ListId) -> Result<Self> {
        let guard = backend.locks.acquire(list).await;

        let mut tx = backend
            .pool()
            .begin()
            .await
            .sql_context("Failed to begin transaction")?;

        if backend.is_postgres() {
            // Must be the first statement of the transaction.
            sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
                .execute(&mut *tx)
                .await
                .sql_context("Failed to set isolation level")?;
        }

        let exists: Option<(String,)> = sqlx::query_as("SELECT id FROM lists WHERE id = $1")
            .bind(list.to_string())
            .fetch_optional(&mut *tx)
            .await
            .sql_context("Failed to check list")?;
        if exists.is_none() {
            return Err(BackendError::ListNotFound { id: *list }.into());
        }

        Ok(Self {
            backend,
            list: *list,
            tx,
            _guard: guard,
        })
    }
}

#[async_trait]
impl<'a> ListTransaction for SqlxTransaction<'a> {
    fn list_id(&self) -> &ListId {
        &self.list
    }

    async fn load_ordered_entries(&mut self) -> Result<Vec<Entry>> {
        let rows: Vec<EntryRow> = sqlx::query_as(&format!(
            "SELECT {ENTRY_COLUMNS} FROM entries WHERE list_id = $1 {}",
            self.backend.rank_order()
        ))
        .bind(self.list.to_string())
        .fetch_all(&mut *self.tx)
        .await
        .sql_context("Failed to load list entries")?;

        rows.into_iter().map(decode_entry).collect()
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

        sqlx::query(
            "INSERT INTO entries (id, list_id, owner_id, rank, message, active, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             ON CONFLICT (id) DO UPDATE SET
                rank = EXCLUDED.rank,
                message = EXCLUDED.message,
                active = EXCLUDED.active",
        )
        .bind(entry.id.to_string())
        .bind(entry.list_id.to_string())
        .bind(entry.owner_id.to_string())
        .bind(entry.rank.as_str())
        .bind(&entry.message)
        .bind(i64::from(entry.active))
        .bind(entry.created_at)
        .execute(&mut *self.tx)
        .await
        .sql_context("Failed to save entry")?;

        Ok(())
    }

    async fn delete_entry(&mut self, id: &EntryId) -> Result<()> {
        sqlx::query("DELETE FROM entries WHERE id = $1 AND list_id = $2")
            .bind(id.to_string())
            .bind(self.list.to_string())
            .execute(&mut *self.tx)
            .await
            .sql_context("Failed to delete entry")?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let list = self.list;
        self.tx
            .commit()
            .await
            .sql_context("Failed to commit transaction")?;
        tracing::trace!(list_id = %list, "committed list transaction");
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.tx
            .rollback()
            .await
            .sql_context("Failed to roll back transaction")
    }
}
