//! SQL-based backend implementations for lexlist storage.
//!
//! This module provides SQL database backends that implement the `BackendImpl` trait,
//! storing users, lists and ranked entries in relational tables.
//!
//! ## Available Backends
//!
//! - **SQLite** (feature: `sqlite`): Embedded database
//! - **PostgreSQL** (feature: `postgres`): PostgreSQL database
//!
//! ## Architecture
//!
//! The SQL backend uses sqlx with `AnyPool` for multi-database support.
//! A list transaction is a sqlx transaction plus the in-process list lock.
//! On PostgreSQL the transaction runs at `SERIALIZABLE`, and ranks are
//! sorted with `COLLATE "C"` so the database orders them byte-wise exactly
//! like [`Rank`](crate::rank::Rank)'s `Ord`.
//!
//! ## Schema and Migrations
//!
//! The database schema is defined in the [`schema`] module and automatically
//! initialized when connecting. Migrations are handled via code-based functions
//! rather than SQL files to support dialect differences between SQLite and PostgreSQL.

mod storage;
mod transaction;

/// Schema definition and migration system.
pub mod schema;

use std::any::Any;
#[cfg(feature = "postgres")]
use std::time::Duration;

use async_trait::async_trait;
use sqlx::AnyPool;
#[cfg(feature = "postgres")]
use sqlx::Executor;
use sqlx::any::AnyPoolOptions;

use crate::Result;
use crate::backend::errors::BackendError;
use crate::backend::{BackendImpl, ListLocks, ListTransaction};
use crate::ids::{EntryId, ListId, UserId};
use crate::list::{Entry, List};
use crate::user::User;

/// SQLSTATE codes PostgreSQL uses for serialization failures and deadlocks.
const PG_CONFLICT_CODES: [&str; 2] = ["40001", "40P01"];

/// Primary SQLite result codes for `SQLITE_BUSY` and `SQLITE_LOCKED`.
const SQLITE_CONFLICT_CODES: [i32; 2] = [5, 6];

/// True if `err` means a concurrent writer got in the way and the whole
/// operation may be retried.
fn is_conflict(err: &sqlx::Error) -> bool {
    let Some(code) = err.as_database_error().and_then(|db| db.code()) else {
        return false;
    };
    if PG_CONFLICT_CODES.contains(&code.as_ref()) {
        return true;
    }
    // SQLite reports extended codes; the low byte is the primary code.
    code.parse::<i32>()
        .is_ok_and(|c| SQLITE_CONFLICT_CODES.contains(&(c & 0xff)))
}

/// Extension trait for sqlx Result types to simplify error handling.
///
/// Similar to `anyhow::Context`, this trait adds a method to convert
/// sqlx errors to `BackendError::SqlxError` with a context message.
/// Lock and serialization failures become `BackendError::TransactionConflict`.
pub(crate) trait SqlxResultExt<T> {
    /// Convert sqlx error to BackendError with context message.
    fn sql_context(self, context: &str) -> Result<T>;
}

impl<T> SqlxResultExt<T> for std::result::Result<T, sqlx::Error> {
    fn sql_context(self, context: &str) -> Result<T> {
        self.map_err(|e| {
            if is_conflict(&e) {
                tracing::warn!(error = %e, "{context}: transaction conflict");
                BackendError::TransactionConflict {
                    reason: format!("{context}: {e}"),
                }
                .into()
            } else {
                BackendError::SqlxError {
                    reason: format!("{context}: {e}"),
                    source: Some(e),
                }
                .into()
            }
        })
    }
}

/// Database backend kind for SQL dialect selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbKind {
    /// SQLite database
    Sqlite,
    /// PostgreSQL database
    Postgres,
}

/// SQL-based backend implementing `BackendImpl` using sqlx.
///
/// This backend supports both SQLite and PostgreSQL through sqlx's `AnyPool`.
///
/// # Thread Safety
///
/// `SqlxBackend` is `Send + Sync` as required by `BackendImpl`. The underlying
/// sqlx pool handles connection pooling and thread safety.
///
/// # Test Isolation
///
/// For PostgreSQL, each backend instance can use its own schema for test isolation.
/// Use `connect_postgres_isolated()` to create an isolated backend for testing.
#[derive(Debug)]
pub struct SqlxBackend {
    pool: AnyPool,
    kind: DbKind,
    locks: ListLocks,
}

impl SqlxBackend {
    fn new(pool: AnyPool, kind: DbKind) -> Self {
        Self {
            pool,
            kind,
            locks: ListLocks::new(),
        }
    }

    /// Get a reference to the underlying pool.
    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    /// Get the database kind.
    pub fn kind(&self) -> DbKind {
        self.kind
    }

    /// Check if this backend is using SQLite.
    pub fn is_sqlite(&self) -> bool {
        self.kind == DbKind::Sqlite
    }

    /// Check if this backend is using PostgreSQL.
    pub fn is_postgres(&self) -> bool {
        self.kind == DbKind::Postgres
    }

    /// `ORDER BY` clause sorting entries by rank, byte-wise on every dialect.
    pub(crate) fn rank_order(&self) -> &'static str {
        match self.kind {
            DbKind::Sqlite => "ORDER BY rank, id",
            DbKind::Postgres => "ORDER BY rank COLLATE \"C\", id",
        }
    }

    /// Close every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

// SQLite-specific implementations
#[cfg(feature = "sqlite")]
impl SqlxBackend {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use lexlist::backend::database::sql::SqlxBackend;
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     let backend = SqlxBackend::open_sqlite("lexlist.db").await.unwrap();
    /// }
    /// ```
    pub async fn open_sqlite<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        // mode=rwc: read-write-create (create file if it doesn't exist)
        let url = format!("sqlite:{}?mode=rwc", path.as_ref().display());
        Self::connect_sqlite(&url).await
    }

    /// Connect to a SQLite database using a connection URL.
    ///
    /// # Arguments
    ///
    /// * `url` - SQLite connection URL (e.g., "sqlite:./lexlist.db")
    pub async fn connect_sqlite(url: &str) -> Result<Self> {
        sqlx::any::install_default_drivers();

        let is_in_memory = url.contains("mode=memory");

        // An in-memory database is destroyed when its last connection closes,
        // so keep one connection alive for the life of the pool.
        let pool = if is_in_memory {
            AnyPoolOptions::new()
                .max_connections(5)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect(url)
                .await
                .sql_context("Failed to connect to SQLite")?
        } else {
            AnyPoolOptions::new()
                .max_connections(5)
                .connect(url)
                .await
                .sql_context("Failed to connect to SQLite")?
        };

        if is_in_memory {
            sqlx::query("PRAGMA busy_timeout = 5000;")
                .execute(&pool)
                .await
                .sql_context("Failed to configure SQLite")?;
        } else {
            // - journal_mode=WAL: Write-Ahead Logging for better concurrency
            // - synchronous=NORMAL: Balanced durability (safe with WAL)
            // - busy_timeout=5000: Wait up to 5s for locks before failing
            sqlx::query(
                "PRAGMA journal_mode = WAL;
                 PRAGMA synchronous = NORMAL;
                 PRAGMA busy_timeout = 5000;",
            )
            .execute(&pool)
            .await
            .sql_context("Failed to configure SQLite")?;
        }

        let backend = Self::new(pool, DbKind::Sqlite);
        schema::initialize(&backend).await?;

        Ok(backend)
    }

    /// Create an in-memory SQLite database.
    ///
    /// The database exists only for the lifetime of this backend instance.
    /// Useful for testing.
    pub async fn sqlite_in_memory() -> Result<Self> {
        // Shared cache so every pooled connection sees the same database;
        // a unique name keeps instances apart.
        let unique_id = uuid::Uuid::new_v4();
        let url = format!("sqlite:file:mem_{unique_id}?mode=memory&cache=shared");
        Self::connect_sqlite(&url).await
    }
}

// PostgreSQL-specific implementations
#[cfg(feature = "postgres")]
impl SqlxBackend {
    /// Connect to a PostgreSQL database using a connection URL.
    ///
    /// This connects to the default (public) schema. For test isolation,
    /// use `connect_postgres_isolated()` instead.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use lexlist::backend::database::sql::SqlxBackend;
    ///
    /// let backend = SqlxBackend::connect_postgres("postgres://localhost/lexlist").await.unwrap();
    /// ```
    pub async fn connect_postgres(url: &str) -> Result<Self> {
        Self::connect_postgres_with_schema(url, None).await
    }

    /// Connect to a PostgreSQL database, optionally inside a dedicated schema.
    async fn connect_postgres_with_schema(url: &str, schema_name: Option<String>) -> Result<Self> {
        sqlx::any::install_default_drivers();

        if let Some(ref schema) = schema_name {
            let temp_pool = AnyPoolOptions::new()
                .max_connections(1)
                .connect(url)
                .await
                .sql_context("Failed to connect to PostgreSQL")?;

            let create_schema = format!("CREATE SCHEMA IF NOT EXISTS {schema}");
            sqlx::query(&create_schema)
                .execute(&temp_pool)
                .await
                .sql_context(&format!("Failed to create schema {schema}"))?;

            temp_pool.close().await;
        }

        // Set search_path on every new connection rather than via URL options.
        let schema_for_hook = schema_name.clone();
        let mut pool_options = AnyPoolOptions::new();

        if schema_name.is_some() {
            // Isolated test schemas: small pools, patient acquire
            pool_options = pool_options
                .max_connections(2)
                .acquire_timeout(Duration::from_secs(30));
        } else {
            pool_options = pool_options.max_connections(5);
        }

        let pool = pool_options
            .after_connect(move |conn, _meta| {
                let schema = schema_for_hook.clone();
                Box::pin(async move {
                    if let Some(ref s) = schema {
                        let set_path = format!("SET search_path TO {s}");
                        conn.execute(set_path.as_str()).await?;
                    }
                    Ok(())
                })
            })
            .connect(url)
            .await
            .sql_context("Failed to connect to PostgreSQL")?;

        let backend = Self::new(pool, DbKind::Postgres);
        schema::initialize(&backend).await?;

        Ok(backend)
    }

    /// Connect to a PostgreSQL database with test isolation.
    ///
    /// Creates a unique schema for this backend instance, ensuring tests
    /// don't interfere with each other when run in parallel.
    pub async fn connect_postgres_isolated(url: &str) -> Result<Self> {
        // Schema names must start with a letter and be lowercase
        let unique_id = uuid::Uuid::new_v4().simple().to_string();
        let schema_name = format!("test_{unique_id}");
        Self::connect_postgres_with_schema(url, Some(schema_name)).await
    }
}

#[async_trait]
impl BackendImpl for SqlxBackend {
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
        storage::all_users(self).await
    }

    async fn put_list(&self, list: List) -> Result<()> {
        storage::put_list(self, list).await
    }

    async fn get_list(&self, id: &ListId) -> Result<List> {
        storage::get_list(self, id).await
    }

    async fn all_lists(&self) -> Result<Vec<List>> {
        storage::all_lists(self).await
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
        storage::all_entries(self).await
    }

    async fn begin<'a>(&'a self, list: &ListId) -> Result<Box<dyn ListTransaction + 'a>> {
        let txn = transaction::SqlxTransaction::begin(self, list).await?;
        Ok(Box::new(txn))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(feature = "sqlite")]
/// Convenience type alias for SQLite backend using sqlx.
pub type Sqlite = SqlxBackend;

#[cfg(feature = "postgres")]
/// Convenience type alias for PostgreSQL backend using sqlx.
pub type Postgres = SqlxBackend;
