//! SQL schema definitions and migrations.
//!
//! Three tables (`users`, `lists`, `entries`) plus `schema_version`. Only
//! types both SQLite and PostgreSQL understand are used: TEXT for IDs and
//! ranks, BIGINT for timestamps and flags.
//!
//! # Migration System
//!
//! The migration system uses code-based migrations rather than SQL files to handle
//! dialect differences between SQLite and PostgreSQL. Each migration is a function
//! that receives the backend and can execute database-specific SQL as needed.
//!
//! To change the schema, bump `SCHEMA_VERSION`, write a `migrate_vN_to_vM`
//! function and dispatch to it from `run_migration`.

use crate::Result;
use crate::backend::errors::BackendError;

use super::{SqlxBackend, SqlxResultExt};

/// Current schema version.
///
/// Increment this when making schema changes that require migration.
pub const SCHEMA_VERSION: i64 = 1;

/// SQL statements to create the schema tables.
///
/// Each statement uses portable SQL that works on both SQLite and PostgreSQL.
pub const CREATE_TABLES: &[&str] = &[
    // Schema version tracking
    // BIGINT (64-bit) used for portability between SQLite and PostgreSQL
    "CREATE TABLE IF NOT EXISTS schema_version (
        version BIGINT PRIMARY KEY
    )",
    // User accounts; role is 'user' or 'admin'
    "CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY NOT NULL,
        username TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        role TEXT NOT NULL,
        created_at BIGINT NOT NULL
    )",
    // List metadata; ordering lives entirely in entries.rank
    "CREATE TABLE IF NOT EXISTS lists (
        id TEXT PRIMARY KEY NOT NULL,
        owner_id TEXT NOT NULL,
        name TEXT NOT NULL,
        created_at BIGINT NOT NULL
    )",
    // Ranked entries
    // active is stored as 0/1 BIGINT for portability
    "CREATE TABLE IF NOT EXISTS entries (
        id TEXT PRIMARY KEY NOT NULL,
        list_id TEXT NOT NULL,
        owner_id TEXT NOT NULL,
        rank TEXT NOT NULL,
        message TEXT NOT NULL,
        active BIGINT NOT NULL DEFAULT 1,
        created_at BIGINT NOT NULL
    )",
];

/// SQL statements to create indexes.
pub const CREATE_INDEXES: &[&str] = &[
    // Ordered reads of one list
    "CREATE INDEX IF NOT EXISTS idx_entries_list_rank ON entries(list_id, rank)",
    // Role-scoped listing
    "CREATE INDEX IF NOT EXISTS idx_lists_owner ON lists(owner_id)",
    "CREATE INDEX IF NOT EXISTS idx_entries_owner ON entries(owner_id)",
];

/// Initialize the database schema.
///
/// Creates tables, records or upgrades the schema version, then creates
/// indexes. Safe to run on every connect.
pub async fn initialize(backend: &SqlxBackend) -> Result<()> {
    let pool = backend.pool();

    for statement in CREATE_TABLES {
        sqlx::query(statement)
            .execute(pool)
            .await
            .sql_context(&format!("Schema creation failed for `{statement}`"))?;
    }

    let stored: Option<(i64,)> = sqlx::query_as("SELECT version FROM schema_version")
        .fetch_optional(pool)
        .await
        .sql_context("Failed to check schema version")?;

    match stored {
        None => {
            sqlx::query("INSERT INTO schema_version (version) VALUES ($1)")
                .bind(SCHEMA_VERSION)
                .execute(pool)
                .await
                .sql_context("Failed to record schema version")?;
            tracing::debug!(version = SCHEMA_VERSION, "initialized SQL schema");
        }
        Some((version,)) if version < SCHEMA_VERSION => {
            migrate(backend, version, SCHEMA_VERSION).await?;
        }
        Some((version,)) if version > SCHEMA_VERSION => {
            return Err(BackendError::StateInconsistency {
                reason: format!(
                    "database schema v{version} is newer than supported v{SCHEMA_VERSION}"
                ),
            }
            .into());
        }
        Some(_) => {}
    }

    for statement in CREATE_INDEXES {
        sqlx::query(statement)
            .execute(pool)
            .await
            .sql_context(&format!("Index creation failed for `{statement}`"))?;
    }

    Ok(())
}

/// Step the schema from `from` to `to`, one version at a time, recording
/// each completed step.
async fn migrate(backend: &SqlxBackend, from: i64, to: i64) -> Result<()> {
    tracing::info!(from, to, "Starting SQL schema migration");

    for current in from..to {
        let next = current + 1;
        run_migration(backend, current).await?;

        sqlx::query("UPDATE schema_version SET version = $1")
            .bind(next)
            .execute(backend.pool())
            .await
            .sql_context(&format!("Failed to update schema version to {next}"))?;

        tracing::info!(version = next, "Migration completed");
    }

    Ok(())
}

/// Execute the migration that upgrades a schema at version `from`.
///
/// Add one match arm per `migrate_vN_to_vM` function when bumping
/// [`SCHEMA_VERSION`].
async fn run_migration(backend: &SqlxBackend, from: i64) -> Result<()> {
    // v1 is the first released layout; nothing to dispatch to yet.
    Err(BackendError::StateInconsistency {
        reason: format!(
            "no migration from schema v{from} ({:?}); SCHEMA_VERSION was bumped without one",
            backend.kind()
        ),
    }
    .into())
}
