use std::sync::Arc;

use lexlist::{
    Error, FixedClock, ListId, Scope, Store, UserId,
    backend::{BackendImpl, database::InMemory},
    list::{Entry, List, ListConfig, ListManager},
    rank::Rank,
    user::Role,
};

// ==========================
// CORE TEST FACTORIES
// ==========================
// Single point of change for backend matrix testing via TEST_BACKEND.

/// Creates a test backend based on TEST_BACKEND env var.
///
/// Supported values:
/// - "inmemory" or unset: InMemory backend (default)
/// - "sqlite": SQLite in-memory backend (requires `sqlite` feature)
/// - "postgres": PostgreSQL backend in an isolated schema (requires
///   `postgres` feature and TEST_POSTGRES_URL)
///
/// # Example
/// ```bash
/// TEST_BACKEND=sqlite cargo test
/// TEST_BACKEND=postgres TEST_POSTGRES_URL="postgres://localhost/lexlist_test" cargo test
/// ```
pub async fn test_backend() -> Box<dyn BackendImpl> {
    match std::env::var("TEST_BACKEND").as_deref() {
        Ok("sqlite") => {
            #[cfg(feature = "sqlite")]
            {
                use lexlist::backend::database::Sqlite;
                Box::new(
                    Sqlite::sqlite_in_memory()
                        .await
                        .expect("Failed to create SQLite backend"),
                )
            }
            #[cfg(not(feature = "sqlite"))]
            {
                panic!("TEST_BACKEND=sqlite requires the 'sqlite' feature to be enabled")
            }
        }
        Ok("postgres") => {
            #[cfg(feature = "postgres")]
            {
                use lexlist::backend::database::Postgres;
                let url = std::env::var("TEST_POSTGRES_URL")
                    .unwrap_or_else(|_| "postgres://localhost/lexlist_test".to_string());
                Box::new(
                    Postgres::connect_postgres_isolated(&url)
                        .await
                        .expect("Failed to connect to PostgreSQL"),
                )
            }
            #[cfg(not(feature = "postgres"))]
            {
                panic!("TEST_BACKEND=postgres requires the 'postgres' feature to be enabled")
            }
        }
        Ok("inmemory") | Err(_) => Box::new(InMemory::new()),
        Ok(other) => panic!("Unknown TEST_BACKEND '{other}'"),
    }
}

/// Store over [`test_backend`] with a pinned clock.
pub async fn test_store() -> Store {
    test_store_with(ListConfig::default()).await
}

pub async fn test_store_with(config: ListConfig) -> Store {
    Store::open_with_clock(test_backend().await, Arc::new(FixedClock::default()), config)
}

/// List manager sharing the store's backend and clock.
pub fn manager(store: &Store, config: ListConfig) -> ListManager {
    ListManager::new(store.backend().clone(), store.clock().clone(), config)
}

/// Register `username` and return a scope bound to them.
pub async fn user_scope(store: &Store, username: &str, role: Role) -> Scope {
    let user = store
        .create_user(username, "test-password", role)
        .await
        .expect("Failed to create user");
    store.scope(user.caller())
}

/// Store a list owned by a fresh user id, straight through the backend.
pub async fn seeded_list(backend: &dyn BackendImpl) -> List {
    let list = List::new(UserId::generate(), "seeded", 0);
    backend
        .put_list(list.clone())
        .await
        .expect("Failed to store list");
    list
}

/// Write entries with explicit ranks, bypassing the list manager.
pub async fn seed_entries(backend: &dyn BackendImpl, list: &List, specs: &[(&str, &str)]) -> Vec<Entry> {
    let mut txn = backend.begin(&list.id).await.expect("Failed to begin");
    let mut entries = Vec::new();
    for (message, rank) in specs {
        let mut entry = Entry::new(list.id, list.owner_id, *message, 0);
        entry.rank = Rank::parse(*rank).expect("invalid seed rank");
        txn.save_entry(&entry).await.expect("Failed to save entry");
        entries.push(entry);
    }
    txn.commit().await.expect("Failed to commit");
    entries
}

/// Messages of `list` in rank order.
pub async fn messages(backend: &dyn BackendImpl, list: &ListId) -> Vec<String> {
    backend
        .ordered_entries(list)
        .await
        .expect("Failed to load entries")
        .into_iter()
        .map(|e| e.message)
        .collect()
}

/// Ranks of `list` in order.
pub async fn ranks(backend: &dyn BackendImpl, list: &ListId) -> Vec<String> {
    backend
        .ordered_entries(list)
        .await
        .expect("Failed to load entries")
        .into_iter()
        .map(|e| e.rank.to_string())
        .collect()
}

/// Run `op` until it succeeds or fails with something other than a
/// transaction conflict.
pub async fn retry_on_conflict<T, F, Fut>(mut op: F) -> Result<T, Error>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, Error>>,
{
    loop {
        match op().await {
            Err(e) if e.is_conflict() => tokio::task::yield_now().await,
            other => return other,
        }
    }
}
