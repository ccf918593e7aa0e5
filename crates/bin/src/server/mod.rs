//! HTTP API: shared state and routes.

mod auth;
mod error;
mod handlers;

use axum::{
    Router,
    routing::{get, post, put},
};
use lexlist::Store;

use crate::session::SessionStore;

/// Shared application state
#[derive(Clone, Debug)]
pub struct AppState {
    pub store: Store,
    pub sessions: SessionStore,
}

/// Build the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/users", post(handlers::register))
        .route("/api/token", post(handlers::login))
        .route("/api/users/me", get(handlers::me))
        .route("/api/users/{id}", put(handlers::update_user))
        .route(
            "/api/lists",
            get(handlers::list_lists).post(handlers::create_list),
        )
        .route(
            "/api/lists/{id}",
            get(handlers::get_list)
                .put(handlers::rename_list)
                .delete(handlers::delete_list),
        )
        .route("/api/lists/{id}/reorder", put(handlers::reorder))
        .route("/api/lists/{id}/rebalance", post(handlers::rebalance))
        .route(
            "/api/entries",
            get(handlers::list_entries).post(handlers::create_entry),
        )
        .route(
            "/api/entries/{id}",
            get(handlers::get_entry)
                .put(handlers::update_entry)
                .delete(handlers::delete_entry),
        )
        .route("/api/entries/{id}/toggle", put(handlers::toggle_entry))
        .with_state(state)
}

/// Name of the storage backend behind `store`.
pub fn backend_name(store: &Store) -> &'static str {
    use lexlist::backend::database::{DbKind, InMemory, SqlxBackend};

    let backend = store.backend();
    if let Some(sqlx) = backend.as_any().downcast_ref::<SqlxBackend>() {
        match sqlx.kind() {
            DbKind::Sqlite => "sqlite",
            DbKind::Postgres => "postgres",
        }
    } else if backend.as_any().is::<InMemory>() {
        "inmemory"
    } else {
        "unknown"
    }
}
