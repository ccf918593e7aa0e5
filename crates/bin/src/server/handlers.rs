//! Route handlers.
//!
//! Each handler resolves the caller, calls one `Store`/`Scope` operation and
//! converts the result. Access rules live in the library.

use axum::{
    Form, Json,
    extract::{Path, State},
    http::StatusCode,
};
use lexlist::{
    EntryId, ListId, ListView, UserId, UserUpdate,
    list::{Entry, IndexedEntry, List},
    user::Role,
};

use super::auth::Authenticated;
use super::error::ApiError;
use super::{AppState, backend_name};
use crate::api::{
    CreateEntryRequest, HealthResponse, ListNameRequest, LoginForm, RegisterRequest,
    ReorderRequest, TokenResponse, UpdateEntryRequest, UserInfo,
};

type ApiResult<T> = Result<T, ApiError>;

// ============================================================================
// Health and accounts
// ============================================================================

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        backend: backend_name(&state.store).to_string(),
    })
}

/// Self-service registration; always creates a plain user.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<UserInfo>)> {
    let user = state
        .store
        .create_user(&body.username, &body.password, Role::User)
        .await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> ApiResult<Json<TokenResponse>> {
    let user = state
        .store
        .authenticate(&form.username, &form.password)
        .await?;
    let token = state.sessions.create_session(user.id).await;
    let sessions = state.sessions.session_count().await;
    tracing::info!(
        user_id = %user.id,
        username = %user.username,
        sessions = sessions,
        "user logged in"
    );

    Ok(Json(TokenResponse {
        access_token: token,
        token_type: "bearer".to_string(),
        expires_in: state.sessions.ttl_secs(),
    }))
}

pub async fn me(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
) -> ApiResult<Json<UserInfo>> {
    let user = state.store.backend().get_user(&caller.user_id).await?;
    Ok(Json(user.into()))
}

pub async fn update_user(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Path(id): Path<UserId>,
    Json(update): Json<UserUpdate>,
) -> ApiResult<Json<UserInfo>> {
    let user = state.store.update_user(&caller, &id, update).await?;
    Ok(Json(user.into()))
}

// ============================================================================
// Lists
// ============================================================================

pub async fn list_lists(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
) -> ApiResult<Json<Vec<List>>> {
    Ok(Json(state.store.scope(caller).lists().await?))
}

pub async fn create_list(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Json(body): Json<ListNameRequest>,
) -> ApiResult<(StatusCode, Json<List>)> {
    let list = state.store.scope(caller).create_list(&body.name).await?;
    Ok((StatusCode::CREATED, Json(list)))
}

pub async fn get_list(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Path(id): Path<ListId>,
) -> ApiResult<Json<ListView>> {
    Ok(Json(state.store.scope(caller).get_list(&id).await?))
}

pub async fn rename_list(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Path(id): Path<ListId>,
    Json(body): Json<ListNameRequest>,
) -> ApiResult<Json<List>> {
    Ok(Json(
        state.store.scope(caller).rename_list(&id, &body.name).await?,
    ))
}

pub async fn delete_list(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Path(id): Path<ListId>,
) -> ApiResult<StatusCode> {
    state.store.scope(caller).delete_list(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn reorder(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Path(id): Path<ListId>,
    Json(body): Json<ReorderRequest>,
) -> ApiResult<(StatusCode, Json<Vec<IndexedEntry>>)> {
    let entries = state
        .store
        .scope(caller)
        .reorder(&id, &body.entry_id, body.index)
        .await?;
    Ok((StatusCode::CREATED, Json(entries)))
}

pub async fn rebalance(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Path(id): Path<ListId>,
) -> ApiResult<Json<Vec<IndexedEntry>>> {
    Ok(Json(state.store.scope(caller).rebalance(&id).await?))
}

// ============================================================================
// Entries
// ============================================================================

pub async fn list_entries(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
) -> ApiResult<Json<Vec<Entry>>> {
    Ok(Json(state.store.scope(caller).entries().await?))
}

pub async fn create_entry(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Json(body): Json<CreateEntryRequest>,
) -> ApiResult<(StatusCode, Json<Entry>)> {
    let entry = state
        .store
        .scope(caller)
        .create_entry(&body.list_id, &body.message, body.index)
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn get_entry(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Path(id): Path<EntryId>,
) -> ApiResult<Json<Entry>> {
    Ok(Json(state.store.scope(caller).get_entry(&id).await?))
}

pub async fn update_entry(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Path(id): Path<EntryId>,
    Json(body): Json<UpdateEntryRequest>,
) -> ApiResult<Json<Entry>> {
    Ok(Json(
        state
            .store
            .scope(caller)
            .update_entry(&id, &body.message)
            .await?,
    ))
}

pub async fn delete_entry(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Path(id): Path<EntryId>,
) -> ApiResult<StatusCode> {
    state.store.scope(caller).delete_entry(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn toggle_entry(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Path(id): Path<EntryId>,
) -> ApiResult<Json<Entry>> {
    Ok(Json(state.store.scope(caller).toggle_entry(&id).await?))
}
