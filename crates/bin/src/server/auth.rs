//! Bearer token extraction.

use axum::extract::FromRequestParts;
use axum::http::header::{AUTHORIZATION, HeaderMap};
use axum::http::request::Parts;
use lexlist::user::Caller;

use super::AppState;
use super::error::ApiError;

/// The caller behind a valid bearer token.
///
/// The role is read from storage on every request.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Caller);

impl FromRequestParts<AppState> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let token = extract_bearer_token(&parts.headers)
            .ok_or_else(|| ApiError::unauthorized("Bearer token required"))?;

        let user_id = state
            .sessions
            .get_user(&token)
            .await
            .ok_or_else(|| ApiError::unauthorized("Invalid or expired token"))?;

        match state.store.caller_for(&user_id).await {
            Ok(caller) => Ok(Self(caller)),
            Err(e) if e.is_not_found() => {
                state.sessions.destroy_session(&token).await;
                Err(ApiError::unauthorized("Invalid or expired token"))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Extract a bearer token with HTTP-standard tolerance: case-insensitive
/// scheme, surrounding whitespace trimmed.
pub(crate) fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let (scheme, token) = auth.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}
