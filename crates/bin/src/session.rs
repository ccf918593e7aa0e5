//! Session management for the HTTP API
//!
//! Provides in-memory session storage mapping bearer tokens to user IDs.
//! Sessions expire after a fixed lifetime and are lost on server restart.

use std::{collections::HashMap, sync::Arc};

use lexlist::{Clock, UserId};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Bearer token handed out by `/api/token`
pub type SessionToken = String;

#[derive(Debug, Clone, Copy)]
struct Session {
    user_id: UserId,
    expires_at: i64,
}

/// In-memory session store
///
/// Only the user ID is kept; the role is re-read on every request so role
/// changes apply to existing tokens.
#[derive(Clone, Debug)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<SessionToken, Session>>>,
    clock: Arc<dyn Clock>,
    ttl_secs: i64,
}

impl SessionStore {
    /// Create a new empty session store
    pub fn new(clock: Arc<dyn Clock>, ttl_minutes: u64) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            clock,
            ttl_secs: i64::try_from(ttl_minutes.saturating_mul(60)).unwrap_or(i64::MAX),
        }
    }

    /// Token lifetime in seconds.
    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    /// Create a new session for a user
    ///
    /// Generates a random UUID token. Expired sessions are purged on the way.
    pub async fn create_session(&self, user_id: UserId) -> SessionToken {
        let token = Uuid::new_v4().to_string();
        let now = self.clock.now_secs();
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, s| s.expires_at > now);
        sessions.insert(
            token.clone(),
            Session {
                user_id,
                expires_at: now.saturating_add(self.ttl_secs),
            },
        );
        token
    }

    /// Get the user behind a token, or None if unknown or expired
    pub async fn get_user(&self, token: &str) -> Option<UserId> {
        let now = self.clock.now_secs();
        {
            let sessions = self.sessions.read().await;
            match sessions.get(token) {
                Some(session) if session.expires_at > now => return Some(session.user_id),
                Some(_) => {}
                None => return None,
            }
        }

        tracing::debug!("session expired");
        self.destroy_session(token).await;
        None
    }

    /// Destroy a session
    pub async fn destroy_session(&self, token: &str) {
        let mut sessions = self.sessions.write().await;
        sessions.remove(token);
    }

    /// Get the number of stored sessions (for debugging)
    pub async fn session_count(&self) -> usize {
        let sessions = self.sessions.read().await;
        sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use lexlist::FixedClock;

    use super::*;

    #[tokio::test]
    async fn sessions_expire() {
        let clock = Arc::new(FixedClock::new(1_000));
        let store = SessionStore::new(clock.clone(), 5);
        let user = UserId::generate();

        let token = store.create_session(user).await;
        assert_eq!(store.get_user(&token).await, Some(user));

        clock.advance(299);
        assert_eq!(store.get_user(&token).await, Some(user));

        clock.advance(1);
        assert_eq!(store.get_user(&token).await, None);
        assert_eq!(store.session_count().await, 0);
    }

    #[tokio::test]
    async fn unknown_and_destroyed_tokens() {
        let store = SessionStore::new(Arc::new(FixedClock::default()), 60);
        assert_eq!(store.get_user("nope").await, None);

        let token = store.create_session(UserId::generate()).await;
        store.destroy_session(&token).await;
        assert_eq!(store.get_user(&token).await, None);
    }

    #[tokio::test]
    async fn creating_a_session_purges_expired_ones() {
        let clock = Arc::new(FixedClock::new(0));
        let store = SessionStore::new(clock.clone(), 1);
        store.create_session(UserId::generate()).await;
        clock.advance(120);
        store.create_session(UserId::generate()).await;
        assert_eq!(store.session_count().await, 1);
    }
}
