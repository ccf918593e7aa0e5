//! Application facade over a backend.
//!
//! [`Store`] owns the backend, the clock and the [`ListManager`] and handles
//! accounts. Everything touching lists and entries goes through a
//! [`Scope`], which is a `Store` bound to one authenticated [`Caller`] and
//! filters every row by what that caller may see.

mod scope;

use std::sync::Arc;

use handle_trait::Handle;
use serde::{Deserialize, Serialize};

use crate::backend::{BackendError, BackendImpl};
use crate::clock::{Clock, SystemClock};
use crate::ids::UserId;
use crate::list::{ListConfig, ListManager};
use crate::user::{Caller, Role, User, UserError, crypto, validate_password, validate_username};
use crate::{Error, Result};

pub use scope::{ListView, Scope};

/// Changes a caller may request to a user account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserUpdate {
    /// New password; only the account holder may set it.
    #[serde(default)]
    pub password: Option<String>,
    /// New role; only admins may set it.
    #[serde(default)]
    pub role: Option<Role>,
}

/// Shared handle to the application state.
///
/// Cheap to clone; every clone talks to the same backend.
///
/// ```
/// # use lexlist::{Store, backend::database::InMemory, list::ListConfig, user::Role};
/// # #[tokio::main]
/// # async fn main() -> lexlist::Result<()> {
/// let store = Store::open(Box::new(InMemory::new()), ListConfig::default());
/// let alice = store.create_user("alice", "hunter22", Role::User).await?;
///
/// let scope = store.scope(alice.caller());
/// let list = scope.create_list("groceries").await?;
/// scope.create_entry(&list.id, "milk", None).await?;
/// scope.create_entry(&list.id, "eggs", Some(0)).await?;
///
/// let view = scope.get_list(&list.id).await?;
/// assert_eq!(view.entries[0].entry.message, "eggs");
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Handle)]
pub struct Store {
    inner: Arc<StoreInternal>,
}

struct StoreInternal {
    backend: Arc<dyn BackendImpl>,
    clock: Arc<dyn Clock>,
    lists: ListManager,
}

impl std::fmt::Debug for StoreInternal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreInternal")
            .field("clock", &self.clock)
            .field("lists", &self.lists)
            .finish_non_exhaustive()
    }
}

impl Store {
    /// Wrap `backend` using the system clock.
    pub fn open(backend: Box<dyn BackendImpl>, config: ListConfig) -> Self {
        Self::open_impl(backend, Arc::new(SystemClock), config)
    }

    /// Same as [`Store::open`] with an injected clock for deterministic
    /// timestamps.
    ///
    /// Only available with the `testing` feature or in test builds.
    #[cfg(any(test, feature = "testing"))]
    pub fn open_with_clock(
        backend: Box<dyn BackendImpl>,
        clock: Arc<dyn Clock>,
        config: ListConfig,
    ) -> Self {
        Self::open_impl(backend, clock, config)
    }

    fn open_impl(backend: Box<dyn BackendImpl>, clock: Arc<dyn Clock>, config: ListConfig) -> Self {
        let backend: Arc<dyn BackendImpl> = Arc::from(backend);
        let lists = ListManager::new(backend.clone(), clock.clone(), config);
        Self {
            inner: Arc::new(StoreInternal {
                backend,
                clock,
                lists,
            }),
        }
    }

    /// The underlying backend.
    pub fn backend(&self) -> &Arc<dyn BackendImpl> {
        &self.inner.backend
    }

    /// The clock used for row timestamps.
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.inner.clock
    }

    /// The ordered list manager.
    pub fn lists(&self) -> &ListManager {
        &self.inner.lists
    }

    /// Bind this store to an authenticated caller.
    pub fn scope(&self, caller: Caller) -> Scope {
        Scope::new(self.handle(), caller)
    }

    // === Users ===

    /// Register a new account.
    ///
    /// # Errors
    /// [`UserError::UsernameAlreadyExists`] if the name is taken, or a
    /// validation error for a malformed username or short password.
    pub async fn create_user(&self, username: &str, password: &str, role: Role) -> Result<User> {
        validate_username(username)?;
        validate_password(password)?;

        if self.backend().find_user_by_name(username).await?.is_some() {
            return Err(UserError::UsernameAlreadyExists {
                username: username.to_string(),
            }
            .into());
        }

        let user = User {
            id: UserId::generate(),
            username: username.to_string(),
            password_hash: crypto::hash_password(password)?,
            role,
            created_at: self.clock().now_secs(),
        };
        self.put_user(user.clone()).await?;

        tracing::info!(user_id = %user.id, username, %role, "created user");
        Ok(user)
    }

    /// Create `username` as an admin unless an account with that name exists.
    pub async fn ensure_admin(&self, username: &str, password: &str) -> Result<User> {
        match self.backend().find_user_by_name(username).await? {
            Some(existing) => {
                if existing.role != Role::Admin {
                    tracing::warn!(username, "bootstrap admin name is held by a non-admin user");
                }
                Ok(existing)
            }
            None => self.create_user(username, password, Role::Admin).await,
        }
    }

    /// Check a username/password pair.
    ///
    /// Unknown users and wrong passwords produce the same error.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User> {
        let Some(user) = self.backend().find_user_by_name(username).await? else {
            tracing::debug!(username, "login for unknown user");
            return Err(UserError::InvalidPassword.into());
        };
        crypto::verify_password(password, &user.password_hash)?;
        Ok(user)
    }

    /// Resolve a user ID to its current identity and role.
    pub async fn caller_for(&self, user_id: &UserId) -> Result<Caller> {
        Ok(self.backend().get_user(user_id).await?.caller())
    }

    /// Apply `update` to user `id` on behalf of `caller`.
    ///
    /// Passwords may only be changed by their owner, roles only by admins.
    /// Non-admins cannot see other accounts at all.
    pub async fn update_user(&self, caller: &Caller, id: &UserId, update: UserUpdate) -> Result<User> {
        if !caller.can_access(id) {
            return Err(BackendError::UserNotFound { id: *id }.into());
        }
        let mut user = self.backend().get_user(id).await?;

        if let Some(password) = update.password {
            if caller.user_id != *id {
                return Err(UserError::NotOwner {
                    user_id: caller.user_id,
                    field: "password",
                }
                .into());
            }
            validate_password(&password)?;
            user.password_hash = crypto::hash_password(&password)?;
        }

        if let Some(role) = update.role {
            if !caller.is_admin() {
                return Err(UserError::InsufficientPermissions.into());
            }
            user.role = role;
        }

        self.put_user(user.clone()).await?;
        tracing::info!(user_id = %user.id, by = %caller.user_id, "updated user");
        Ok(user)
    }

    async fn put_user(&self, user: User) -> Result<()> {
        let username = user.username.clone();
        self.backend().put_user(user).await.map_err(|e| match e {
            Error::Backend(BackendError::DuplicateUsername { .. }) => {
                UserError::UsernameAlreadyExists { username }.into()
            }
            other => other,
        })
    }
}
