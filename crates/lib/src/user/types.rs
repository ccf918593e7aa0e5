//! Core data types for the user system

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::UserError;
use crate::ids::UserId;

/// Longest accepted username.
pub const MAX_USERNAME_LENGTH: usize = 64;

/// Shortest accepted password.
pub const MIN_PASSWORD_LENGTH: usize = 4;

/// Account role.
///
/// Admins see and modify every list and entry; users only their own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// A stored user account.
///
/// The username is the login identifier and must be unique.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,

    /// Unique username (login identifier)
    pub username: String,

    /// Password hash (Argon2id, PHC string)
    pub password_hash: String,

    pub role: Role,

    /// Account creation timestamp (Unix timestamp)
    pub created_at: i64,
}

impl User {
    /// The identity and role of this user for access checks.
    pub fn caller(&self) -> Caller {
        Caller {
            user_id: self.id,
            username: self.username.clone(),
            role: self.role,
        }
    }
}

/// The authenticated identity behind a request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub user_id: UserId,
    pub username: String,
    pub role: Role,
}

impl Caller {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// True if this caller may see rows owned by `owner_id`.
    pub fn can_access(&self, owner_id: &UserId) -> bool {
        self.is_admin() || self.user_id == *owner_id
    }
}

/// Check a username against the accepted character set and length.
pub fn validate_username(username: &str) -> Result<(), UserError> {
    let valid = !username.is_empty()
        && username.len() <= MAX_USERNAME_LENGTH
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(UserError::InvalidUsername {
            max: MAX_USERNAME_LENGTH,
        })
    }
}

/// Check a new password's length.
pub fn validate_password(password: &str) -> Result<(), UserError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(UserError::PasswordTooShort {
            min: MIN_PASSWORD_LENGTH,
        });
    }
    Ok(())
}
