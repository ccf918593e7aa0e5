//! Error types for the user system
use thiserror::Error;

use crate::ids::UserId;

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum UserError {
    #[error("User not found: {username}")]
    UserNotFound { username: String },

    #[error("Username already exists: {username}")]
    UsernameAlreadyExists { username: String },

    #[error("Username must be 1-{max} characters of letters, digits, '-', '_' or '.'")]
    InvalidUsername { max: usize },

    #[error("Password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("Invalid username or password")]
    InvalidPassword,

    #[error("Password verification failed")]
    PasswordVerificationFailed,

    #[error("Password hashing failed: {reason}")]
    HashingFailed { reason: String },

    #[error("Operation requires admin permission")]
    InsufficientPermissions,

    #[error("User {user_id} may not modify another user's {field}")]
    NotOwner { user_id: UserId, field: &'static str },
}

impl UserError {
    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, UserError::UserNotFound { .. })
    }

    /// Check if this error means the supplied credentials were rejected.
    pub fn is_authentication_error(&self) -> bool {
        matches!(
            self,
            UserError::InvalidPassword | UserError::PasswordVerificationFailed
        )
    }

    /// Check if this error means the caller lacks a required role.
    pub fn is_permission_denied(&self) -> bool {
        matches!(
            self,
            UserError::InsufficientPermissions | UserError::NotOwner { .. }
        )
    }

    /// Check if this error comes from rejected input.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            UserError::InvalidUsername { .. } | UserError::PasswordTooShort { .. }
        )
    }

    /// Check if this error is a uniqueness conflict.
    pub fn is_conflict(&self) -> bool {
        matches!(self, UserError::UsernameAlreadyExists { .. })
    }
}

impl From<UserError> for crate::Error {
    fn from(err: UserError) -> Self {
        crate::Error::User(err)
    }
}
