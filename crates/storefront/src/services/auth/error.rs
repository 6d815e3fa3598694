//! Authentication error types.

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::storage::StorageError;

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] vitrine_core::EmailError),

    /// A required form field was left blank.
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Wrong email or password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Stored token no longer yields a profile.
    #[error("session expired")]
    SessionExpired,

    /// The catalog refused to create the account.
    #[error("registration failed: {0}")]
    Registration(#[source] CatalogError),

    /// Catalog request failed.
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Token could not be stored or removed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl AuthError {
    /// Message safe to show to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidEmail(_) => "Invalid email address".to_string(),
            Self::MissingField(_) => "Please fill in all fields".to_string(),
            Self::WeakPassword(msg) => msg.clone(),
            Self::InvalidCredentials => "Invalid email or password".to_string(),
            Self::SessionExpired => "Authentication failed".to_string(),
            Self::Registration(_) => "Registration failed".to_string(),
            Self::Catalog(_) => "External service error".to_string(),
            Self::Storage(_) => "Internal error".to_string(),
        }
    }
}
