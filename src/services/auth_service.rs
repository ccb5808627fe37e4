//! Domain service for signup and access token issuance.
//!
//! Accounts are passwordless: signup mails a confirmation code, and the code
//! is exchanged for a signed access token.

use serde::Serialize;
use thiserror::Error;

use crate::db::{unique_violation, unique_violation_db};
use crate::domain::{FieldError, Principal};

pub const SIGNUP_SUBJECT: &str = "YaMDb registration";

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("User not found")]
    UserNotFound,

    #[error("Invalid confirmation code")]
    InvalidCode,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<FieldError> for AuthError {
    fn from(err: FieldError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        unique_violation_db(&err).map_or_else(|| Self::Database(err.to_string()), Self::Conflict)
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        unique_violation(&err).map_or_else(|| Self::Internal(err.to_string()), Self::Conflict)
    }
}

/// Echo of a successful signup. The confirmation code only travels by mail.
#[derive(Debug, Clone, Serialize)]
pub struct SignupResult {
    pub username: String,
    pub email: String,
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Registers `username`/`email` (or re-issues a code to the existing
    /// account holding exactly that pair) and mails a fresh confirmation code.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] for malformed or reserved input and
    /// [`AuthError::Conflict`] when either value belongs to another account.
    async fn signup(&self, username: &str, email: &str) -> Result<SignupResult, AuthError>;

    /// Exchanges a confirmation code for an access token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::UserNotFound`] for unknown usernames and
    /// [`AuthError::InvalidCode`] when the code does not match.
    async fn issue_token(&self, username: &str, confirmation_code: &str)
    -> Result<String, AuthError>;

    /// Resolves a bearer token to the current state of its user.
    async fn authenticate(&self, token: &str) -> Result<Principal, AuthError>;
}
