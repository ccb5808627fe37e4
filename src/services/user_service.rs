//! Domain service for account administration and self-service profiles.

use thiserror::Error;

use crate::api::types::{CreateUserRequest, UpdateUserRequest, UserDto};
use crate::db::{PageRequest, PageSlice, unique_violation, unique_violation_db};
use crate::domain::{FieldError, Principal};

/// Errors specific to user operations.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<FieldError> for UserError {
    fn from(err: FieldError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<sea_orm::DbErr> for UserError {
    fn from(err: sea_orm::DbErr) -> Self {
        unique_violation_db(&err).map_or_else(|| Self::Database(err.to_string()), Self::Conflict)
    }
}

impl From<anyhow::Error> for UserError {
    fn from(err: anyhow::Error) -> Self {
        unique_violation(&err).map_or_else(|| Self::Internal(err.to_string()), Self::Conflict)
    }
}

/// Domain service trait for users.
#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    /// Lists accounts ordered by username, optionally filtered by a
    /// username substring.
    async fn list(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<PageSlice<UserDto>, UserError>;

    async fn create(&self, request: CreateUserRequest) -> Result<UserDto, UserError>;

    async fn get(&self, username: &str) -> Result<UserDto, UserError>;

    /// Admin update; any field including the role may change.
    async fn update(&self, username: &str, request: UpdateUserRequest)
    -> Result<UserDto, UserError>;

    /// Deletes the account together with its reviews and comments.
    async fn delete(&self, username: &str) -> Result<(), UserError>;

    async fn get_me(&self, caller: &Principal) -> Result<UserDto, UserError>;

    /// Self-service update. The stored role is kept whatever the request says.
    async fn update_me(
        &self,
        caller: &Principal,
        request: UpdateUserRequest,
    ) -> Result<UserDto, UserError>;
}
