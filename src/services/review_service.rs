//! Domain service for reviews and their comments.
//!
//! Every operation is addressed by the full path (title, review, comment);
//! a child that does not belong to the given parent is reported as missing.
//! Permission checks happen in the HTTP layer, which uses
//! [`ReviewService::review_author`] and [`ReviewService::comment_author`] to
//! learn the stored owner.

use thiserror::Error;

use crate::api::types::{
    CommentDto, CreateCommentRequest, CreateReviewRequest, ReviewDto, UpdateCommentRequest,
    UpdateReviewRequest,
};
use crate::db::{PageRequest, PageSlice, unique_violation, unique_violation_db};
use crate::domain::{FieldError, Principal};

/// Errors specific to review and comment operations.
#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("{0} not found")]
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

impl From<FieldError> for ReviewError {
    fn from(err: FieldError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<sea_orm::DbErr> for ReviewError {
    fn from(err: sea_orm::DbErr) -> Self {
        unique_violation_db(&err).map_or_else(|| Self::Database(err.to_string()), Self::Conflict)
    }
}

impl From<anyhow::Error> for ReviewError {
    fn from(err: anyhow::Error) -> Self {
        unique_violation(&err).map_or_else(|| Self::Internal(err.to_string()), Self::Conflict)
    }
}

/// Domain service trait for reviews and comments.
#[async_trait::async_trait]
pub trait ReviewService: Send + Sync {
    // Reviews

    async fn list_reviews(
        &self,
        title_id: i32,
        page: PageRequest,
    ) -> Result<PageSlice<ReviewDto>, ReviewError>;

    async fn get_review(&self, title_id: i32, review_id: i32) -> Result<ReviewDto, ReviewError>;

    async fn review_author(&self, title_id: i32, review_id: i32) -> Result<i32, ReviewError>;

    /// # Errors
    ///
    /// Returns [`ReviewError::Conflict`] if `author` already reviewed the title.
    async fn create_review(
        &self,
        title_id: i32,
        author: &Principal,
        request: CreateReviewRequest,
    ) -> Result<ReviewDto, ReviewError>;

    async fn update_review(
        &self,
        title_id: i32,
        review_id: i32,
        request: UpdateReviewRequest,
    ) -> Result<ReviewDto, ReviewError>;

    async fn delete_review(&self, title_id: i32, review_id: i32) -> Result<(), ReviewError>;

    // Comments

    async fn list_comments(
        &self,
        title_id: i32,
        review_id: i32,
        page: PageRequest,
    ) -> Result<PageSlice<CommentDto>, ReviewError>;

    async fn get_comment(
        &self,
        title_id: i32,
        review_id: i32,
        comment_id: i32,
    ) -> Result<CommentDto, ReviewError>;

    async fn comment_author(
        &self,
        title_id: i32,
        review_id: i32,
        comment_id: i32,
    ) -> Result<i32, ReviewError>;

    async fn create_comment(
        &self,
        title_id: i32,
        review_id: i32,
        author: &Principal,
        request: CreateCommentRequest,
    ) -> Result<CommentDto, ReviewError>;

    async fn update_comment(
        &self,
        title_id: i32,
        review_id: i32,
        comment_id: i32,
        request: UpdateCommentRequest,
    ) -> Result<CommentDto, ReviewError>;

    async fn delete_comment(
        &self,
        title_id: i32,
        review_id: i32,
        comment_id: i32,
    ) -> Result<(), ReviewError>;
}
