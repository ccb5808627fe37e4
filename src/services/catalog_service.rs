//! Domain service for the catalog: categories, genres and titles.
//!
//! Titles reference their category and genres by slug on the way in and
//! embed them on the way out, together with the current rating.

use thiserror::Error;

use crate::api::types::{
    CategoryDto, CreateTitleRequest, GenreDto, TitleDto, TitleQuery, UpdateTitleRequest,
};
use crate::db::{PageRequest, PageSlice, unique_violation, unique_violation_db};
use crate::domain::FieldError;

/// Errors specific to catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
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

impl From<FieldError> for CatalogError {
    fn from(err: FieldError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<sea_orm::DbErr> for CatalogError {
    fn from(err: sea_orm::DbErr) -> Self {
        unique_violation_db(&err).map_or_else(|| Self::Database(err.to_string()), Self::Conflict)
    }
}

impl From<anyhow::Error> for CatalogError {
    fn from(err: anyhow::Error) -> Self {
        unique_violation(&err).map_or_else(|| Self::Internal(err.to_string()), Self::Conflict)
    }
}

/// Domain service trait for the catalog.
#[async_trait::async_trait]
pub trait CatalogService: Send + Sync {
    // Categories

    async fn list_categories(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<PageSlice<CategoryDto>, CatalogError>;

    async fn create_category(&self, category: CategoryDto) -> Result<CategoryDto, CatalogError>;

    /// Titles in the category survive with no category.
    async fn delete_category(&self, slug: &str) -> Result<(), CatalogError>;

    // Genres

    async fn list_genres(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<PageSlice<GenreDto>, CatalogError>;

    async fn create_genre(&self, genre: GenreDto) -> Result<GenreDto, CatalogError>;

    async fn delete_genre(&self, slug: &str) -> Result<(), CatalogError>;

    // Titles

    async fn list_titles(
        &self,
        query: &TitleQuery,
        page: PageRequest,
    ) -> Result<PageSlice<TitleDto>, CatalogError>;

    async fn get_title(&self, id: i32) -> Result<TitleDto, CatalogError>;

    /// # Errors
    ///
    /// Returns [`CatalogError::Validation`] for unknown genre or category
    /// slugs and for years in the future.
    async fn create_title(&self, request: CreateTitleRequest) -> Result<TitleDto, CatalogError>;

    async fn update_title(
        &self,
        id: i32,
        request: UpdateTitleRequest,
    ) -> Result<TitleDto, CatalogError>;

    /// Removes the title with its reviews, their comments and genre links.
    async fn delete_title(&self, id: i32) -> Result<(), CatalogError>;
}
