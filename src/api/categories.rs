//! Category endpoints. Reads are public; writes need an admin.

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;

use super::extract::{ApiJson, ApiPath, ApiQuery};
use super::{ApiError, AppState, CategoryDto, Page, SearchQuery, paged};
use crate::domain::{Action, Caller, Resource, authorize};
use crate::services::CatalogError;

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(what) => Self::NotFound(format!("{what} not found")),
            CatalogError::Validation(msg) => Self::validation(msg),
            CatalogError::Conflict(msg) => Self::Conflict(msg),
            CatalogError::Database(msg) => Self::DatabaseError(msg),
            CatalogError::Internal(msg) => Self::internal(msg),
        }
    }
}

/// GET /categories
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> Result<Json<Page<CategoryDto>>, ApiError> {
    let page = state.page_request(query.page);
    let slice = state
        .catalog_service()
        .list_categories(query.search.as_deref(), page)
        .await?;
    paged(slice, page)
}

/// POST /categories
pub async fn create_category(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    payload: Result<ApiJson<CategoryDto>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&caller, Action::Create, Resource::Category)?;
    let ApiJson(payload) = payload?;
    let category = state.catalog_service().create_category(payload).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// DELETE /categories/{slug}
pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    ApiPath(slug): ApiPath<String>,
) -> Result<StatusCode, ApiError> {
    authorize(&caller, Action::Delete, Resource::Category)?;
    state.catalog_service().delete_category(&slug).await?;
    Ok(StatusCode::NO_CONTENT)
}
