//! Genre endpoints. Reads are public; writes need an admin.

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;

use super::extract::{ApiJson, ApiPath, ApiQuery};
use super::{ApiError, AppState, GenreDto, Page, SearchQuery, paged};
use crate::domain::{Action, Caller, Resource, authorize};

/// GET /genres
pub async fn list_genres(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> Result<Json<Page<GenreDto>>, ApiError> {
    let page = state.page_request(query.page);
    let slice = state
        .catalog_service()
        .list_genres(query.search.as_deref(), page)
        .await?;
    paged(slice, page)
}

/// POST /genres
pub async fn create_genre(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    payload: Result<ApiJson<GenreDto>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&caller, Action::Create, Resource::Genre)?;
    let ApiJson(payload) = payload?;
    let genre = state.catalog_service().create_genre(payload).await?;
    Ok((StatusCode::CREATED, Json(genre)))
}

/// DELETE /genres/{slug}
pub async fn delete_genre(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    ApiPath(slug): ApiPath<String>,
) -> Result<StatusCode, ApiError> {
    authorize(&caller, Action::Delete, Resource::Genre)?;
    state.catalog_service().delete_genre(&slug).await?;
    Ok(StatusCode::NO_CONTENT)
}
