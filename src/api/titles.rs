//! Title endpoints.
//!
//! Titles are written with genre and category slugs and read back with both
//! embedded, plus the mean review score as `rating`.

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;

use super::extract::{ApiJson, ApiPath, ApiQuery};
use super::{
    ApiError, AppState, CreateTitleRequest, Page, TitleDto, TitleQuery, UpdateTitleRequest, paged,
};
use crate::domain::{Action, Caller, Resource, authorize};

/// GET /titles
/// Filters: `category` and `genre` by slug, `name` by substring, `year` exact.
pub async fn list_titles(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<TitleQuery>,
) -> Result<Json<Page<TitleDto>>, ApiError> {
    let page = state.page_request(query.page);
    let slice = state.catalog_service().list_titles(&query, page).await?;
    paged(slice, page)
}

/// GET /titles/{title_id}
pub async fn get_title(
    State(state): State<Arc<AppState>>,
    ApiPath(title_id): ApiPath<i32>,
) -> Result<Json<TitleDto>, ApiError> {
    let title = state.catalog_service().get_title(title_id).await?;
    Ok(Json(title))
}

/// POST /titles
pub async fn create_title(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    payload: Result<ApiJson<CreateTitleRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&caller, Action::Create, Resource::Title)?;
    let ApiJson(payload) = payload?;
    let title = state.catalog_service().create_title(payload).await?;
    Ok((StatusCode::CREATED, Json(title)))
}

/// PATCH /titles/{title_id}
pub async fn update_title(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    ApiPath(title_id): ApiPath<i32>,
    payload: Result<ApiJson<UpdateTitleRequest>, ApiError>,
) -> Result<Json<TitleDto>, ApiError> {
    authorize(&caller, Action::Update, Resource::Title)?;
    let ApiJson(payload) = payload?;
    let title = state
        .catalog_service()
        .update_title(title_id, payload)
        .await?;
    Ok(Json(title))
}

/// DELETE /titles/{title_id}
pub async fn delete_title(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    ApiPath(title_id): ApiPath<i32>,
) -> Result<StatusCode, ApiError> {
    authorize(&caller, Action::Delete, Resource::Title)?;
    state.catalog_service().delete_title(title_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
