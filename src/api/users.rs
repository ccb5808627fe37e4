//! User endpoints: admin management by username, and `/users/me` for the
//! caller's own profile.

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;

use super::extract::{ApiJson, ApiPath, ApiQuery};
use super::{
    ApiError, AppState, CreateUserRequest, Page, SearchQuery, UpdateUserRequest, UserDto, paged,
    require_principal,
};
use crate::domain::{Action, Caller, Resource, authorize};
use crate::services::UserError;

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(username) => Self::not_found("User", username),
            UserError::Validation(msg) => Self::validation(msg),
            UserError::Conflict(msg) => Self::Conflict(msg),
            UserError::Database(msg) => Self::DatabaseError(msg),
            UserError::Internal(msg) => Self::internal(msg),
        }
    }
}

/// GET /users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> Result<Json<Page<UserDto>>, ApiError> {
    authorize(&caller, Action::Read, Resource::UserAccount)?;
    let page = state.page_request(query.page);
    let slice = state
        .user_service()
        .list(query.search.as_deref(), page)
        .await?;
    paged(slice, page)
}

/// POST /users
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    payload: Result<ApiJson<CreateUserRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&caller, Action::Create, Resource::UserAccount)?;
    let ApiJson(payload) = payload?;
    let user = state.user_service().create(payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /users/{username}
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    ApiPath(username): ApiPath<String>,
) -> Result<Json<UserDto>, ApiError> {
    authorize(&caller, Action::Read, Resource::UserAccount)?;
    let user = state.user_service().get(&username).await?;
    Ok(Json(user))
}

/// PATCH /users/{username}
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    ApiPath(username): ApiPath<String>,
    payload: Result<ApiJson<UpdateUserRequest>, ApiError>,
) -> Result<Json<UserDto>, ApiError> {
    authorize(&caller, Action::Update, Resource::UserAccount)?;
    let ApiJson(payload) = payload?;
    let user = state.user_service().update(&username, payload).await?;
    Ok(Json(user))
}

/// DELETE /users/{username}
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    ApiPath(username): ApiPath<String>,
) -> Result<StatusCode, ApiError> {
    authorize(&caller, Action::Delete, Resource::UserAccount)?;
    state.user_service().delete(&username).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /users/me
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<UserDto>, ApiError> {
    authorize(&caller, Action::Read, Resource::OwnProfile)?;
    let user = state.user_service().get_me(require_principal(&caller)?).await?;
    Ok(Json(user))
}

/// PATCH /users/me
/// Any `role` in the body is ignored.
pub async fn update_me(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    payload: Result<ApiJson<UpdateUserRequest>, ApiError>,
) -> Result<Json<UserDto>, ApiError> {
    authorize(&caller, Action::Update, Resource::OwnProfile)?;
    let ApiJson(payload) = payload?;
    let user = state
        .user_service()
        .update_me(require_principal(&caller)?, payload)
        .await?;
    Ok(Json(user))
}
