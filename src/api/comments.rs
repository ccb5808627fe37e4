//! Comment endpoints, nested under a review. The review must belong to the
//! title in the path.

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;

use super::extract::{ApiJson, ApiPath, ApiQuery};
use super::{
    ApiError, AppState, CommentDto, CreateCommentRequest, Page, PageQuery, UpdateCommentRequest,
    paged, require_principal,
};
use crate::domain::{Action, Caller, Resource, authorize};

async fn authorize_comment(
    state: &AppState,
    caller: &Caller,
    action: Action,
    (title_id, review_id, comment_id): (i32, i32, i32),
) -> Result<(), ApiError> {
    if !caller.is_authenticated() {
        authorize(caller, action, Resource::Comment { author_id: None })?;
    }

    let author_id = state
        .review_service()
        .comment_author(title_id, review_id, comment_id)
        .await?;
    authorize(
        caller,
        action,
        Resource::Comment {
            author_id: Some(author_id),
        },
    )?;
    Ok(())
}

/// GET /titles/{title_id}/reviews/{review_id}/comments
pub async fn list_comments(
    State(state): State<Arc<AppState>>,
    ApiPath((title_id, review_id)): ApiPath<(i32, i32)>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<Json<Page<CommentDto>>, ApiError> {
    let page = state.page_request(query.page);
    let slice = state
        .review_service()
        .list_comments(title_id, review_id, page)
        .await?;
    paged(slice, page)
}

/// GET /titles/{title_id}/reviews/{review_id}/comments/{comment_id}
pub async fn get_comment(
    State(state): State<Arc<AppState>>,
    ApiPath((title_id, review_id, comment_id)): ApiPath<(i32, i32, i32)>,
) -> Result<Json<CommentDto>, ApiError> {
    let comment = state
        .review_service()
        .get_comment(title_id, review_id, comment_id)
        .await?;
    Ok(Json(comment))
}

/// POST /titles/{title_id}/reviews/{review_id}/comments
pub async fn create_comment(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    ApiPath((title_id, review_id)): ApiPath<(i32, i32)>,
    payload: Result<ApiJson<CreateCommentRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&caller, Action::Create, Resource::Comment { author_id: None })?;
    let ApiJson(payload) = payload?;
    let author = require_principal(&caller)?;

    let comment = state
        .review_service()
        .create_comment(title_id, review_id, author, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// PATCH /titles/{title_id}/reviews/{review_id}/comments/{comment_id}
pub async fn update_comment(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    ApiPath(ids): ApiPath<(i32, i32, i32)>,
    payload: Result<ApiJson<UpdateCommentRequest>, ApiError>,
) -> Result<Json<CommentDto>, ApiError> {
    authorize_comment(&state, &caller, Action::Update, ids).await?;
    let ApiJson(payload) = payload?;
    let (title_id, review_id, comment_id) = ids;
    let comment = state
        .review_service()
        .update_comment(title_id, review_id, comment_id, payload)
        .await?;
    Ok(Json(comment))
}

/// DELETE /titles/{title_id}/reviews/{review_id}/comments/{comment_id}
pub async fn delete_comment(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    ApiPath(ids): ApiPath<(i32, i32, i32)>,
) -> Result<StatusCode, ApiError> {
    authorize_comment(&state, &caller, Action::Delete, ids).await?;
    let (title_id, review_id, comment_id) = ids;
    state
        .review_service()
        .delete_comment(title_id, review_id, comment_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
