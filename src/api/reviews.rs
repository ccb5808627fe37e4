//! Review endpoints, nested under a title.
//!
//! Anyone may read. Any signed-in user may review a title once; the author,
//! moderators and admins may edit or delete a review.

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;

use super::extract::{ApiJson, ApiPath, ApiQuery};
use super::{
    ApiError, AppState, CreateReviewRequest, Page, PageQuery, ReviewDto, UpdateReviewRequest,
    paged, require_principal,
};
use crate::domain::{Action, Caller, Resource, authorize};
use crate::services::ReviewError;

impl From<ReviewError> for ApiError {
    fn from(err: ReviewError) -> Self {
        match err {
            ReviewError::NotFound(what) => Self::NotFound(format!("{what} not found")),
            ReviewError::Validation(msg) => Self::validation(msg),
            ReviewError::Conflict(msg) => Self::Conflict(msg),
            ReviewError::Database(msg) => Self::DatabaseError(msg),
            ReviewError::Internal(msg) => Self::internal(msg),
        }
    }
}

/// Checks `action` against the stored author of the review. Anonymous
/// callers are turned away before the review is looked up.
async fn authorize_review(
    state: &AppState,
    caller: &Caller,
    action: Action,
    title_id: i32,
    review_id: i32,
) -> Result<(), ApiError> {
    if !caller.is_authenticated() {
        authorize(caller, action, Resource::Review { author_id: None })?;
    }

    let author_id = state
        .review_service()
        .review_author(title_id, review_id)
        .await?;
    authorize(
        caller,
        action,
        Resource::Review {
            author_id: Some(author_id),
        },
    )?;
    Ok(())
}

/// GET /titles/{title_id}/reviews
pub async fn list_reviews(
    State(state): State<Arc<AppState>>,
    ApiPath(title_id): ApiPath<i32>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<Json<Page<ReviewDto>>, ApiError> {
    let page = state.page_request(query.page);
    let slice = state.review_service().list_reviews(title_id, page).await?;
    paged(slice, page)
}

/// GET /titles/{title_id}/reviews/{review_id}
pub async fn get_review(
    State(state): State<Arc<AppState>>,
    ApiPath((title_id, review_id)): ApiPath<(i32, i32)>,
) -> Result<Json<ReviewDto>, ApiError> {
    let review = state
        .review_service()
        .get_review(title_id, review_id)
        .await?;
    Ok(Json(review))
}

/// POST /titles/{title_id}/reviews
/// The author is always the caller; a client-supplied author is ignored.
pub async fn create_review(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    ApiPath(title_id): ApiPath<i32>,
    payload: Result<ApiJson<CreateReviewRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&caller, Action::Create, Resource::Review { author_id: None })?;
    let ApiJson(payload) = payload?;
    let author = require_principal(&caller)?;

    let review = state
        .review_service()
        .create_review(title_id, author, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(review)))
}

/// PATCH /titles/{title_id}/reviews/{review_id}
pub async fn update_review(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    ApiPath((title_id, review_id)): ApiPath<(i32, i32)>,
    payload: Result<ApiJson<UpdateReviewRequest>, ApiError>,
) -> Result<Json<ReviewDto>, ApiError> {
    authorize_review(&state, &caller, Action::Update, title_id, review_id).await?;
    let ApiJson(payload) = payload?;
    let review = state
        .review_service()
        .update_review(title_id, review_id, payload)
        .await?;
    Ok(Json(review))
}

/// DELETE /titles/{title_id}/reviews/{review_id}
pub async fn delete_review(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    ApiPath((title_id, review_id)): ApiPath<(i32, i32)>,
) -> Result<StatusCode, ApiError> {
    authorize_review(&state, &caller, Action::Delete, title_id, review_id).await?;
    state
        .review_service()
        .delete_review(title_id, review_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
