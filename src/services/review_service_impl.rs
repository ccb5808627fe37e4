//! `SeaORM` implementation of the `ReviewService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::api::types::{
    CommentDto, CreateCommentRequest, CreateReviewRequest, ReviewDto, UpdateCommentRequest,
    UpdateReviewRequest,
};
use crate::db::{CommentRow, PageRequest, PageSlice, ReviewRow, Store};
use crate::domain::{Principal, validate};
use crate::entities::titles;
use crate::services::review_service::{ReviewError, ReviewService};

pub struct SeaOrmReviewService {
    store: Store,
}

impl SeaOrmReviewService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn title(&self, title_id: i32) -> Result<titles::Model, ReviewError> {
        self.store
            .titles()
            .get(title_id)
            .await?
            .ok_or_else(|| ReviewError::NotFound(format!("Title {title_id}")))
    }

    async fn review(&self, title_id: i32, review_id: i32) -> Result<ReviewRow, ReviewError> {
        self.store
            .reviews()
            .get(title_id, review_id)
            .await?
            .ok_or_else(|| ReviewError::NotFound(format!("Review {review_id}")))
    }

    async fn comment(
        &self,
        title_id: i32,
        review_id: i32,
        comment_id: i32,
    ) -> Result<CommentRow, ReviewError> {
        self.review(title_id, review_id).await?;
        self.store
            .comments()
            .get(review_id, comment_id)
            .await?
            .ok_or_else(|| ReviewError::NotFound(format!("Comment {comment_id}")))
    }
}

fn review_dto(title_name: &str, row: ReviewRow) -> ReviewDto {
    ReviewDto {
        id: row.review.id,
        title: title_name.to_string(),
        text: row.review.text,
        author: row.author,
        score: row.review.score,
        pub_date: row.review.pub_date,
    }
}

fn comment_dto(row: CommentRow) -> CommentDto {
    CommentDto {
        id: row.comment.id,
        review: row.comment.review_id,
        text: row.comment.text,
        author: row.author,
        pub_date: row.comment.pub_date,
    }
}

#[async_trait]
impl ReviewService for SeaOrmReviewService {
    async fn list_reviews(
        &self,
        title_id: i32,
        page: PageRequest,
    ) -> Result<PageSlice<ReviewDto>, ReviewError> {
        let title = self.title(title_id).await?;
        let slice = self.store.reviews().list_for_title(title_id, page).await?;
        Ok(slice.map(|row| review_dto(&title.name, row)))
    }

    async fn get_review(&self, title_id: i32, review_id: i32) -> Result<ReviewDto, ReviewError> {
        let title = self.title(title_id).await?;
        let row = self.review(title_id, review_id).await?;
        Ok(review_dto(&title.name, row))
    }

    async fn review_author(&self, title_id: i32, review_id: i32) -> Result<i32, ReviewError> {
        Ok(self.review(title_id, review_id).await?.review.author_id)
    }

    async fn create_review(
        &self,
        title_id: i32,
        author: &Principal,
        request: CreateReviewRequest,
    ) -> Result<ReviewDto, ReviewError> {
        let title = self.title(title_id).await?;
        validate::validate_text(&request.text)?;
        validate::validate_score(request.score)?;

        let review = self
            .store
            .reviews()
            .create(title_id, author.id, request.text, request.score)
            .await
            .map_err(|e| match ReviewError::from(e) {
                ReviewError::Conflict(_) => {
                    ReviewError::Conflict("You have already reviewed this title".to_string())
                }
                other => other,
            })?;

        info!(title_id, review_id = review.id, author = %author.username, "Review created");
        Ok(review_dto(
            &title.name,
            ReviewRow {
                review,
                author: author.username.clone(),
            },
        ))
    }

    async fn update_review(
        &self,
        title_id: i32,
        review_id: i32,
        request: UpdateReviewRequest,
    ) -> Result<ReviewDto, ReviewError> {
        let title = self.title(title_id).await?;
        let row = self.review(title_id, review_id).await?;

        if let Some(text) = &request.text {
            validate::validate_text(text)?;
        }
        if let Some(score) = request.score {
            validate::validate_score(score)?;
        }

        let review = self
            .store
            .reviews()
            .update(row.review, request.text, request.score)
            .await?;

        Ok(review_dto(
            &title.name,
            ReviewRow {
                review,
                author: row.author,
            },
        ))
    }

    async fn delete_review(&self, title_id: i32, review_id: i32) -> Result<(), ReviewError> {
        let row = self.review(title_id, review_id).await?;
        self.store.reviews().delete(row.review.id).await?;
        info!(title_id, review_id, "Review deleted");
        Ok(())
    }

    async fn list_comments(
        &self,
        title_id: i32,
        review_id: i32,
        page: PageRequest,
    ) -> Result<PageSlice<CommentDto>, ReviewError> {
        self.review(title_id, review_id).await?;
        let slice = self
            .store
            .comments()
            .list_for_review(review_id, page)
            .await?;
        Ok(slice.map(comment_dto))
    }

    async fn get_comment(
        &self,
        title_id: i32,
        review_id: i32,
        comment_id: i32,
    ) -> Result<CommentDto, ReviewError> {
        self.comment(title_id, review_id, comment_id)
            .await
            .map(comment_dto)
    }

    async fn comment_author(
        &self,
        title_id: i32,
        review_id: i32,
        comment_id: i32,
    ) -> Result<i32, ReviewError> {
        Ok(self
            .comment(title_id, review_id, comment_id)
            .await?
            .comment
            .author_id)
    }

    async fn create_comment(
        &self,
        title_id: i32,
        review_id: i32,
        author: &Principal,
        request: CreateCommentRequest,
    ) -> Result<CommentDto, ReviewError> {
        self.review(title_id, review_id).await?;
        validate::validate_text(&request.text)?;

        let comment = self
            .store
            .comments()
            .create(review_id, author.id, request.text)
            .await?;

        info!(review_id, comment_id = comment.id, author = %author.username, "Comment created");
        Ok(comment_dto(CommentRow {
            comment,
            author: author.username.clone(),
        }))
    }

    async fn update_comment(
        &self,
        title_id: i32,
        review_id: i32,
        comment_id: i32,
        request: UpdateCommentRequest,
    ) -> Result<CommentDto, ReviewError> {
        let row = self.comment(title_id, review_id, comment_id).await?;

        let Some(text) = request.text else {
            return Ok(comment_dto(row));
        };
        validate::validate_text(&text)?;

        let comment = self.store.comments().update_text(row.comment, text).await?;
        Ok(comment_dto(CommentRow {
            comment,
            author: row.author,
        }))
    }

    async fn delete_comment(
        &self,
        title_id: i32,
        review_id: i32,
        comment_id: i32,
    ) -> Result<(), ReviewError> {
        let row = self.comment(title_id, review_id, comment_id).await?;
        self.store.comments().delete(row.comment.id).await?;
        info!(review_id, comment_id, "Comment deleted");
        Ok(())
    }
}
