use anyhow::{Context, Result};
use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use std::collections::HashMap;

use crate::db::{PageRequest, PageSlice, now_timestamp};
use crate::entities::{prelude::*, reviews, users};

/// A review together with its author's username.
#[derive(Debug, Clone)]
pub struct ReviewRow {
    pub review: reviews::Model,
    pub author: String,
}

impl ReviewRow {
    fn from_pair((review, author): (reviews::Model, Option<users::Model>)) -> Self {
        Self {
            review,
            author: author.map(|u| u.username).unwrap_or_default(),
        }
    }
}

pub struct ReviewRepository {
    conn: DatabaseConnection,
}

impl ReviewRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list_for_title(
        &self,
        title_id: i32,
        page: PageRequest,
    ) -> Result<PageSlice<ReviewRow>> {
        let paginator = Reviews::find()
            .filter(reviews::Column::TitleId.eq(title_id))
            .order_by_asc(reviews::Column::PubDate)
            .order_by_asc(reviews::Column::Id)
            .find_also_related(Users)
            .paginate(&self.conn, page.page_size);

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.index()).await?;

        Ok(PageSlice {
            items: items.into_iter().map(ReviewRow::from_pair).collect(),
            total,
        })
    }

    /// Looks a review up under its title so that mismatched paths miss.
    pub async fn get(&self, title_id: i32, review_id: i32) -> Result<Option<ReviewRow>> {
        let row = Reviews::find_by_id(review_id)
            .filter(reviews::Column::TitleId.eq(title_id))
            .find_also_related(Users)
            .one(&self.conn)
            .await
            .context("Failed to query review")?;

        Ok(row.map(ReviewRow::from_pair))
    }

    /// Fails with a unique violation if the author already reviewed the title.
    pub async fn create(
        &self,
        title_id: i32,
        author_id: i32,
        text: String,
        score: i32,
    ) -> Result<reviews::Model> {
        reviews::ActiveModel {
            title_id: Set(title_id),
            author_id: Set(author_id),
            text: Set(text),
            score: Set(score),
            pub_date: Set(now_timestamp()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert review")
    }

    pub async fn update(
        &self,
        review: reviews::Model,
        text: Option<String>,
        score: Option<i32>,
    ) -> Result<reviews::Model> {
        let mut active: reviews::ActiveModel = review.clone().into();
        if let Some(text) = text {
            active.text = Set(text);
        }
        if let Some(score) = score {
            active.score = Set(score);
        }

        if !active.is_changed() {
            return Ok(review);
        }

        active
            .update(&self.conn)
            .await
            .context("Failed to update review")
    }

    /// Deletes the review and, by cascade, its comments.
    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = Reviews::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete review")?;
        Ok(result.rows_affected > 0)
    }

    /// Mean score per title, computed by the database at read time. Titles
    /// without reviews are absent from the map.
    pub async fn average_scores(&self, title_ids: &[i32]) -> Result<HashMap<i32, f64>> {
        if title_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(i32, f64)> = Reviews::find()
            .select_only()
            .column(reviews::Column::TitleId)
            .column_as(
                SimpleExpr::from(Func::avg(Expr::col(reviews::Column::Score))),
                "rating",
            )
            .filter(reviews::Column::TitleId.is_in(title_ids.iter().copied()))
            .group_by(reviews::Column::TitleId)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to aggregate review scores")?;

        Ok(rows.into_iter().collect())
    }
}
