use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::db::{PageRequest, PageSlice, now_timestamp};
use crate::entities::{comments, prelude::*, users};

#[derive(Debug, Clone)]
pub struct CommentRow {
    pub comment: comments::Model,
    pub author: String,
}

impl CommentRow {
    fn from_pair((comment, author): (comments::Model, Option<users::Model>)) -> Self {
        Self {
            comment,
            author: author.map(|u| u.username).unwrap_or_default(),
        }
    }
}

pub struct CommentRepository {
    conn: DatabaseConnection,
}

impl CommentRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list_for_review(
        &self,
        review_id: i32,
        page: PageRequest,
    ) -> Result<PageSlice<CommentRow>> {
        let paginator = Comments::find()
            .filter(comments::Column::ReviewId.eq(review_id))
            .order_by_asc(comments::Column::PubDate)
            .order_by_asc(comments::Column::Id)
            .find_also_related(Users)
            .paginate(&self.conn, page.page_size);

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.index()).await?;

        Ok(PageSlice {
            items: items.into_iter().map(CommentRow::from_pair).collect(),
            total,
        })
    }

    pub async fn get(&self, review_id: i32, comment_id: i32) -> Result<Option<CommentRow>> {
        let row = Comments::find_by_id(comment_id)
            .filter(comments::Column::ReviewId.eq(review_id))
            .find_also_related(Users)
            .one(&self.conn)
            .await
            .context("Failed to query comment")?;

        Ok(row.map(CommentRow::from_pair))
    }

    pub async fn create(
        &self,
        review_id: i32,
        author_id: i32,
        text: String,
    ) -> Result<comments::Model> {
        comments::ActiveModel {
            review_id: Set(review_id),
            author_id: Set(author_id),
            text: Set(text),
            pub_date: Set(now_timestamp()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert comment")
    }

    pub async fn update_text(
        &self,
        comment: comments::Model,
        text: String,
    ) -> Result<comments::Model> {
        let mut active: comments::ActiveModel = comment.into();
        active.text = Set(text);
        active
            .update(&self.conn)
            .await
            .context("Failed to update comment")
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = Comments::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete comment")?;
        Ok(result.rows_affected > 0)
    }
}
