use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::db::{PageRequest, PageSlice, contains_pattern};
use crate::entities::{genres, prelude::*};

pub struct GenreRepository {
    conn: DatabaseConnection,
}

impl GenreRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<PageSlice<genres::Model>> {
        let mut query = Genres::find()
            .order_by_asc(genres::Column::Name)
            .order_by_asc(genres::Column::Id);

        if let Some(term) = search {
            query = query.filter(genres::Column::Name.like(contains_pattern(term)));
        }

        let paginator = query.paginate(&self.conn, page.page_size);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.index()).await?;

        Ok(PageSlice { items, total })
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<genres::Model>> {
        Genres::find()
            .filter(genres::Column::Slug.eq(slug))
            .one(&self.conn)
            .await
            .context("Failed to query genre by slug")
    }

    pub async fn get_by_slugs(&self, slugs: &[String]) -> Result<Vec<genres::Model>> {
        if slugs.is_empty() {
            return Ok(Vec::new());
        }

        Genres::find()
            .filter(genres::Column::Slug.is_in(slugs.iter().cloned()))
            .all(&self.conn)
            .await
            .context("Failed to query genres by slug")
    }

    pub async fn create(&self, name: String, slug: String) -> Result<genres::Model> {
        genres::ActiveModel {
            name: Set(name),
            slug: Set(slug),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert genre")
    }

    /// Removes the genre and its title links.
    pub async fn delete_by_slug(&self, slug: &str) -> Result<bool> {
        let result = Genres::delete_many()
            .filter(genres::Column::Slug.eq(slug))
            .exec(&self.conn)
            .await
            .context("Failed to delete genre")?;
        Ok(result.rows_affected > 0)
    }
}
