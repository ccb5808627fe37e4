use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::db::{PageRequest, PageSlice, contains_pattern};
use crate::entities::{categories, prelude::*};

pub struct CategoryRepository {
    conn: DatabaseConnection,
}

impl CategoryRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<PageSlice<categories::Model>> {
        let mut query = Categories::find()
            .order_by_asc(categories::Column::Name)
            .order_by_asc(categories::Column::Id);

        if let Some(term) = search {
            query = query.filter(categories::Column::Name.like(contains_pattern(term)));
        }

        let paginator = query.paginate(&self.conn, page.page_size);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.index()).await?;

        Ok(PageSlice { items, total })
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<categories::Model>> {
        Categories::find()
            .filter(categories::Column::Slug.eq(slug))
            .one(&self.conn)
            .await
            .context("Failed to query category by slug")
    }

    pub async fn create(&self, name: String, slug: String) -> Result<categories::Model> {
        categories::ActiveModel {
            name: Set(name),
            slug: Set(slug),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert category")
    }

    /// Titles in this category keep existing with no category.
    pub async fn delete_by_slug(&self, slug: &str) -> Result<bool> {
        let result = Categories::delete_many()
            .filter(categories::Column::Slug.eq(slug))
            .exec(&self.conn)
            .await
            .context("Failed to delete category")?;
        Ok(result.rows_affected > 0)
    }
}
