use anyhow::{Context, Result};
use sea_orm::sea_query::Query;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    LoaderTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::db::{PageRequest, PageSlice, ReviewRepository, contains_pattern};
use crate::entities::{categories, genre_title, genres, prelude::*, titles};

/// Query-string filters for the title list. Slugs that match nothing yield an
/// empty page rather than an error.
#[derive(Debug, Clone, Default)]
pub struct TitleFilter {
    pub category: Option<String>,
    pub genre: Option<String>,
    pub name: Option<String>,
    pub year: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct NewTitle {
    pub name: String,
    pub year: i32,
    pub description: Option<String>,
    pub category_id: Option<i32>,
    pub genre_ids: Vec<i32>,
}

/// Partial update. The nested options distinguish "leave alone" from "clear".
#[derive(Debug, Clone, Default)]
pub struct TitleChanges {
    pub name: Option<String>,
    pub year: Option<i32>,
    pub description: Option<Option<String>>,
    pub category_id: Option<Option<i32>>,
    pub genre_ids: Option<Vec<i32>>,
}

/// A title joined with everything its representation needs.
#[derive(Debug, Clone)]
pub struct TitleRow {
    pub title: titles::Model,
    pub category: Option<categories::Model>,
    pub genres: Vec<genres::Model>,
    pub rating: Option<f64>,
}

pub struct TitleRepository {
    conn: DatabaseConnection,
}

impl TitleRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(
        &self,
        filter: &TitleFilter,
        page: PageRequest,
    ) -> Result<PageSlice<TitleRow>> {
        let mut query = Titles::find()
            .order_by_asc(titles::Column::Name)
            .order_by_asc(titles::Column::Id);

        if let Some(slug) = &filter.category {
            let category_ids = Query::select()
                .column(categories::Column::Id)
                .from(categories::Entity)
                .and_where(categories::Column::Slug.eq(slug.as_str()))
                .to_owned();
            query = query.filter(titles::Column::CategoryId.in_subquery(category_ids));
        }

        if let Some(slug) = &filter.genre {
            let genre_ids = Query::select()
                .column(genres::Column::Id)
                .from(genres::Entity)
                .and_where(genres::Column::Slug.eq(slug.as_str()))
                .to_owned();
            let title_ids = Query::select()
                .column(genre_title::Column::TitleId)
                .from(genre_title::Entity)
                .and_where(genre_title::Column::GenreId.in_subquery(genre_ids))
                .to_owned();
            query = query.filter(titles::Column::Id.in_subquery(title_ids));
        }

        if let Some(name) = &filter.name {
            query = query.filter(titles::Column::Name.like(contains_pattern(name)));
        }

        if let Some(year) = filter.year {
            query = query.filter(titles::Column::Year.eq(year));
        }

        let paginator = query.paginate(&self.conn, page.page_size);
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(page.index()).await?;
        let items = self.hydrate(models).await?;

        Ok(PageSlice { items, total })
    }

    pub async fn get(&self, id: i32) -> Result<Option<titles::Model>> {
        Titles::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query title by ID")
    }

    pub async fn get_row(&self, id: i32) -> Result<Option<TitleRow>> {
        let Some(model) = self.get(id).await? else {
            return Ok(None);
        };
        Ok(self.hydrate(vec![model]).await?.into_iter().next())
    }

    /// Loads category, genres and the current rating for each title in three
    /// batched queries.
    pub async fn hydrate(&self, models: Vec<titles::Model>) -> Result<Vec<TitleRow>> {
        let categories = models
            .load_one(Categories, &self.conn)
            .await
            .context("Failed to load title categories")?;
        let genres = models
            .load_many_to_many(Genres, GenreTitle, &self.conn)
            .await
            .context("Failed to load title genres")?;

        let ids: Vec<i32> = models.iter().map(|t| t.id).collect();
        let ratings = ReviewRepository::new(self.conn.clone())
            .average_scores(&ids)
            .await?;

        Ok(models
            .into_iter()
            .zip(categories)
            .zip(genres)
            .map(|((title, category), mut genres)| {
                genres.sort_by(|a, b| a.name.cmp(&b.name));
                let rating = ratings.get(&title.id).copied();
                TitleRow {
                    title,
                    category,
                    genres,
                    rating,
                }
            })
            .collect())
    }

    pub async fn create(&self, new: NewTitle) -> Result<titles::Model> {
        let txn = self.conn.begin().await?;

        let title = titles::ActiveModel {
            name: Set(new.name),
            year: Set(new.year),
            description: Set(new.description),
            category_id: Set(new.category_id),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .context("Failed to insert title")?;

        Self::link_genres(&txn, title.id, new.genre_ids).await?;

        txn.commit().await?;
        Ok(title)
    }

    pub async fn update(
        &self,
        title: titles::Model,
        changes: TitleChanges,
    ) -> Result<titles::Model> {
        let txn = self.conn.begin().await?;
        let id = title.id;

        let mut active: titles::ActiveModel = title.clone().into();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(year) = changes.year {
            active.year = Set(year);
        }
        if let Some(description) = changes.description {
            active.description = Set(description);
        }
        if let Some(category_id) = changes.category_id {
            active.category_id = Set(category_id);
        }

        let updated = if active.is_changed() {
            active
                .update(&txn)
                .await
                .context("Failed to update title")?
        } else {
            title
        };

        if let Some(genre_ids) = changes.genre_ids {
            GenreTitle::delete_many()
                .filter(genre_title::Column::TitleId.eq(id))
                .exec(&txn)
                .await?;
            Self::link_genres(&txn, id, genre_ids).await?;
        }

        txn.commit().await?;
        Ok(updated)
    }

    /// Deletes the title; its reviews, their comments and genre links cascade.
    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = Titles::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete title")?;
        Ok(result.rows_affected > 0)
    }

    async fn link_genres(
        txn: &DatabaseTransaction,
        title_id: i32,
        genre_ids: Vec<i32>,
    ) -> Result<()> {
        if genre_ids.is_empty() {
            return Ok(());
        }

        let mut genre_ids = genre_ids;
        genre_ids.sort_unstable();
        genre_ids.dedup();

        let links: Vec<genre_title::ActiveModel> = genre_ids
            .into_iter()
            .map(|genre_id| genre_title::ActiveModel {
                title_id: Set(title_id),
                genre_id: Set(genre_id),
                ..Default::default()
            })
            .collect();

        GenreTitle::insert_many(links)
            .exec(txn)
            .await
            .context("Failed to link title genres")?;
        Ok(())
    }
}
