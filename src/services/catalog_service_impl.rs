//! `SeaORM` implementation of the `CatalogService` trait.

use async_trait::async_trait;
use chrono::{Datelike, Utc};
use tracing::info;

use crate::api::types::{
    CategoryDto, CreateTitleRequest, GenreDto, TitleDto, TitleQuery, UpdateTitleRequest,
};
use crate::db::{NewTitle, PageRequest, PageSlice, Store, TitleChanges, TitleFilter, TitleRow};
use crate::domain::{FieldError, validate};
use crate::entities::{categories, genres};
use crate::services::catalog_service::{CatalogError, CatalogService};

pub struct SeaOrmCatalogService {
    store: Store,
}

impl SeaOrmCatalogService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn resolve_category(&self, slug: &str) -> Result<i32, CatalogError> {
        self.store
            .categories()
            .get_by_slug(slug)
            .await?
            .map(|c| c.id)
            .ok_or_else(|| {
                FieldError::new("category", format!("Unknown category slug '{slug}'")).into()
            })
    }

    async fn resolve_genres(&self, slugs: &[String]) -> Result<Vec<i32>, CatalogError> {
        if slugs.is_empty() {
            return Ok(Vec::new());
        }

        let found = self.store.genres().get_by_slugs(slugs).await?;

        if let Some(missing) = slugs.iter().find(|s| !found.iter().any(|g| &g.slug == *s)) {
            return Err(FieldError::new("genre", format!("Unknown genre slug '{missing}'")).into());
        }

        Ok(found.into_iter().map(|g| g.id).collect())
    }

    async fn row(&self, id: i32) -> Result<TitleRow, CatalogError> {
        self.store
            .titles()
            .get_row(id)
            .await?
            .ok_or_else(|| CatalogError::NotFound(format!("Title {id}")))
    }
}

fn current_year() -> i32 {
    Utc::now().year()
}

fn category_dto(model: categories::Model) -> CategoryDto {
    CategoryDto {
        name: model.name,
        slug: model.slug,
    }
}

fn genre_dto(model: genres::Model) -> GenreDto {
    GenreDto {
        name: model.name,
        slug: model.slug,
    }
}

fn title_dto(row: TitleRow) -> TitleDto {
    TitleDto {
        id: row.title.id,
        name: row.title.name,
        year: row.title.year,
        description: row.title.description,
        genre: row.genres.into_iter().map(genre_dto).collect(),
        category: row.category.map(category_dto),
        rating: row.rating,
    }
}

fn validate_taxon(name: &str, slug: &str) -> Result<(), CatalogError> {
    validate::validate_name(name)?;
    validate::validate_slug(slug)?;
    Ok(())
}

#[async_trait]
impl CatalogService for SeaOrmCatalogService {
    async fn list_categories(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<PageSlice<CategoryDto>, CatalogError> {
        let slice = self.store.categories().list(search, page).await?;
        Ok(slice.map(category_dto))
    }

    async fn create_category(&self, category: CategoryDto) -> Result<CategoryDto, CatalogError> {
        validate_taxon(&category.name, &category.slug)?;

        let model = self
            .store
            .categories()
            .create(category.name, category.slug)
            .await?;

        info!(slug = %model.slug, "Category created");
        Ok(category_dto(model))
    }

    async fn delete_category(&self, slug: &str) -> Result<(), CatalogError> {
        if !self.store.categories().delete_by_slug(slug).await? {
            return Err(CatalogError::NotFound(format!("Category '{slug}'")));
        }
        info!(slug = %slug, "Category deleted");
        Ok(())
    }

    async fn list_genres(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<PageSlice<GenreDto>, CatalogError> {
        let slice = self.store.genres().list(search, page).await?;
        Ok(slice.map(genre_dto))
    }

    async fn create_genre(&self, genre: GenreDto) -> Result<GenreDto, CatalogError> {
        validate_taxon(&genre.name, &genre.slug)?;

        let model = self.store.genres().create(genre.name, genre.slug).await?;

        info!(slug = %model.slug, "Genre created");
        Ok(genre_dto(model))
    }

    async fn delete_genre(&self, slug: &str) -> Result<(), CatalogError> {
        if !self.store.genres().delete_by_slug(slug).await? {
            return Err(CatalogError::NotFound(format!("Genre '{slug}'")));
        }
        info!(slug = %slug, "Genre deleted");
        Ok(())
    }

    async fn list_titles(
        &self,
        query: &TitleQuery,
        page: PageRequest,
    ) -> Result<PageSlice<TitleDto>, CatalogError> {
        let filter = TitleFilter {
            category: query.category.clone(),
            genre: query.genre.clone(),
            name: query.name.clone(),
            year: query.year,
        };

        let slice = self.store.titles().list(&filter, page).await?;
        Ok(slice.map(title_dto))
    }

    async fn get_title(&self, id: i32) -> Result<TitleDto, CatalogError> {
        self.row(id).await.map(title_dto)
    }

    async fn create_title(&self, request: CreateTitleRequest) -> Result<TitleDto, CatalogError> {
        validate::validate_name(&request.name)?;
        validate::validate_year(request.year, current_year())?;

        let category_id = match &request.category {
            Some(slug) => Some(self.resolve_category(slug).await?),
            None => None,
        };
        let genre_ids = self.resolve_genres(&request.genre).await?;

        let title = self
            .store
            .titles()
            .create(NewTitle {
                name: request.name,
                year: request.year,
                description: request.description,
                category_id,
                genre_ids,
            })
            .await?;

        info!(id = title.id, name = %title.name, "Title created");
        self.row(title.id).await.map(title_dto)
    }

    async fn update_title(
        &self,
        id: i32,
        request: UpdateTitleRequest,
    ) -> Result<TitleDto, CatalogError> {
        let title = self
            .store
            .titles()
            .get(id)
            .await?
            .ok_or_else(|| CatalogError::NotFound(format!("Title {id}")))?;

        if let Some(name) = &request.name {
            validate::validate_name(name)?;
        }
        if let Some(year) = request.year {
            validate::validate_year(year, current_year())?;
        }

        let category_id = match request.category {
            Some(Some(slug)) => Some(Some(self.resolve_category(&slug).await?)),
            Some(None) => Some(None),
            None => None,
        };
        let genre_ids = match request.genre {
            Some(slugs) => Some(self.resolve_genres(&slugs).await?),
            None => None,
        };

        self.store
            .titles()
            .update(
                title,
                TitleChanges {
                    name: request.name,
                    year: request.year,
                    description: request.description,
                    category_id,
                    genre_ids,
                },
            )
            .await?;

        self.row(id).await.map(title_dto)
    }

    async fn delete_title(&self, id: i32) -> Result<(), CatalogError> {
        if !self.store.titles().delete(id).await? {
            return Err(CatalogError::NotFound(format!("Title {id}")));
        }
        info!(id, "Title deleted");
        Ok(())
    }
}
