use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use sea_orm::sea_query::LikeExpr;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, SqlErr, Statement,
};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use repositories::category::CategoryRepository;
pub use repositories::comment::{CommentRepository, CommentRow};
pub use repositories::genre::GenreRepository;
pub use repositories::review::{ReviewRepository, ReviewRow};
pub use repositories::title::{NewTitle, TitleChanges, TitleFilter, TitleRepository, TitleRow};
pub use repositories::user::{NewUser, UserChanges, UserRepository};

/// 1-based page number plus page size, as requested by a list endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub page_size: u64,
}

impl PageRequest {
    #[must_use]
    pub const fn new(page: u64, page_size: u64) -> Self {
        Self { page, page_size }
    }

    /// Zero-based index understood by `SeaORM` paginators.
    #[must_use]
    pub const fn index(&self) -> u64 {
        self.page.saturating_sub(1)
    }
}

/// One page of rows plus the total row count across all pages.
#[derive(Debug, Clone)]
pub struct PageSlice<T> {
    pub items: Vec<T>,
    pub total: u64,
}

impl<T> PageSlice<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageSlice<U> {
        PageSlice {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
        }
    }
}

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    #[must_use]
    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn categories(&self) -> CategoryRepository {
        CategoryRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn genres(&self) -> GenreRepository {
        GenreRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn titles(&self) -> TitleRepository {
        TitleRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn reviews(&self) -> ReviewRepository {
        ReviewRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn comments(&self) -> CommentRepository {
        CommentRepository::new(self.conn.clone())
    }
}

/// Timestamp format stored in `pub_date`/`created_at` columns. Fixed width so
/// that lexical order equals chronological order.
#[must_use]
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

const LIKE_ESCAPE: char = '\\';

/// `LIKE` pattern matching `term` anywhere. `%` and `_` in `term` match
/// themselves only.
#[must_use]
pub fn contains_pattern(term: &str) -> LikeExpr {
    LikeExpr::new(format!("%{}%", escape_like(term))).escape(LIKE_ESCAPE)
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_') || c == LIKE_ESCAPE {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

/// Returns the database message when `err` was caused by a unique index.
#[must_use]
pub fn unique_violation(err: &anyhow::Error) -> Option<String> {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<DbErr>())
        .and_then(unique_violation_db)
}

#[must_use]
pub fn unique_violation_db(err: &DbErr) -> Option<String> {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(message)) => Some(message),
        _ => None,
    }
}
