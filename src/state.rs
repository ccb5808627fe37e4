use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;
use crate::services::mailer::mailer_from_config;
use crate::services::{
    AuthService, CatalogService, Mailer, ReviewService, SeaOrmAuthService, SeaOrmCatalogService,
    SeaOrmReviewService, SeaOrmUserService, TokenKeys, UserService,
};

/// Everything a request handler or CLI command may need. Cheap to clone;
/// nothing in here is mutated after construction.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub auth_service: Arc<dyn AuthService>,

    pub user_service: Arc<dyn UserService>,

    pub catalog_service: Arc<dyn CatalogService>,

    pub review_service: Arc<dyn ReviewService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let mailer = mailer_from_config(&config.email)
            .map_err(|e| anyhow::anyhow!("Failed to configure mailer: {e}"))?;
        Self::with_mailer(config, mailer).await
    }

    /// Builds the state around a caller-supplied mailer.
    pub async fn with_mailer(config: Config, mailer: Arc<dyn Mailer>) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let auth_service = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            TokenKeys::new(&config.auth),
            mailer,
        )) as Arc<dyn AuthService + Send + Sync + 'static>;

        let user_service = Arc::new(SeaOrmUserService::new(store.clone()))
            as Arc<dyn UserService + Send + Sync + 'static>;

        let catalog_service = Arc::new(SeaOrmCatalogService::new(store.clone()))
            as Arc<dyn CatalogService + Send + Sync + 'static>;

        let review_service = Arc::new(SeaOrmReviewService::new(store.clone()))
            as Arc<dyn ReviewService + Send + Sync + 'static>;

        Ok(Self {
            config: Arc::new(config),
            store,
            auth_service,
            user_service,
            catalog_service,
            review_service,
        })
    }

    #[must_use]
    pub fn page_size(&self) -> u64 {
        self.config.pagination.page_size
    }
}
