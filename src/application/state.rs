use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::application::services::ContentRefreshGate;
use crate::domain::content::CategorySpec;
use crate::domain::repositories::ContentRepository;
use crate::infrastructure::convert::ConversionClient;
use crate::infrastructure::database::Database;
use crate::infrastructure::generator::Generator;
use crate::infrastructure::repositories::content::SqlContentRepository;

/// Configuration for external services — everything that varies between
/// production and test environments. The repository and refresh gate are
/// created from the database pool.
pub struct AppStateConfig {
    /// `None` when no provider credentials were supplied; content endpoints
    /// then report missing configuration instead of calling out.
    pub generator: Option<Arc<dyn Generator>>,
    pub categories: Vec<CategorySpec>,
    pub converter: Option<ConversionClient>,
    pub poll_interval: Duration,
    pub poll_max_attempts: u32,
}

#[derive(Clone)]
pub struct AppState {
    pub content_repo: Arc<dyn ContentRepository>,
    pub refresh_gate: ContentRefreshGate,
    pub generator: Option<Arc<dyn Generator>>,
    pub categories: Arc<HashMap<String, CategorySpec>>,
    pub converter: Option<ConversionClient>,
    pub poll_interval: Duration,
    pub poll_max_attempts: u32,
}

impl AppState {
    /// Build the full application state from a database connection and config.
    pub fn from_database(database: &Database, config: AppStateConfig) -> Self {
        let pool = database.clone_pool();

        let content_repo: Arc<dyn ContentRepository> = Arc::new(SqlContentRepository::new(pool));
        let refresh_gate = ContentRefreshGate::new(Arc::clone(&content_repo));

        let categories = config
            .categories
            .into_iter()
            .map(|spec| (spec.slug.clone(), spec))
            .collect();

        Self {
            content_repo,
            refresh_gate,
            generator: config.generator,
            categories: Arc::new(categories),
            converter: config.converter,
            poll_interval: config.poll_interval,
            poll_max_attempts: config.poll_max_attempts,
        }
    }
}
