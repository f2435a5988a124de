use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{Duration, Utc};
use thiserror::Error;
use tracing::info;

use crate::domain::RepositoryError;
use crate::domain::content::{ContentRecord, NewContent, split_title_body};
use crate::domain::repositories::ContentRepository;
use crate::infrastructure::generator::{GenerationError, Generator};

#[derive(Debug, Error)]
pub enum RefreshError {
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Store(#[from] RepositoryError),
}

/// How a record was served: freshly generated, or replayed from the store
/// because the category is still inside its cooldown window. "Still cooling
/// down" is a normal outcome, not an error.
#[derive(Debug, Clone)]
pub enum Served {
    Fresh(ContentRecord),
    Cached(ContentRecord),
}

impl Served {
    pub fn record(&self) -> &ContentRecord {
        match self {
            Served::Fresh(record) | Served::Cached(record) => record,
        }
    }

    pub fn into_record(self) -> ContentRecord {
        match self {
            Served::Fresh(record) | Served::Cached(record) => record,
        }
    }

    pub fn is_fresh(&self) -> bool {
        matches!(self, Served::Fresh(_))
    }
}

/// Serves the latest content for a category, regenerating it at most once per
/// cooldown window.
///
/// The check-then-insert sequence is a read-check-write race under concurrent
/// callers, so all of it runs under a per-category async lock: concurrent
/// requests for the same category serialize, and the losers observe the
/// winner's record as cached.
#[derive(Clone)]
pub struct ContentRefreshGate {
    repo: Arc<dyn ContentRepository>,
    locks: Arc<Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>>,
}

impl ContentRefreshGate {
    pub fn new(repo: Arc<dyn ContentRepository>) -> Self {
        Self {
            repo,
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Return the latest record for `category`, generating a new one only if
    /// the stored record is older than `cooldown` (or none exists).
    ///
    /// A failed generation inserts nothing and leaves the cooldown timer
    /// unchanged, so the next call retries immediately.
    pub async fn get_or_refresh(
        &self,
        category: &str,
        cooldown: Duration,
        prompt: &str,
        generator: &dyn Generator,
    ) -> Result<Served, RefreshError> {
        let lock = self.category_lock(category);
        let _guard = lock.lock().await;

        let now = Utc::now();
        if let Some(latest) = self.repo.get_latest(category).await?
            && latest.is_fresh(cooldown, now)
        {
            info!(category, generated_at = %latest.generated_at, "serving cached content");
            return Ok(Served::Cached(latest));
        }

        let generated = generator.generate(prompt).await?;
        let (title, body) = match generated.title {
            Some(title) => (title, generated.body),
            None => split_title_body(&generated.body),
        };

        let record = self
            .repo
            .insert(NewContent {
                category: category.to_string(),
                title: Some(title),
                body,
                generated_at: Some(now),
            })
            .await?;

        info!(category, id = %record.id, "generated and stored new content");
        Ok(Served::Fresh(record))
    }

    fn category_lock(&self, category: &str) -> Arc<tokio::sync::Mutex<()>> {
        // The outer lock only guards map access and is never held across await.
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(category.to_string()).or_default())
    }
}
