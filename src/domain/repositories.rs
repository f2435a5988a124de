use async_trait::async_trait;

use super::RepositoryError;
use crate::domain::content::{ContentRecord, NewContent};

#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Insert a new record, assigning an id and (unless provided) a
    /// `generated_at` timestamp. Records are never updated or deleted.
    async fn insert(&self, content: NewContent) -> Result<ContentRecord, RepositoryError>;

    /// The record with the greatest `generated_at` for a category, if any.
    async fn get_latest(&self, category: &str) -> Result<Option<ContentRecord>, RepositoryError>;

    /// Up to `limit` records for a category, newest first.
    async fn list_recent(
        &self,
        category: &str,
        limit: u32,
    ) -> Result<Vec<ContentRecord>, RepositoryError>;
}
