use async_trait::async_trait;
use sqlx::{query, query_as};

use crate::domain::RepositoryError;
use crate::domain::content::{ContentId, ContentRecord, NewContent};
use crate::domain::repositories::ContentRepository;
use crate::infrastructure::database::DatabasePool;

#[derive(Clone)]
pub struct SqlContentRepository {
    pool: DatabasePool,
}

impl SqlContentRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ContentRow {
    id: String,
    category: String,
    title: Option<String>,
    body: String,
    generated_at: String,
}

fn parse_timestamp(s: &str) -> chrono::DateTime<chrono::Utc> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .or_else(|_| {
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%SZ")
                .map(|naive| naive.and_utc())
        })
        .unwrap_or_default()
}

impl From<ContentRow> for ContentRecord {
    fn from(row: ContentRow) -> Self {
        ContentRecord {
            id: ContentId::from_string(row.id),
            category: row.category,
            title: row.title,
            body: row.body,
            generated_at: parse_timestamp(&row.generated_at),
        }
    }
}

#[async_trait]
impl ContentRepository for SqlContentRepository {
    async fn insert(&self, content: NewContent) -> Result<ContentRecord, RepositoryError> {
        let id = ContentId::new();
        let generated_at = content.generated_at.unwrap_or_else(chrono::Utc::now);

        query(
            r"INSERT INTO content (id, category, title, body, generated_at)
               VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id.as_str())
        .bind(&content.category)
        .bind(&content.title)
        .bind(&content.body)
        .bind(generated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::unexpected(e.to_string()))?;

        Ok(ContentRecord {
            id,
            category: content.category,
            title: content.title,
            body: content.body,
            generated_at,
        })
    }

    async fn get_latest(&self, category: &str) -> Result<Option<ContentRecord>, RepositoryError> {
        let row = query_as::<_, ContentRow>(
            r"SELECT id, category, title, body, generated_at
               FROM content WHERE category = ?
               ORDER BY generated_at DESC LIMIT 1",
        )
        .bind(category)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::unexpected(e.to_string()))?;

        Ok(row.map(ContentRecord::from))
    }

    async fn list_recent(
        &self,
        category: &str,
        limit: u32,
    ) -> Result<Vec<ContentRecord>, RepositoryError> {
        let rows = query_as::<_, ContentRow>(
            r"SELECT id, category, title, body, generated_at
               FROM content WHERE category = ?
               ORDER BY generated_at DESC LIMIT ?",
        )
        .bind(category)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::unexpected(e.to_string()))?;

        Ok(rows.into_iter().map(ContentRecord::from).collect())
    }
}
