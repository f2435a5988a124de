use axum::Json;
use axum::extract::{Path, Query, State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::application::errors::{ApiError, AppError};
use crate::application::state::AppState;
use crate::domain::content::{CategorySpec, ContentRecord};

const DEFAULT_HISTORY_LIMIT: u32 = 20;
const MAX_HISTORY_LIMIT: u32 = 100;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ContentResponse {
    pub id: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub body: String,
    pub generated_at: DateTime<Utc>,
    /// Whether this call generated the record (as opposed to replaying the
    /// cached one from inside the cooldown window).
    pub fresh: bool,
}

impl ContentResponse {
    fn from_record(record: ContentRecord, fresh: bool) -> Self {
        Self {
            id: record.id.to_string(),
            category: record.category,
            title: record.title,
            body: record.body,
            generated_at: record.generated_at,
            fresh,
        }
    }
}

fn lookup_category<'a>(state: &'a AppState, category: &str) -> Result<&'a CategorySpec, AppError> {
    state
        .categories
        .get(category)
        .ok_or_else(|| AppError::not_found(format!("unknown content category: {category}")))
}

/// Serve the current content for a category, generating it if the cooldown
/// has elapsed. GET and POST behave identically.
#[tracing::instrument(skip(state))]
pub(crate) async fn get_content(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<ContentResponse>, ApiError> {
    let spec = lookup_category(&state, &category)?;
    let generator = state.generator.as_ref().ok_or(AppError::Configuration)?;

    let served = state
        .refresh_gate
        .get_or_refresh(&spec.slug, spec.cooldown, &spec.prompt, generator.as_ref())
        .await
        .map_err(AppError::from)?;

    let fresh = served.is_fresh();
    info!(category = %spec.slug, fresh, "content served");
    Ok(Json(ContentResponse::from_record(
        served.into_record(),
        fresh,
    )))
}

#[derive(Debug, Deserialize)]
pub(crate) struct HistoryQuery {
    #[serde(default = "default_history_limit")]
    limit: u32,
}

fn default_history_limit() -> u32 {
    DEFAULT_HISTORY_LIMIT
}

/// List stored records for a category, newest first. Never triggers
/// generation.
#[tracing::instrument(skip(state))]
pub(crate) async fn content_history(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<ContentRecord>>, ApiError> {
    let spec = lookup_category(&state, &category)?;

    if query.limit == 0 {
        return Err(AppError::validation("limit must be greater than zero").into());
    }
    let limit = query.limit.min(MAX_HISTORY_LIMIT);

    let records = state
        .content_repo
        .list_recent(&spec.slug, limit)
        .await
        .map_err(AppError::from)?;

    Ok(Json(records))
}
