use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::application::errors::{ApiError, AppError};
use crate::application::state::AppState;
use crate::infrastructure::convert::NewConversionJob;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ConvertRequest {
    file_name: String,
    target_format: String,
    file_content: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ConvertResponse {
    download_url: String,
    file_name: String,
}

/// Submit a file for conversion and wait for the job to finish, within the
/// configured polling budget.
#[tracing::instrument(skip(state, payload))]
pub(crate) async fn convert_file(
    State(state): State<AppState>,
    Json(payload): Json<ConvertRequest>,
) -> Result<Json<ConvertResponse>, ApiError> {
    if payload.file_name.trim().is_empty()
        || payload.target_format.trim().is_empty()
        || payload.file_content.is_empty()
    {
        return Err(
            AppError::validation("fileName, targetFormat and fileContent are required").into(),
        );
    }

    let converter = state.converter.as_ref().ok_or(AppError::Configuration)?;

    let job = NewConversionJob {
        file_name: payload.file_name,
        target_format: payload.target_format,
        file_content: payload.file_content,
    };

    let finished = converter
        .convert(job, state.poll_interval, state.poll_max_attempts)
        .await
        .map_err(AppError::from)?;

    info!(file_name = %finished.file_name, "conversion finished");
    Ok(Json(ConvertResponse {
        download_url: finished.download_url,
        file_name: finished.file_name,
    }))
}
