pub(crate) mod content;
pub(crate) mod convert;

use axum::routing::{get, post};

use crate::application::state::AppState;

pub(super) fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route(
            "/content/{category}",
            get(content::get_content).post(content::get_content),
        )
        .route("/content/{category}/history", get(content::content_history))
        .route("/convert", post(convert::convert_file))
}
