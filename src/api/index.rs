//! Landing page

use axum::{extract::State, response::Html};
use tracing::error;

use super::state::AppState;
use super::types::ApiError;

const BRAND_PLACEHOLDER: &str = "{{BRAND_NAME}}";

/// Serves the configured HTML page with the brand name filled in.
/// The file is read per request so it can be edited without a restart.
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let template = tokio::fs::read_to_string(&state.ui.index_path)
        .await
        .map_err(|e| {
            error!(path = %state.ui.index_path, error = %e, "Failed to read index page");
            ApiError::internal("Index page is unavailable")
        })?;

    Ok(Html(template.replace(BRAND_PLACEHOLDER, &state.ui.brand_name)))
}
