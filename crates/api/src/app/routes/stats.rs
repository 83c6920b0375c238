use std::sync::Arc;

use axum::{extract::Extension, response::IntoResponse, Json};

use crate::app::{dto, errors::ApiError, services::AppServices};

/// Aggregates over every stored post.
pub async fn summary(Extension(services): Extension<Arc<AppServices>>) -> Result<impl IntoResponse, ApiError> {
    let stats = services.stats()?;
    Ok(Json(dto::stats_to_json(&stats)))
}
