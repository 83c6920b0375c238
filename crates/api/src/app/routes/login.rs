use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;

use crate::app::{dto, errors::ApiError, services::AppServices};

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::LoginRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = body?;
    let (username, password) = request.into_credentials()?;

    let session =
        tokio::task::spawn_blocking(move || services.login(&username, &password, Utc::now())).await??;

    Ok((StatusCode::OK, Json(dto::session_to_json(&session))).into_response())
}
