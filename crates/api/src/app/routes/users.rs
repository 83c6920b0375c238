use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use bloglist_accounts::RegisterAccount;

use crate::app::{dto, errors::ApiError, services::AppServices};

pub fn router() -> Router {
    Router::new().route("/", get(list_users).post(register_user))
}

pub async fn register_user(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<RegisterAccount>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = body?;

    // bcrypt is CPU-bound; keep it off the async workers.
    let identity = tokio::task::spawn_blocking(move || services.register(request)).await??;

    Ok((StatusCode::CREATED, Json(dto::identity_to_json(&identity))).into_response())
}

pub async fn list_users(Extension(services): Extension<Arc<AppServices>>) -> Result<Response, ApiError> {
    let items = services
        .list_identities()?
        .iter()
        .map(dto::identity_with_posts_to_json)
        .collect::<Vec<_>>();
    Ok((StatusCode::OK, Json(items)).into_response())
}
