use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};

use bloglist_core::PostId;
use bloglist_posts::{NewPost, PostChanges};

use crate::app::{dto, errors::ApiError, services::AppServices};
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_posts).post(create_post))
        .route("/:id", put(update_post).delete(delete_post))
}

pub async fn list_posts(Extension(services): Extension<Arc<AppServices>>) -> Result<Response, ApiError> {
    let items = services
        .list_posts()?
        .iter()
        .map(dto::post_with_owner_to_json)
        .collect::<Vec<_>>();
    Ok((StatusCode::OK, Json(items)).into_response())
}

pub async fn create_post(
    Extension(services): Extension<Arc<AppServices>>,
    actor: Option<Extension<ActorContext>>,
    body: Result<Json<NewPost>, JsonRejection>,
) -> Result<Response, ApiError> {
    let actor = actor.map(|Extension(a)| a);
    // An anonymous caller gets 401 even when the body is also unusable.
    let input = match body {
        Ok(Json(input)) => input,
        Err(rejection) if actor.is_some() => return Err(rejection.into()),
        Err(_) => NewPost::default(),
    };

    let post = services.create_post(actor.as_ref(), input)?;
    Ok((StatusCode::CREATED, Json(dto::post_to_json(&post))).into_response())
}

pub async fn update_post(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<PostChanges>, JsonRejection>,
) -> Result<Response, ApiError> {
    let id: PostId = id.parse()?;
    let Json(changes) = body?;

    let post = services.update_post(&id, changes)?;
    Ok((StatusCode::OK, Json(dto::post_to_json(&post))).into_response())
}

pub async fn delete_post(
    Extension(services): Extension<Arc<AppServices>>,
    actor: Option<Extension<ActorContext>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let actor = actor.map(|Extension(a)| a);
    let id: PostId = id.parse()?;

    services.delete_post(actor.as_ref(), &id)?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
