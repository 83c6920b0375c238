use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use crate::app::{dto, errors::ApiError};
use crate::authz::require_actor;
use crate::context::ActorContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// Echo the identity behind the presented token.
pub async fn whoami(actor: Option<Extension<ActorContext>>) -> Result<impl IntoResponse, ApiError> {
    let actor = actor.map(|Extension(a)| a);
    let actor = require_actor(actor.as_ref())?;
    Ok(Json(dto::identity_to_json(actor.identity())))
}
