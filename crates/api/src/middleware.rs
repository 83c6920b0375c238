use std::sync::Arc;

use axum::{
    extract::State,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use bloglist_auth::{AuthenticationError, JwtValidator};
use bloglist_infra::IdentityStore;

use crate::app::errors::ApiError;
use crate::context::ActorContext;

#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<dyn JwtValidator>,
    pub identities: Arc<dyn IdentityStore>,
}

/// Attach the acting identity when the request carries a bearer token.
///
/// No token: the request continues anonymously and handlers decide whether
/// that is acceptable. A token that fails verification, or whose subject no
/// longer exists, stops the request with 401.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(token) = extract_bearer(req.headers()).map(str::to_owned) else {
        return Ok(next.run(req).await);
    };

    let claims = state.jwt.validate(&token, Utc::now()).map_err(|e| {
        tracing::warn!(error = %e, "rejected bearer token");
        AuthenticationError::Token(e)
    })?;

    let identity = state.identities.find_by_id(&claims.sub)?.ok_or_else(|| {
        tracing::warn!(subject = %claims.sub, "token subject no longer exists");
        AuthenticationError::UnknownSubject
    })?;

    req.extensions_mut().insert(ActorContext::new(identity));

    Ok(next.run(req).await)
}

/// `Authorization: Bearer <token>`; any other shape counts as no token.
fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let header = header.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}
