//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: the operations, over the identity/post stores and token service
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: request DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use bloglist_auth::PasswordError;

use crate::config::AppConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router over fresh in-memory stores (entrypoint used by `main.rs`).
pub fn build_app(config: &AppConfig) -> Result<Router, PasswordError> {
    Ok(build_router(Arc::new(services::AppServices::in_memory(config)?)))
}

/// Build the router over an existing set of services.
pub fn build_router(services: Arc<services::AppServices>) -> Router {
    let auth_state = middleware::AuthState {
        jwt: services.token_validator(),
        identities: services.identity_store(),
    };

    let api = routes::router().layer(
        ServiceBuilder::new()
            .layer(Extension(services))
            .layer(axum::middleware::from_fn_with_state(auth_state, middleware::auth_middleware)),
    );

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(api)
}
