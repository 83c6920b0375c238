use axum::{routing::get, Router};

pub mod login;
pub mod posts;
pub mod stats;
pub mod system;
pub mod users;

/// Router for every endpoint behind the auth middleware.
///
/// The middleware only attaches an actor; each handler decides whether one
/// is required.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/stats", get(stats::summary))
        .route("/login", axum::routing::post(login::login))
        .nest("/posts", posts::router())
        .nest("/users", users::router())
}
