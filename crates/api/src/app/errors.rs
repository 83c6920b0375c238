use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use thiserror::Error;

use bloglist_auth::{AuthenticationError, AuthzError, PasswordError, SigningError, TokenError};
use bloglist_core::DomainError;
use bloglist_infra::StoreError;

/// Everything a request can fail with, mapped to a status in one place.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Authentication(#[from] AuthenticationError),

    /// Authenticated, but not allowed to touch this resource.
    #[error(transparent)]
    Authorization(#[from] AuthzError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        Self::Authentication(AuthenticationError::Token(err))
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::TooShort { min_length } => Self::Domain(DomainError::WeakPassword { min_length }),
            PasswordError::Hashing(msg) => Self::Internal(msg),
        }
    }
}

impl From<SigningError> for ApiError {
    fn from(err: SigningError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Domain(DomainError::validation(rejection.body_text()))
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Internal(format!("background task failed: {err}"))
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        self.parts().0
    }

    fn parts(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Domain(e) => match e {
                DomainError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
                DomainError::DuplicateAccount(_) => (StatusCode::BAD_REQUEST, "duplicate_account"),
                DomainError::WeakPassword { .. } => (StatusCode::BAD_REQUEST, "weak_password"),
                DomainError::InvalidId(_) => (StatusCode::BAD_REQUEST, "invalid_id"),
                DomainError::NotFound => (StatusCode::NOT_FOUND, "not_found"),
            },
            ApiError::Authentication(e) => match e {
                AuthenticationError::Unauthenticated => (StatusCode::UNAUTHORIZED, "unauthenticated"),
                AuthenticationError::Token(TokenError::Invalid) => (StatusCode::UNAUTHORIZED, "invalid_token"),
                AuthenticationError::Token(TokenError::Expired) => (StatusCode::UNAUTHORIZED, "expired_token"),
                AuthenticationError::Token(TokenError::Malformed) => (StatusCode::UNAUTHORIZED, "malformed_token"),
                AuthenticationError::UnknownSubject => (StatusCode::UNAUTHORIZED, "unknown_subject"),
                AuthenticationError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "invalid_credentials"),
            },
            // Same status as authentication failures; the code keeps them apart.
            ApiError::Authorization(AuthzError::NotOwner) => (StatusCode::UNAUTHORIZED, "unauthorized"),
            // Usernames are the only unique key.
            ApiError::Store(StoreError::DuplicateKey(_)) => (StatusCode::BAD_REQUEST, "duplicate_account"),
            ApiError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "store_unavailable"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, code) = self.parts();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            // Internals stay in the log.
            return json_error(status, code, "internal server error");
        }
        json_error(status, code, self.to_string())
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
