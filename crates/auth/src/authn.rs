use thiserror::Error;

use crate::token::TokenError;

/// Failures to establish who is making a request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthenticationError {
    /// The operation needs an actor and none was attached.
    #[error("authentication required")]
    Unauthenticated,

    #[error(transparent)]
    Token(#[from] TokenError),

    /// The token verified, but its subject no longer resolves to an identity.
    #[error("user not found")]
    UnknownSubject,

    #[error("invalid username or password")]
    InvalidCredentials,
}
