//! `bloglist-auth`: authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: it knows how to
//! mint and check session tokens, hash passwords, and decide ownership, but not
//! where identities live.

pub mod authn;
pub mod authorize;
pub mod claims;
pub mod password;
pub mod token;

pub use authn::AuthenticationError;
pub use authorize::{authorize_owner, AuthzError};
pub use claims::{validate_claims, SessionClaims, TokenValidationError};
pub use password::{verify_password, PasswordDigest, PasswordError, PasswordPolicy};
pub use token::{Hs256TokenService, JwtValidator, SigningError, TokenError};
