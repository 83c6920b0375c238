//! Session token service (HS256 JWT).
//!
//! Tokens are signed with a single process-wide secret handed in at
//! construction. There is no revocation list: expiry is the only way a token
//! stops being accepted.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use bloglist_core::UserId;

use crate::claims::{validate_claims, SessionClaims, TokenValidationError};

/// Why a presented token was rejected.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    /// Well-formed, but not signed by us (or with an unexpected algorithm),
    /// or carrying an impossible time window.
    #[error("token invalid")]
    Invalid,

    #[error("token expired")]
    Expired,

    /// Not a decodable JWT at all.
    #[error("token malformed")]
    Malformed,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("failed to sign session token: {0}")]
pub struct SigningError(String);

/// Verification seam used by the HTTP middleware.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenError>;
}

pub struct Hs256TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl Hs256TokenService {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Time checks happen in `validate_claims` against an injected clock.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    /// Mint a token for `subject`, valid from `now` for the configured TTL.
    pub fn issue(&self, subject: UserId, username: &str, now: DateTime<Utc>) -> Result<String, SigningError> {
        let claims = SessionClaims::new(subject, username, now, self.ttl);
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| SigningError(e.to_string()))
    }

    /// Check signature, shape and time window; returns the claims on success.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenError> {
        let data = jsonwebtoken::decode::<SessionClaims>(token, &self.decoding, &self.validation)
            .map_err(classify)?;

        validate_claims(&data.claims, now).map_err(|e| match e {
            TokenValidationError::Expired => TokenError::Expired,
            TokenValidationError::NotYetValid | TokenValidationError::InvalidTimeWindow => TokenError::Invalid,
        })?;

        Ok(data.claims)
    }
}

impl JwtValidator for Hs256TokenService {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenError> {
        self.verify(token, now)
    }
}

fn classify(err: jsonwebtoken::errors::Error) -> TokenError {
    match err.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::InvalidSignature
        | ErrorKind::InvalidAlgorithm
        | ErrorKind::ImmatureSignature
        | ErrorKind::MissingRequiredClaim(_) => TokenError::Invalid,
        _ => TokenError::Malformed,
    }
}
