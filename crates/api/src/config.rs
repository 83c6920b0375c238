//! Process configuration, read once at startup.
//!
//! Business logic never reads the environment; `main` builds an [`AppConfig`]
//! and hands it to [`crate::app::build_app`].

use std::net::SocketAddr;

use bloglist_auth::PasswordPolicy;
use bloglist_observability::LogFormat;
use chrono::Duration;
use thiserror::Error;

/// Signing key used when `JWT_SECRET` is unset. Never acceptable outside dev.
pub const DEV_JWT_SECRET: &str = "dev-secret";

/// Longest accepted session lifetime (one year).
pub const MAX_TOKEN_TTL_SECS: i64 = 365 * 24 * 60 * 60;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid value for {key}: '{value}' ({reason})")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub reason: String,
}

#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub password_policy: PasswordPolicy,
    pub log_format: LogFormat,
}

impl core::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .field("password_policy", &self.password_policy)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3003)),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            token_ttl: Duration::hours(1),
            password_policy: PasswordPolicy::default(),
            log_format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let bind_addr = parse_or(&lookup, "BLOGLIST_BIND_ADDR", defaults.bind_addr)?;
        let jwt_secret = lookup("JWT_SECRET").unwrap_or(defaults.jwt_secret);
        if jwt_secret.is_empty() {
            return Err(ConfigError {
                key: "JWT_SECRET",
                value: String::new(),
                reason: "must not be empty".to_string(),
            });
        }

        let ttl_secs: i64 = parse_or(&lookup, "TOKEN_TTL_SECS", defaults.token_ttl.num_seconds())?;
        let token_ttl = Some(ttl_secs)
            .filter(|secs| (1..=MAX_TOKEN_TTL_SECS).contains(secs))
            .and_then(Duration::try_seconds)
            .ok_or_else(|| ConfigError {
                key: "TOKEN_TTL_SECS",
                value: ttl_secs.to_string(),
                reason: format!("must be between 1 and {MAX_TOKEN_TTL_SECS}"),
            })?;

        let min_length = parse_or(&lookup, "PASSWORD_MIN_LENGTH", defaults.password_policy.min_length)?;
        let cost: u32 = parse_or(&lookup, "BCRYPT_COST", defaults.password_policy.cost)?;
        if !(4..=31).contains(&cost) {
            return Err(ConfigError {
                key: "BCRYPT_COST",
                value: cost.to_string(),
                reason: "must be between 4 and 31".to_string(),
            });
        }

        let log_format = match lookup("LOG_FORMAT") {
            Some(raw) => raw.parse().map_err(|reason| ConfigError {
                key: "LOG_FORMAT",
                value: raw,
                reason,
            })?,
            None => defaults.log_format,
        };

        Ok(Self {
            bind_addr,
            jwt_secret,
            token_ttl,
            password_policy: PasswordPolicy { min_length, cost },
            log_format,
        })
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: core::str::FromStr,
    T::Err: core::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError {
            key,
            reason: e.to_string(),
            value: raw,
        }),
    }
}
