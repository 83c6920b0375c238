//! Password policy and salted one-way hashing (bcrypt).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// bcrypt output. Only ever compared through [`verify_password`].
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    pub fn from_hash(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("PasswordDigest(<redacted>)")
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PasswordError {
    #[error("password must be at least {min_length} characters long")]
    TooShort { min_length: usize },

    #[error("password hashing failed: {0}")]
    Hashing(String),
}

/// Length floor and work factor applied to new passwords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub cost: u32,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 3,
            cost: 10,
        }
    }
}

impl PasswordPolicy {
    pub fn check(&self, password: &str) -> Result<(), PasswordError> {
        if password.chars().count() < self.min_length {
            return Err(PasswordError::TooShort {
                min_length: self.min_length,
            });
        }
        Ok(())
    }

    /// Enforce the floor, then hash with a fresh salt.
    pub fn hash(&self, password: &str) -> Result<PasswordDigest, PasswordError> {
        self.check(password)?;
        let hash = bcrypt::hash(password, self.cost).map_err(|e| PasswordError::Hashing(e.to_string()))?;
        Ok(PasswordDigest(hash))
    }

    /// A digest of a throwaway password at this policy's cost.
    ///
    /// Verifying against it costs the same as verifying a real account, so
    /// a login for an unknown username takes as long as a wrong password.
    pub fn decoy_digest(&self) -> Result<PasswordDigest, PasswordError> {
        let hash = bcrypt::hash("decoy password", self.cost).map_err(|e| PasswordError::Hashing(e.to_string()))?;
        Ok(PasswordDigest(hash))
    }
}

pub fn verify_password(password: &str, digest: &PasswordDigest) -> Result<bool, PasswordError> {
    bcrypt::verify(password, digest.as_str()).map_err(|e| PasswordError::Hashing(e.to_string()))
}
