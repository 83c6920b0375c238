//! Identity record (registered account).
//!
//! `blogs` mirrors the owner reference stored on each post. It is maintained
//! by separate writes, so every mutation here is a set operation: replaying
//! an add or a remove leaves the list unchanged.

use serde::{Deserialize, Serialize};

use bloglist_auth::{PasswordDigest, PasswordError, PasswordPolicy};
use bloglist_core::{DomainError, DomainResult, Entity, PostId, UserId};

/// A registered account.
///
/// # Invariants
/// - `id` is assigned at registration and never changes.
/// - `username` is non-empty and unique across all identities (enforced by the store).
/// - `blogs` holds no duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub id: UserId,
    pub username: String,
    pub name: Option<String>,
    #[serde(skip_serializing)]
    pub password_digest: PasswordDigest,
    pub blogs: Vec<PostId>,
}

impl Identity {
    pub fn new(id: UserId, username: impl Into<String>, name: Option<String>, password_digest: PasswordDigest) -> Self {
        Self {
            id,
            username: username.into(),
            name,
            password_digest,
            blogs: Vec::new(),
        }
    }

    pub fn owns(&self, post_id: &PostId) -> bool {
        self.blogs.contains(post_id)
    }

    /// Returns `false` when the post was already listed.
    pub fn add_owned_post(&mut self, post_id: PostId) -> bool {
        if self.owns(&post_id) {
            return false;
        }
        self.blogs.push(post_id);
        true
    }

    /// Returns `false` when the post was not listed.
    pub fn remove_owned_post(&mut self, post_id: &PostId) -> bool {
        let before = self.blogs.len();
        self.blogs.retain(|p| p != post_id);
        self.blogs.len() != before
    }
}

impl Entity for Identity {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Raw registration input, as received.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterAccount {
    pub username: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
}

/// Registration input with required fields present.
#[derive(Clone)]
pub struct Registration {
    pub username: String,
    pub name: Option<String>,
    password: String,
}

impl core::fmt::Debug for Registration {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Registration")
            .field("username", &self.username)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl RegisterAccount {
    pub fn validate(self) -> DomainResult<Registration> {
        let username = self.username.filter(|u| !u.is_empty());
        let password = self.password.filter(|p| !p.is_empty());
        match (username, password) {
            (Some(username), Some(password)) => Ok(Registration {
                username,
                name: self.name,
                password,
            }),
            _ => Err(DomainError::validation("username and password are required")),
        }
    }
}

impl Registration {
    /// Apply the password policy and hash; the plaintext is dropped with `self`.
    pub fn into_identity(self, id: UserId, policy: &PasswordPolicy) -> Result<Identity, PasswordError> {
        let digest = policy.hash(&self.password)?;
        Ok(Identity::new(id, self.username, self.name, digest))
    }
}
