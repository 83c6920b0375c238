//! Record storage abstractions.
//!
//! Each call is atomic on its own; nothing spans the two stores. Callers that
//! write to both (post creation, post deletion) must tolerate the second
//! write failing after the first one landed.

use thiserror::Error;

use bloglist_accounts::Identity;
use bloglist_core::{DomainResult, PostId, UserId};
use bloglist_posts::{Post, PostChanges};

pub mod in_memory;
pub mod record_store;

pub use in_memory::{InMemoryIdentityStore, InMemoryPostStore};
pub use record_store::InMemoryRecordStore;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backing store cannot serve requests. Not retried here.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A uniqueness constraint rejected the write.
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    /// A targeted update referenced a record that does not exist.
    #[error("record not found: {0}")]
    MissingRecord(String),
}

/// Durable storage for identities.
pub trait IdentityStore: Send + Sync {
    /// Fails with [`StoreError::DuplicateKey`] if the username is taken.
    fn insert(&self, identity: Identity) -> StoreResult<()>;
    fn find_by_id(&self, id: &UserId) -> StoreResult<Option<Identity>>;
    fn find_by_username(&self, username: &str) -> StoreResult<Option<Identity>>;
    fn list(&self) -> StoreResult<Vec<Identity>>;

    /// Atomic add-to-set on the owner's back-reference. Returns whether the
    /// list changed.
    fn add_owned_post(&self, owner: &UserId, post: PostId) -> StoreResult<bool>;

    /// Atomic remove-from-set on the owner's back-reference.
    fn remove_owned_post(&self, owner: &UserId, post: &PostId) -> StoreResult<bool>;
}

/// Durable storage for posts.
pub trait PostStore: Send + Sync {
    fn insert(&self, post: Post) -> StoreResult<()>;
    fn find_by_id(&self, id: &PostId) -> StoreResult<Option<Post>>;

    /// Resolve a list of references; ids without a record are skipped.
    fn find_many(&self, ids: &[PostId]) -> StoreResult<Vec<Post>>;
    fn list(&self) -> StoreResult<Vec<Post>>;

    /// Apply a partial update atomically against the current record.
    ///
    /// `None` if there is no such post. `Some(Err(_))` if the changes were
    /// rejected, in which case the record is untouched.
    fn apply_changes(&self, id: &PostId, changes: PostChanges) -> StoreResult<Option<DomainResult<Post>>>;

    /// Returns `false` if there was nothing to delete.
    fn delete(&self, id: &PostId) -> StoreResult<bool>;
}
