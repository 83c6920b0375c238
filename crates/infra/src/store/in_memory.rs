use bloglist_accounts::Identity;
use bloglist_core::{DomainResult, PostId, UserId};
use bloglist_posts::{Post, PostChanges};

use super::{IdentityStore, InMemoryRecordStore, PostStore, StoreError, StoreResult};

#[derive(Debug, Default)]
pub struct InMemoryIdentityStore {
    records: InMemoryRecordStore<Identity>,
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdentityStore for InMemoryIdentityStore {
    fn insert(&self, identity: Identity) -> StoreResult<()> {
        self.records.insert_unique_by(identity, |i| i.username.clone())
    }

    fn find_by_id(&self, id: &UserId) -> StoreResult<Option<Identity>> {
        self.records.get(id)
    }

    fn find_by_username(&self, username: &str) -> StoreResult<Option<Identity>> {
        Ok(self.records.filter(|i| i.username == username)?.into_iter().next())
    }

    fn list(&self) -> StoreResult<Vec<Identity>> {
        self.records.list()
    }

    fn add_owned_post(&self, owner: &UserId, post: PostId) -> StoreResult<bool> {
        self.records
            .modify(owner, |identity| identity.add_owned_post(post))?
            .ok_or_else(|| StoreError::MissingRecord(format!("identity {owner}")))
    }

    fn remove_owned_post(&self, owner: &UserId, post: &PostId) -> StoreResult<bool> {
        self.records
            .modify(owner, |identity| identity.remove_owned_post(post))?
            .ok_or_else(|| StoreError::MissingRecord(format!("identity {owner}")))
    }
}

#[derive(Debug, Default)]
pub struct InMemoryPostStore {
    records: InMemoryRecordStore<Post>,
}

impl InMemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PostStore for InMemoryPostStore {
    fn insert(&self, post: Post) -> StoreResult<()> {
        self.records.insert(post)
    }

    fn find_by_id(&self, id: &PostId) -> StoreResult<Option<Post>> {
        self.records.get(id)
    }

    fn find_many(&self, ids: &[PostId]) -> StoreResult<Vec<Post>> {
        let mut found = Vec::with_capacity(ids.len());
        for id in ids {
            match self.records.get(id)? {
                Some(post) => found.push(post),
                None => tracing::debug!(post_id = %id, "skipping dangling post reference"),
            }
        }
        Ok(found)
    }

    fn list(&self) -> StoreResult<Vec<Post>> {
        self.records.list()
    }

    fn apply_changes(&self, id: &PostId, changes: PostChanges) -> StoreResult<Option<DomainResult<Post>>> {
        self.records
            .modify(id, |post| changes.apply(post).map(|()| post.clone()))
    }

    fn delete(&self, id: &PostId) -> StoreResult<bool> {
        self.records.remove(id)
    }
}
