use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use bloglist_core::Entity;

use super::{StoreError, StoreResult};

/// In-memory keyed record store for tests/dev.
///
/// Listing returns records in insertion order.
#[derive(Debug)]
pub struct InMemoryRecordStore<E: Entity> {
    inner: RwLock<Records<E>>,
}

#[derive(Debug)]
struct Records<E: Entity> {
    by_id: HashMap<E::Id, E>,
    order: Vec<E::Id>,
}

impl<E: Entity> InMemoryRecordStore<E> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Records {
                by_id: HashMap::new(),
                order: Vec::new(),
            }),
        }
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Records<E>>> {
        self.inner
            .read()
            .map_err(|_| StoreError::Unavailable("record store lock poisoned".to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Records<E>>> {
        self.inner
            .write()
            .map_err(|_| StoreError::Unavailable("record store lock poisoned".to_string()))
    }
}

impl<E: Entity> Records<E> {
    fn push(&mut self, record: E) -> StoreResult<()> {
        let id = *record.id();
        if self.by_id.contains_key(&id) {
            return Err(StoreError::DuplicateKey(format!("{id:?}")));
        }
        self.by_id.insert(id, record);
        self.order.push(id);
        Ok(())
    }
}

impl<E: Entity> Default for InMemoryRecordStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> InMemoryRecordStore<E>
where
    E: Entity + Clone,
{
    pub fn get(&self, id: &E::Id) -> StoreResult<Option<E>> {
        Ok(self.read()?.by_id.get(id).cloned())
    }

    pub fn list(&self) -> StoreResult<Vec<E>> {
        let records = self.read()?;
        Ok(records.order.iter().filter_map(|id| records.by_id.get(id).cloned()).collect())
    }

    pub fn filter(&self, mut pred: impl FnMut(&E) -> bool) -> StoreResult<Vec<E>> {
        let records = self.read()?;
        Ok(records
            .order
            .iter()
            .filter_map(|id| records.by_id.get(id))
            .filter(|r| pred(*r))
            .cloned()
            .collect())
    }

    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.read()?.order.len())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Insert a new record; rejects an existing id.
    pub fn insert(&self, record: E) -> StoreResult<()> {
        self.write()?.push(record)
    }

    /// Insert a new record unless another record shares its id or `key`.
    ///
    /// The check and the insert happen under the same write lock.
    pub fn insert_unique_by<K, F>(&self, record: E, key: F) -> StoreResult<()>
    where
        K: PartialEq + core::fmt::Debug,
        F: Fn(&E) -> K,
    {
        let mut records = self.write()?;
        let wanted = key(&record);
        if records.by_id.values().any(|r| key(r) == wanted) {
            return Err(StoreError::DuplicateKey(format!("{wanted:?}")));
        }
        records.push(record)
    }

    /// Mutate one record in place under the write lock. `None` if absent.
    pub fn modify<R>(&self, id: &E::Id, f: impl FnOnce(&mut E) -> R) -> StoreResult<Option<R>> {
        let mut records = self.write()?;
        Ok(records.by_id.get_mut(id).map(f))
    }

    pub fn remove(&self, id: &E::Id) -> StoreResult<bool> {
        let mut records = self.write()?;
        if records.by_id.remove(id).is_none() {
            return Ok(false);
        }
        records.order.retain(|existing| existing != id);
        Ok(true)
    }
}
