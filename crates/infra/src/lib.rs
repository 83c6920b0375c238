//! Infrastructure layer: the persistence interface the services depend on,
//! plus the in-memory implementation used by the binary and the tests.

pub mod store;

pub use store::{
    InMemoryIdentityStore, InMemoryPostStore, InMemoryRecordStore, IdentityStore, PostStore, StoreError,
    StoreResult,
};
