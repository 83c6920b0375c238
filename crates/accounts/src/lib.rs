//! Account identities: registration rules and the owned-posts back-reference.

pub mod identity;

pub use identity::{Identity, RegisterAccount, Registration};
