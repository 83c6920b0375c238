use thiserror::Error;

use bloglist_core::UserId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("user not authorized: resource is owned by another account")]
    NotOwner,
}

/// Ownership check for mutations that only the owner may perform.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
pub fn authorize_owner(actor: UserId, owner: UserId) -> Result<(), AuthzError> {
    if actor == owner {
        Ok(())
    } else {
        tracing::debug!(%actor, %owner, "ownership check denied");
        Err(AuthzError::NotOwner)
    }
}
