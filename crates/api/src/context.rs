use bloglist_accounts::Identity;
use bloglist_core::UserId;

/// Actor context for a request (the authenticated identity).
///
/// Inserted by the auth middleware only after the token verified and its
/// subject resolved to a live identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorContext {
    identity: Identity,
}

impl ActorContext {
    pub fn new(identity: Identity) -> Self {
        Self { identity }
    }

    pub fn user_id(&self) -> UserId {
        self.identity.id
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }
}
