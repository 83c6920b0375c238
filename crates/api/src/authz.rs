//! Guards for operations that need an acting identity.
//!
//! Ownership decisions themselves live in `bloglist_auth::authorize_owner`;
//! this only makes sure there is someone to decide about.

use bloglist_auth::AuthenticationError;

use crate::context::ActorContext;

/// Fail with `Unauthenticated` unless the request carries an actor.
pub fn require_actor(actor: Option<&ActorContext>) -> Result<&ActorContext, AuthenticationError> {
    actor.ok_or(AuthenticationError::Unauthenticated)
}
