//! Application services: the operations behind the HTTP handlers.
//!
//! Each operation is synchronous and works against the store traits, so the
//! same code runs over the in-memory stores and any test double. Handlers
//! move the bcrypt-heavy calls (`register`, `login`) off the async runtime.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use bloglist_accounts::{Identity, RegisterAccount};
use bloglist_auth::{
    authorize_owner, verify_password, AuthenticationError, Hs256TokenService, JwtValidator, PasswordDigest,
    PasswordError, PasswordPolicy,
};
use bloglist_core::{DomainError, PostId, UserId};
use bloglist_infra::{IdentityStore, InMemoryIdentityStore, InMemoryPostStore, PostStore, StoreError};
use bloglist_posts::{stats, BlogStats, NewPost, Post, PostChanges};

use crate::app::errors::ApiError;
use crate::authz::require_actor;
use crate::config::AppConfig;
use crate::context::ActorContext;

/// A post together with its owner, if the owner still exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostWithOwner {
    pub post: Post,
    pub owner: Option<Identity>,
}

/// An identity with its `blogs` references resolved to posts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityWithPosts {
    pub identity: Identity,
    pub posts: Vec<Post>,
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub identity: Identity,
}

#[derive(Clone)]
pub struct AppServices {
    identities: Arc<dyn IdentityStore>,
    posts: Arc<dyn PostStore>,
    tokens: Arc<Hs256TokenService>,
    password_policy: PasswordPolicy,
    /// Checked on logins for unknown usernames.
    decoy_digest: PasswordDigest,
}

impl AppServices {
    /// Fails only if bcrypt rejects the policy's cost.
    pub fn new(
        identities: Arc<dyn IdentityStore>,
        posts: Arc<dyn PostStore>,
        tokens: Arc<Hs256TokenService>,
        password_policy: PasswordPolicy,
    ) -> Result<Self, PasswordError> {
        Ok(Self {
            identities,
            posts,
            tokens,
            decoy_digest: password_policy.decoy_digest()?,
            password_policy,
        })
    }

    /// Fresh in-memory stores wired to the configured token service.
    pub fn in_memory(config: &AppConfig) -> Result<Self, PasswordError> {
        Self::new(
            Arc::new(InMemoryIdentityStore::new()),
            Arc::new(InMemoryPostStore::new()),
            Arc::new(Hs256TokenService::new(config.jwt_secret.as_bytes(), config.token_ttl)),
            config.password_policy,
        )
    }

    pub fn token_validator(&self) -> Arc<dyn JwtValidator> {
        self.tokens.clone()
    }

    pub fn identity_store(&self) -> Arc<dyn IdentityStore> {
        self.identities.clone()
    }

    // -------------------------
    // Accounts
    // -------------------------

    /// Create an account. Blocks on bcrypt.
    pub fn register(&self, request: RegisterAccount) -> Result<Identity, ApiError> {
        let registration = request.validate()?;

        if self.identities.find_by_username(&registration.username)?.is_some() {
            return Err(DomainError::duplicate_account(&registration.username).into());
        }

        let identity = registration.into_identity(UserId::new(), &self.password_policy)?;

        // The pre-check above can race; the store's unique insert cannot.
        self.identities.insert(identity.clone()).map_err(|e| match e {
            StoreError::DuplicateKey(_) => ApiError::from(DomainError::duplicate_account(&identity.username)),
            other => other.into(),
        })?;

        tracing::info!(user_id = %identity.id, username = %identity.username, "account registered");
        Ok(identity)
    }

    /// Check credentials and mint a session token. Blocks on bcrypt.
    pub fn login(&self, username: &str, password: &str, now: DateTime<Utc>) -> Result<Session, ApiError> {
        let Some(identity) = self.identities.find_by_username(username)? else {
            // Same bcrypt work as a wrong password.
            let _ = verify_password(password, &self.decoy_digest);
            tracing::info!(%username, "login rejected: unknown username");
            return Err(AuthenticationError::InvalidCredentials.into());
        };

        if !verify_password(password, &identity.password_digest)? {
            tracing::info!(user_id = %identity.id, "login rejected: wrong password");
            return Err(AuthenticationError::InvalidCredentials.into());
        }

        let token = self.tokens.issue(identity.id, &identity.username, now)?;
        tracing::info!(user_id = %identity.id, "session issued");
        Ok(Session { token, identity })
    }

    pub fn list_identities(&self) -> Result<Vec<IdentityWithPosts>, ApiError> {
        self.identities
            .list()?
            .into_iter()
            .map(|identity| -> Result<IdentityWithPosts, ApiError> {
                let posts = self.posts.find_many(&identity.blogs)?;
                Ok(IdentityWithPosts { identity, posts })
            })
            .collect()
    }

    // -------------------------
    // Posts
    // -------------------------

    pub fn create_post(&self, actor: Option<&ActorContext>, input: NewPost) -> Result<Post, ApiError> {
        let actor = require_actor(actor)?;
        let post = input.into_post(PostId::new(), actor.user_id())?;

        self.posts.insert(post.clone())?;

        // The post is already stored; a failed back-reference is not the caller's problem.
        if let Err(e) = self.identities.add_owned_post(&post.user, post.id) {
            tracing::warn!(post_id = %post.id, owner = %post.user, error = %e, "post stored but owner's post list not updated");
        }

        tracing::info!(post_id = %post.id, owner = %post.user, "post created");
        Ok(post)
    }

    pub fn list_posts(&self) -> Result<Vec<PostWithOwner>, ApiError> {
        let owners: HashMap<UserId, Identity> = self
            .identities
            .list()?
            .into_iter()
            .map(|identity| (identity.id, identity))
            .collect();

        Ok(self
            .posts
            .list()?
            .into_iter()
            .map(|post| {
                let owner = owners.get(&post.user).cloned();
                PostWithOwner { post, owner }
            })
            .collect())
    }

    pub fn find_post(&self, id: &PostId) -> Result<Post, ApiError> {
        Ok(self.posts.find_by_id(id)?.ok_or(DomainError::NotFound)?)
    }

    /// Partial update. Any caller may update any post; only deletion checks ownership.
    pub fn update_post(&self, id: &PostId, changes: PostChanges) -> Result<Post, ApiError> {
        let applied = self.posts.apply_changes(id, changes)?.ok_or(DomainError::NotFound)?;
        let post = applied?;

        tracing::info!(post_id = %post.id, "post updated");
        Ok(post)
    }

    pub fn delete_post(&self, actor: Option<&ActorContext>, id: &PostId) -> Result<(), ApiError> {
        let actor = require_actor(actor)?;
        let post = self.find_post(id)?;
        authorize_owner(actor.user_id(), post.user)?;

        if !self.posts.delete(id)? {
            return Err(DomainError::NotFound.into());
        }

        if let Err(e) = self.identities.remove_owned_post(&post.user, id) {
            tracing::warn!(post_id = %id, owner = %post.user, error = %e, "post deleted but owner's post list not updated");
        }

        tracing::info!(post_id = %id, owner = %post.user, "post deleted");
        Ok(())
    }

    // -------------------------
    // Reporting
    // -------------------------

    pub fn stats(&self) -> Result<BlogStats, ApiError> {
        let posts = self.posts.list()?;
        Ok(stats::summarize(&posts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bloglist_core::DomainResult;
    use bloglist_infra::StoreResult;
    use chrono::Duration;

    fn config() -> AppConfig {
        AppConfig {
            jwt_secret: "services-test-secret".to_string(),
            password_policy: PasswordPolicy { min_length: 3, cost: 4 },
            ..AppConfig::default()
        }
    }

    fn services() -> AppServices {
        AppServices::in_memory(&config()).unwrap()
    }

    fn register(services: &AppServices, username: &str) -> Identity {
        services
            .register(RegisterAccount {
                username: Some(username.to_string()),
                name: Some(format!("{username} name")),
                password: Some("sekret".to_string()),
            })
            .unwrap()
    }

    fn actor(services: &AppServices, identity: &Identity) -> ActorContext {
        ActorContext::new(services.identity_store().find_by_id(&identity.id).unwrap().unwrap())
    }

    fn new_post(title: &str, likes: i64) -> NewPost {
        NewPost {
            title: Some(title.to_string()),
            author: Some("Edsger W. Dijkstra".to_string()),
            url: Some("http://example.com/".to_string()),
            likes: Some(likes),
        }
    }

    /// Identity store whose back-reference writes always fail.
    struct BrokenBackReferences(InMemoryIdentityStore);

    impl IdentityStore for BrokenBackReferences {
        fn insert(&self, identity: Identity) -> StoreResult<()> {
            self.0.insert(identity)
        }
        fn find_by_id(&self, id: &UserId) -> StoreResult<Option<Identity>> {
            self.0.find_by_id(id)
        }
        fn find_by_username(&self, username: &str) -> StoreResult<Option<Identity>> {
            self.0.find_by_username(username)
        }
        fn list(&self) -> StoreResult<Vec<Identity>> {
            self.0.list()
        }
        fn add_owned_post(&self, _owner: &UserId, _post: PostId) -> StoreResult<bool> {
            Err(StoreError::Unavailable("back-reference writes disabled".into()))
        }
        fn remove_owned_post(&self, _owner: &UserId, _post: &PostId) -> StoreResult<bool> {
            Err(StoreError::Unavailable("back-reference writes disabled".into()))
        }
    }

    /// Post store where another writer retitles the post just after every
    /// read and just before every update.
    struct RetitledConcurrently(InMemoryPostStore);

    impl RetitledConcurrently {
        fn retitle(&self, id: &PostId) -> StoreResult<()> {
            let changes = PostChanges {
                title: Some("concurrent title".into()),
                ..Default::default()
            };
            self.0.apply_changes(id, changes).map(|_| ())
        }
    }

    impl PostStore for RetitledConcurrently {
        fn insert(&self, post: Post) -> StoreResult<()> {
            self.0.insert(post)
        }
        fn find_by_id(&self, id: &PostId) -> StoreResult<Option<Post>> {
            let snapshot = self.0.find_by_id(id)?;
            self.retitle(id)?;
            Ok(snapshot)
        }
        fn find_many(&self, ids: &[PostId]) -> StoreResult<Vec<Post>> {
            self.0.find_many(ids)
        }
        fn list(&self) -> StoreResult<Vec<Post>> {
            self.0.list()
        }
        fn apply_changes(&self, id: &PostId, changes: PostChanges) -> StoreResult<Option<DomainResult<Post>>> {
            self.retitle(id)?;
            self.0.apply_changes(id, changes)
        }
        fn delete(&self, id: &PostId) -> StoreResult<bool> {
            self.0.delete(id)
        }
    }

    #[test]
    fn register_then_login_then_create_then_list() {
        let services = services();
        let root = register(&services, "root");

        let session = services.login("root", "sekret", Utc::now()).unwrap();
        let claims = services.token_validator().validate(&session.token, Utc::now()).unwrap();
        assert_eq!(claims.sub, root.id);

        let actor = actor(&services, &root);
        let post = services.create_post(Some(&actor), new_post("Go To Statement", 5)).unwrap();
        assert_eq!(post.user, root.id);

        let listed = services.list_posts().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].owner.as_ref().unwrap().username, "root");

        let users = services.list_identities().unwrap();
        assert_eq!(users[0].posts, vec![post]);
    }

    #[test]
    fn create_without_actor_changes_nothing() {
        let services = services();
        let err = services.create_post(None, new_post("anon", 0)).unwrap_err();
        assert!(matches!(err, ApiError::Authentication(AuthenticationError::Unauthenticated)));
        assert!(services.list_posts().unwrap().is_empty());
    }

    #[test]
    fn missing_actor_is_reported_before_validation() {
        let services = services();
        let err = services.create_post(None, NewPost::default()).unwrap_err();
        assert!(matches!(err, ApiError::Authentication(AuthenticationError::Unauthenticated)));
    }

    #[test]
    fn duplicate_username_is_rejected() {
        let services = services();
        register(&services, "root");
        let err = services
            .register(RegisterAccount {
                username: Some("root".into()),
                name: None,
                password: Some("another".into()),
            })
            .unwrap_err();
        assert!(matches!(err, ApiError::Domain(DomainError::DuplicateAccount(_))));
        assert_eq!(services.list_identities().unwrap().len(), 1);
    }

    #[test]
    fn duplicate_check_precedes_password_policy() {
        let services = services();
        register(&services, "root");
        let err = services
            .register(RegisterAccount {
                username: Some("root".into()),
                name: None,
                password: Some("pw".into()),
            })
            .unwrap_err();
        assert!(matches!(err, ApiError::Domain(DomainError::DuplicateAccount(_))));
    }

    #[test]
    fn short_password_is_rejected() {
        let services = services();
        let err = services
            .register(RegisterAccount {
                username: Some("root".into()),
                name: None,
                password: Some("pw".into()),
            })
            .unwrap_err();
        assert!(matches!(err, ApiError::Domain(DomainError::WeakPassword { min_length: 3 })));
        assert!(services.list_identities().unwrap().is_empty());
    }

    #[test]
    fn login_failures_are_indistinguishable() {
        let services = services();
        register(&services, "root");

        let wrong_password = services.login("root", "wrong", Utc::now()).unwrap_err();
        let unknown_user = services.login("nobody", "sekret", Utc::now()).unwrap_err();
        for err in [wrong_password, unknown_user] {
            assert!(matches!(err, ApiError::Authentication(AuthenticationError::InvalidCredentials)));
        }
    }

    #[test]
    fn issued_tokens_expire_after_the_configured_ttl() {
        let services = services();
        register(&services, "root");
        let issued_at = Utc::now();
        let session = services.login("root", "sekret", issued_at).unwrap();

        let later = issued_at + config().token_ttl + Duration::seconds(1);
        let err = services.token_validator().validate(&session.token, later).unwrap_err();
        assert_eq!(err, bloglist_auth::TokenError::Expired);
    }

    #[test]
    fn only_the_owner_may_delete() {
        let services = services();
        let alice = register(&services, "alice");
        let bob = register(&services, "bob");
        let post = services
            .create_post(Some(&actor(&services, &alice)), new_post("alice's", 1))
            .unwrap();

        let err = services.delete_post(Some(&actor(&services, &bob)), &post.id).unwrap_err();
        assert!(matches!(err, ApiError::Authorization(_)));
        assert_eq!(services.find_post(&post.id).unwrap(), post);

        let err = services.delete_post(None, &post.id).unwrap_err();
        assert!(matches!(err, ApiError::Authentication(AuthenticationError::Unauthenticated)));

        services.delete_post(Some(&actor(&services, &alice)), &post.id).unwrap();
        assert!(matches!(services.find_post(&post.id), Err(ApiError::Domain(DomainError::NotFound))));
    }

    #[test]
    fn delete_removes_the_back_reference() {
        let services = services();
        let alice = register(&services, "alice");
        let post = services
            .create_post(Some(&actor(&services, &alice)), new_post("short-lived", 0))
            .unwrap();
        assert!(actor(&services, &alice).identity().owns(&post.id));

        services.delete_post(Some(&actor(&services, &alice)), &post.id).unwrap();
        assert!(!actor(&services, &alice).identity().owns(&post.id));
    }

    #[test]
    fn deleting_a_missing_post_is_not_found() {
        let services = services();
        let alice = register(&services, "alice");
        let err = services
            .delete_post(Some(&actor(&services, &alice)), &PostId::new())
            .unwrap_err();
        assert!(matches!(err, ApiError::Domain(DomainError::NotFound)));
    }

    #[test]
    fn update_does_not_check_ownership() {
        let services = services();
        let alice = register(&services, "alice");
        let post = services
            .create_post(Some(&actor(&services, &alice)), new_post("popular", 1))
            .unwrap();

        let updated = services
            .update_post(
                &post.id,
                PostChanges {
                    likes: Some(42),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.likes, 42);
        assert_eq!(updated.title, "popular");
        assert_eq!(services.find_post(&post.id).unwrap().likes, 42);
    }

    #[test]
    fn update_keeps_fields_written_by_others() {
        let config = config();
        let inner = InMemoryPostStore::new();
        let mut original = new_post("orig", 0).into_post(PostId::new(), UserId::new()).unwrap();
        inner.insert(original.clone()).unwrap();
        let services = AppServices::new(
            Arc::new(InMemoryIdentityStore::new()),
            Arc::new(RetitledConcurrently(inner)),
            Arc::new(Hs256TokenService::new(config.jwt_secret.as_bytes(), config.token_ttl)),
            config.password_policy,
        )
        .unwrap();

        let updated = services
            .update_post(
                &original.id,
                PostChanges {
                    likes: Some(5),
                    ..Default::default()
                },
            )
            .unwrap();

        original.title = "concurrent title".into();
        original.likes = 5;
        assert_eq!(updated, original);
        assert_eq!(services.list_posts().unwrap()[0].post, original);
    }

    #[test]
    fn rejected_update_is_a_validation_error() {
        let services = services();
        let alice = register(&services, "alice");
        let post = services
            .create_post(Some(&actor(&services, &alice)), new_post("steady", 2))
            .unwrap();

        let err = services
            .update_post(
                &post.id,
                PostChanges {
                    likes: Some(-3),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, ApiError::Domain(DomainError::Validation(_))));
        assert_eq!(services.list_posts().unwrap()[0].post, post);
    }

    #[test]
    fn updating_a_missing_post_is_not_found() {
        let services = services();
        let err = services.update_post(&PostId::new(), PostChanges::default()).unwrap_err();
        assert!(matches!(err, ApiError::Domain(DomainError::NotFound)));
    }

    #[test]
    fn creation_survives_a_failed_back_reference() {
        let config = config();
        let services = AppServices::new(
            Arc::new(BrokenBackReferences(InMemoryIdentityStore::new())),
            Arc::new(InMemoryPostStore::new()),
            Arc::new(Hs256TokenService::new(config.jwt_secret.as_bytes(), config.token_ttl)),
            config.password_policy,
        )
        .unwrap();
        let alice = register(&services, "alice");

        let post = services
            .create_post(Some(&actor(&services, &alice)), new_post("orphaned", 0))
            .unwrap();
        assert_eq!(services.find_post(&post.id).unwrap(), post);
        assert!(services.list_identities().unwrap()[0].posts.is_empty());

        services.delete_post(Some(&actor(&services, &alice)), &post.id).unwrap();
        assert!(services.list_posts().unwrap().is_empty());
    }

    #[test]
    fn dangling_references_are_not_listed() {
        let services = services();
        let alice = register(&services, "alice");
        services
            .identity_store()
            .add_owned_post(&alice.id, PostId::new())
            .unwrap();

        let listed = services.list_identities().unwrap();
        assert!(listed[0].posts.is_empty());
    }

    #[test]
    fn stats_cover_all_posts() {
        let services = services();
        let alice = register(&services, "alice");
        let actor = actor(&services, &alice);
        services.create_post(Some(&actor), new_post("a", 3)).unwrap();
        let best = services.create_post(Some(&actor), new_post("b", 9)).unwrap();

        let stats = services.stats().unwrap();
        assert_eq!(stats.posts, 2);
        assert_eq!(stats.total_likes, 12);
        assert_eq!(stats.favorite, Some(best));
    }
}
