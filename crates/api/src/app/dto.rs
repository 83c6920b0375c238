use serde::Deserialize;
use serde_json::{json, Value};

use bloglist_accounts::Identity;
use bloglist_core::{DomainError, DomainResult};
use bloglist_posts::{BlogStats, Post};

use crate::app::services::{IdentityWithPosts, PostWithOwner, Session};

// -------------------------
// Request DTOs
// -------------------------
//
// Post and account bodies deserialize straight into the domain inputs
// (`NewPost`, `PostChanges`, `RegisterAccount`).

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    pub fn into_credentials(self) -> DomainResult<(String, String)> {
        match (self.username, self.password) {
            (Some(username), Some(password)) => Ok((username, password)),
            _ => Err(DomainError::validation("username and password are required")),
        }
    }
}

// -------------------------
// JSON mapping helpers
// -------------------------

/// A post as stored: the owner is rendered as a bare id.
pub fn post_to_json(post: &Post) -> Value {
    json!({
        "id": post.id.to_string(),
        "title": post.title,
        "author": post.author,
        "url": post.url,
        "likes": post.likes,
        "user": post.user.to_string(),
    })
}

/// A post with its owner populated (`null` if the owner is gone).
pub fn post_with_owner_to_json(item: &PostWithOwner) -> Value {
    let mut value = post_to_json(&item.post);
    value["user"] = match &item.owner {
        Some(owner) => json!({
            "id": owner.id.to_string(),
            "username": owner.username,
            "name": owner.name,
        }),
        None => Value::Null,
    };
    value
}

fn post_summary_to_json(post: &Post) -> Value {
    json!({
        "id": post.id.to_string(),
        "title": post.title,
        "author": post.author,
        "url": post.url,
        "likes": post.likes,
    })
}

/// An identity with `blogs` as post ids. The digest is never included.
pub fn identity_to_json(identity: &Identity) -> Value {
    json!({
        "id": identity.id.to_string(),
        "username": identity.username,
        "name": identity.name,
        "blogs": identity.blogs.iter().map(|id| id.to_string()).collect::<Vec<_>>(),
    })
}

pub fn identity_with_posts_to_json(item: &IdentityWithPosts) -> Value {
    json!({
        "id": item.identity.id.to_string(),
        "username": item.identity.username,
        "name": item.identity.name,
        "blogs": item.posts.iter().map(post_summary_to_json).collect::<Vec<_>>(),
    })
}

pub fn session_to_json(session: &Session) -> Value {
    json!({
        "token": session.token,
        "username": session.identity.username,
        "name": session.identity.name,
    })
}

pub fn stats_to_json(stats: &BlogStats) -> Value {
    json!({
        "posts": stats.posts,
        "total_likes": stats.total_likes,
        "favorite": stats.favorite.as_ref().map(post_to_json),
        "most_blogs": stats.most_blogs,
        "most_likes": stats.most_likes,
    })
}
