use serde::{Deserialize, Serialize};

use bloglist_core::{DomainError, DomainResult, Entity, PostId, UserId};

/// A blog entry.
///
/// # Invariants
/// - `title` and `url` are non-empty.
/// - `user` (the owner) is set at creation and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    /// Free-text attribution; unrelated to ownership.
    pub author: Option<String>,
    pub url: String,
    pub likes: u64,
    pub user: UserId,
}

impl Entity for Post {
    type Id = PostId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Creation input, as received.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewPost {
    pub title: Option<String>,
    pub author: Option<String>,
    pub url: Option<String>,
    pub likes: Option<i64>,
}

impl NewPost {
    /// Validate and build the record owned by `owner`.
    pub fn into_post(self, id: PostId, owner: UserId) -> DomainResult<Post> {
        let title = self.title.filter(|t| !t.is_empty());
        let url = self.url.filter(|u| !u.is_empty());
        let (Some(title), Some(url)) = (title, url) else {
            return Err(DomainError::validation("title and url are required"));
        };

        Ok(Post {
            id,
            title,
            author: self.author,
            url,
            likes: self.likes.map(non_negative_likes).transpose()?.unwrap_or(0),
            user: owner,
        })
    }
}

/// Replacement values for the mutable fields. `None` keeps the current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostChanges {
    pub title: Option<String>,
    pub author: Option<String>,
    pub url: Option<String>,
    pub likes: Option<i64>,
}

impl PostChanges {
    /// Apply to `post`; on error `post` is left untouched.
    pub fn apply(self, post: &mut Post) -> DomainResult<()> {
        if matches!(self.title.as_deref(), Some("")) || matches!(self.url.as_deref(), Some("")) {
            return Err(DomainError::validation("title and url must not be empty"));
        }
        let likes = self.likes.map(non_negative_likes).transpose()?;

        if let Some(title) = self.title {
            post.title = title;
        }
        if let Some(author) = self.author {
            post.author = Some(author);
        }
        if let Some(url) = self.url {
            post.url = url;
        }
        if let Some(likes) = likes {
            post.likes = likes;
        }
        Ok(())
    }
}

fn non_negative_likes(likes: i64) -> DomainResult<u64> {
    u64::try_from(likes).map_err(|_| DomainError::validation("likes must be a non-negative integer"))
}
