//! Reporting aggregates over a snapshot of posts.
//!
//! Everything here is a pure function of its input slice: no IO, no mutation.
//! Ties always go to whatever appears first in the slice.

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

use crate::post::Post;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StatsError {
    #[error("no posts to choose from")]
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorPosts {
    pub author: Option<String>,
    pub blogs: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorLikes {
    pub author: Option<String>,
    pub likes: u64,
}

/// All aggregates at once, for the reporting endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlogStats {
    pub posts: usize,
    pub total_likes: u64,
    pub favorite: Option<Post>,
    pub most_blogs: Option<AuthorPosts>,
    pub most_likes: Option<AuthorLikes>,
}

/// Sum of likes, saturating at `u64::MAX`.
pub fn total_likes(posts: &[Post]) -> u64 {
    posts.iter().fold(0u64, |sum, p| sum.saturating_add(p.likes))
}

/// The post with the most likes. Undefined for an empty slice, so it fails.
pub fn favorite_post(posts: &[Post]) -> Result<&Post, StatsError> {
    let mut iter = posts.iter();
    let first = iter.next().ok_or(StatsError::Empty)?;
    Ok(iter.fold(first, |best, p| if p.likes > best.likes { p } else { best }))
}

pub fn author_with_most_posts(posts: &[Post]) -> Option<AuthorPosts> {
    // Counts kept in first-appearance order so the strict `>` below keeps the
    // earliest author on ties.
    let mut order: Vec<(Option<&str>, usize)> = Vec::new();
    let mut index: HashMap<Option<&str>, usize> = HashMap::new();

    for post in posts {
        let author = post.author.as_deref();
        match index.get(&author) {
            Some(&i) => order[i].1 += 1,
            None => {
                index.insert(author, order.len());
                order.push((author, 1));
            }
        }
    }

    let mut iter = order.into_iter();
    let first = iter.next()?;
    let (author, blogs) = iter.fold(first, |best, cur| if cur.1 > best.1 { cur } else { best });
    Some(AuthorPosts {
        author: author.map(str::to_owned),
        blogs,
    })
}

/// Author of the single most-liked post, with that post's likes.
///
/// This is deliberately not a per-author sum: two posts with 10 likes each
/// lose to one post with 15.
pub fn author_with_most_likes(posts: &[Post]) -> Option<AuthorLikes> {
    let top = favorite_post(posts).ok()?;
    Some(AuthorLikes {
        author: top.author.clone(),
        likes: top.likes,
    })
}

pub fn summarize(posts: &[Post]) -> BlogStats {
    BlogStats {
        posts: posts.len(),
        total_likes: total_likes(posts),
        favorite: favorite_post(posts).ok().cloned(),
        most_blogs: author_with_most_posts(posts),
        most_likes: author_with_most_likes(posts),
    }
}
