//! Blog posts: the owned record, its validation rules, and reporting
//! aggregates over collections of posts.

pub mod post;
pub mod stats;

pub use post::{NewPost, Post, PostChanges};
pub use stats::{AuthorLikes, AuthorPosts, BlogStats, StatsError};
