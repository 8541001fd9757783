//! Driving port for writing posts and comments.

use async_trait::async_trait;

use crate::domain::{Comment, CommentId, CommunityId, Error, Post, PostId, UserId};

/// Request to publish a post in a community.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePostRequest {
    /// Authenticated author.
    pub author: UserId,
    /// Target community.
    pub community_id: CommunityId,
    /// Raw title.
    pub title: String,
    /// Raw body.
    pub content: String,
}

/// Request to comment on a post, optionally as a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCommentRequest {
    /// Authenticated author.
    pub author: UserId,
    /// Post being discussed.
    pub post_id: PostId,
    /// Raw body.
    pub content: String,
    /// Comment being replied to; must belong to `post_id`.
    pub parent_comment_id: Option<CommentId>,
}

/// Domain use-case port for content mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentCommand: Send + Sync {
    /// Publish a post with a zero score.
    async fn create_post(&self, request: CreatePostRequest) -> Result<Post, Error>;

    /// Publish a comment with a zero score.
    async fn create_comment(&self, request: CreateCommentRequest) -> Result<Comment, Error>;
}
