//! Driving port for reading posts and comments.

use async_trait::async_trait;

use crate::domain::{CommentSummary, CommunityId, Error, PostId, PostSummary};

/// Domain use-case port for content reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentQuery: Send + Sync {
    /// Posts in a community, newest first.
    async fn list_posts(&self, community_id: CommunityId) -> Result<Vec<PostSummary>, Error>;

    /// Comments on a post, oldest first.
    async fn list_comments(&self, post_id: PostId) -> Result<Vec<CommentSummary>, Error>;
}
