//! Port for post and comment persistence.

use async_trait::async_trait;

use crate::domain::{
    Comment, CommentId, CommentSummary, CommunityId, Post, PostId, PostSummary,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by content repository adapters.
    pub enum ContentRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "content repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "content repository query failed: {message}",
        /// A post referenced a community that does not exist.
        CommunityNotFound { community_id: String } =>
            "community {community_id} does not exist",
        /// A comment referenced a post that does not exist.
        PostNotFound { post_id: String } =>
            "post {post_id} does not exist",
        /// A reply referenced a parent comment that does not exist.
        ParentCommentNotFound { comment_id: String } =>
            "parent comment {comment_id} does not exist",
    }
}

/// Port for posts and comments.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Whether a post with this id exists.
    async fn post_exists(&self, id: &PostId) -> Result<bool, ContentRepositoryError>;

    /// Whether a comment with this id exists.
    async fn comment_exists(&self, id: &CommentId) -> Result<bool, ContentRepositoryError>;

    /// Insert a new post.
    async fn insert_post(&self, post: &Post) -> Result<(), ContentRepositoryError>;

    /// Load a post by id.
    async fn find_post(&self, id: &PostId) -> Result<Option<Post>, ContentRepositoryError>;

    /// List a community's posts with author names, newest first.
    async fn list_posts(
        &self,
        community_id: &CommunityId,
    ) -> Result<Vec<PostSummary>, ContentRepositoryError>;

    /// Insert a new comment.
    async fn insert_comment(&self, comment: &Comment) -> Result<(), ContentRepositoryError>;

    /// Load a comment by id.
    async fn find_comment(&self, id: &CommentId)
    -> Result<Option<Comment>, ContentRepositoryError>;

    /// List a post's comments with author names, oldest first.
    async fn list_comments(
        &self,
        post_id: &PostId,
    ) -> Result<Vec<CommentSummary>, ContentRepositoryError>;
}
