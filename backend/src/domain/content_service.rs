//! Post and comment domain service.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::membership_manager::{community_not_found, map_community_repository_error};
use crate::domain::ports::{
    CommunityRepository, ContentCommand, ContentQuery, ContentRepository, ContentRepositoryError,
    CreateCommentRequest, CreatePostRequest,
};
use crate::domain::{
    Comment, CommentContent, CommentId, CommentSummary, CommunityId, Error, Post, PostContent,
    PostId, PostSummary, PostTitle, VoteScore,
};

fn post_not_found(post_id: &impl std::fmt::Display) -> Error {
    Error::not_found(format!("post {post_id} does not exist"))
}

fn parent_not_found(comment_id: &impl std::fmt::Display) -> Error {
    Error::not_found(format!("parent comment {comment_id} does not exist on this post"))
        .with_details(json!({
            "field": "parentCommentId",
            "value": comment_id.to_string(),
            "code": "parent_not_found",
        }))
}

fn map_content_repository_error(error: ContentRepositoryError) -> Error {
    match error {
        ContentRepositoryError::Connection { message } => {
            Error::internal(format!("content storage unavailable: {message}"))
        }
        ContentRepositoryError::Query { message } => {
            Error::internal(format!("content storage error: {message}"))
        }
        ContentRepositoryError::CommunityNotFound { community_id } => {
            community_not_found(&community_id)
        }
        ContentRepositoryError::PostNotFound { post_id } => post_not_found(&post_id),
        ContentRepositoryError::ParentCommentNotFound { comment_id } => {
            parent_not_found(&comment_id)
        }
    }
}

/// Content service implementing [`ContentCommand`] and [`ContentQuery`].
///
/// Posting does not require membership of the community.
#[derive(Clone)]
pub struct ContentService<C, M> {
    content: Arc<C>,
    communities: Arc<M>,
    clock: Arc<dyn Clock>,
}

impl<C, M> ContentService<C, M> {
    /// Create a content service over the content and community repositories.
    pub fn new(content: Arc<C>, communities: Arc<M>, clock: Arc<dyn Clock>) -> Self {
        Self {
            content,
            communities,
            clock,
        }
    }
}

impl<C, M> ContentService<C, M>
where
    C: ContentRepository,
    M: CommunityRepository,
{
    async fn require_community(&self, id: &CommunityId) -> Result<(), Error> {
        match self
            .communities
            .find_by_id(id)
            .await
            .map_err(map_community_repository_error)?
        {
            Some(_) => Ok(()),
            None => Err(community_not_found(id)),
        }
    }

    async fn require_post(&self, id: &PostId) -> Result<(), Error> {
        let exists = self
            .content
            .post_exists(id)
            .await
            .map_err(map_content_repository_error)?;
        if exists {
            Ok(())
        } else {
            Err(post_not_found(id))
        }
    }

    async fn require_parent_on_post(&self, parent: &CommentId, post: &PostId) -> Result<(), Error> {
        let found = self
            .content
            .find_comment(parent)
            .await
            .map_err(map_content_repository_error)?;
        match found {
            Some(comment) if comment.post_id == *post => Ok(()),
            _ => Err(parent_not_found(parent)),
        }
    }
}

#[async_trait]
impl<C, M> ContentCommand for ContentService<C, M>
where
    C: ContentRepository,
    M: CommunityRepository,
{
    async fn create_post(&self, request: CreatePostRequest) -> Result<Post, Error> {
        let title = PostTitle::new(request.title)?;
        let content = PostContent::new(request.content)?;
        self.require_community(&request.community_id).await?;

        let post = Post {
            id: PostId::random(),
            community_id: request.community_id,
            author_id: request.author,
            title,
            content,
            created_at: self.clock.utc(),
            vote_score: VoteScore::ZERO,
        };
        self.content
            .insert_post(&post)
            .await
            .map_err(map_content_repository_error)?;

        info!(post_id = %post.id, community_id = %post.community_id, "post created");
        Ok(post)
    }

    async fn create_comment(&self, request: CreateCommentRequest) -> Result<Comment, Error> {
        let content = CommentContent::new(request.content)?;
        self.require_post(&request.post_id).await?;
        if let Some(parent) = &request.parent_comment_id {
            self.require_parent_on_post(parent, &request.post_id).await?;
        }

        let comment = Comment {
            id: CommentId::random(),
            post_id: request.post_id,
            author_id: request.author,
            content,
            parent_comment_id: request.parent_comment_id,
            created_at: self.clock.utc(),
            vote_score: VoteScore::ZERO,
        };
        self.content
            .insert_comment(&comment)
            .await
            .map_err(map_content_repository_error)?;

        info!(comment_id = %comment.id, post_id = %comment.post_id, "comment created");
        Ok(comment)
    }
}

#[async_trait]
impl<C, M> ContentQuery for ContentService<C, M>
where
    C: ContentRepository,
    M: CommunityRepository,
{
    async fn list_posts(&self, community_id: CommunityId) -> Result<Vec<PostSummary>, Error> {
        self.require_community(&community_id).await?;
        self.content
            .list_posts(&community_id)
            .await
            .map_err(map_content_repository_error)
    }

    async fn list_comments(&self, post_id: PostId) -> Result<Vec<CommentSummary>, Error> {
        self.require_post(&post_id).await?;
        self.content
            .list_comments(&post_id)
            .await
            .map_err(map_content_repository_error)
    }
}

#[cfg(test)]
#[path = "content_service_tests.rs"]
mod tests;
