//! Post and comment HTTP handlers.
//!
//! ```text
//! GET  /api/v1/communities/{community_id}/posts
//! POST /api/v1/posts {"communityId":"...","title":"...","content":"..."}
//! GET  /api/v1/posts/{post_id}/comments
//! POST /api/v1/comments {"postId":"...","content":"...","parentCommentId":null}
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{CreateCommentRequest, CreatePostRequest};
use crate::domain::{
    Comment, CommentId, CommentSummary, CommunityId, Error, Post, PostId, PostSummary,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::communities::CommunityPath;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_uuid, require};

#[derive(Debug, Deserialize)]
pub(crate) struct PostPath {
    post_id: String,
}

impl PostPath {
    fn parse(self) -> Result<PostId, Error> {
        parse_uuid(&self.post_id, "postId").map(PostId::from_uuid)
    }
}

/// Post creation body.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostBody {
    pub community_id: Option<String>,
    #[schema(example = "Midterm study session")]
    pub title: Option<String>,
    pub content: Option<String>,
}

/// Comment creation body.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentBody {
    pub post_id: Option<String>,
    pub content: Option<String>,
    /// Comment being replied to, if any.
    pub parent_comment_id: Option<String>,
}

/// A post.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: String,
    pub community_id: String,
    pub author_id: String,
    /// Present in listings.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub author_name: Option<String>,
    pub title: String,
    pub content: String,
    pub created_at: String,
    pub vote_score: i64,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        Self {
            id: post.id.to_string(),
            community_id: post.community_id.to_string(),
            author_id: post.author_id.to_string(),
            author_name: None,
            title: post.title.into(),
            content: post.content.into(),
            created_at: post.created_at.to_rfc3339(),
            vote_score: post.vote_score.value(),
        }
    }
}

impl From<PostSummary> for PostResponse {
    fn from(summary: PostSummary) -> Self {
        Self {
            author_name: Some(summary.author_name.into()),
            ..Self::from(summary.post)
        }
    }
}

/// A comment.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: String,
    pub post_id: String,
    pub author_id: String,
    /// Present in listings.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub author_name: Option<String>,
    pub content: String,
    pub parent_comment_id: Option<String>,
    pub created_at: String,
    pub vote_score: i64,
}

impl From<Comment> for CommentResponse {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id.to_string(),
            post_id: comment.post_id.to_string(),
            author_id: comment.author_id.to_string(),
            author_name: None,
            content: comment.content.into(),
            parent_comment_id: comment.parent_comment_id.map(|id| id.to_string()),
            created_at: comment.created_at.to_rfc3339(),
            vote_score: comment.vote_score.value(),
        }
    }
}

impl From<CommentSummary> for CommentResponse {
    fn from(summary: CommentSummary) -> Self {
        Self {
            author_name: Some(summary.author_name.into()),
            ..Self::from(summary.comment)
        }
    }
}

/// Posts in a community, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/communities/{community_id}/posts",
    params(("community_id" = String, Path, description = "Community identifier")),
    responses(
        (status = 200, description = "Posts", body = [PostResponse]),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["content"],
    operation_id = "listPosts",
    security([])
)]
#[get("/communities/{community_id}/posts")]
pub async fn list_posts(
    state: web::Data<HttpState>,
    path: web::Path<CommunityPath>,
) -> ApiResult<web::Json<Vec<PostResponse>>> {
    let community_id = path.into_inner().parse()?;
    let posts = state.content_query.list_posts(community_id).await?;
    Ok(web::Json(posts.into_iter().map(PostResponse::from).collect()))
}

/// Publish a post.
#[utoipa::path(
    post,
    path = "/api/v1/posts",
    request_body = CreatePostBody,
    responses(
        (status = 201, description = "Post created", body = PostResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Community not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["content"],
    operation_id = "createPost"
)]
#[post("/posts")]
pub async fn create_post(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<CreatePostBody>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let community_id = require(body.community_id, "communityId")?;
    let request = CreatePostRequest {
        author: user.user_id(),
        community_id: parse_uuid(&community_id, "communityId").map(CommunityId::from_uuid)?,
        title: require(body.title, "title")?,
        content: require(body.content, "content")?,
    };
    let post = state.content.create_post(request).await?;
    Ok(HttpResponse::Created().json(PostResponse::from(post)))
}

/// Comments on a post, oldest first.
#[utoipa::path(
    get,
    path = "/api/v1/posts/{post_id}/comments",
    params(("post_id" = String, Path, description = "Post identifier")),
    responses(
        (status = 200, description = "Comments", body = [CommentResponse]),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["content"],
    operation_id = "listComments",
    security([])
)]
#[get("/posts/{post_id}/comments")]
pub async fn list_comments(
    state: web::Data<HttpState>,
    path: web::Path<PostPath>,
) -> ApiResult<web::Json<Vec<CommentResponse>>> {
    let post_id = path.into_inner().parse()?;
    let comments = state.content_query.list_comments(post_id).await?;
    Ok(web::Json(
        comments.into_iter().map(CommentResponse::from).collect(),
    ))
}

/// Comment on a post, optionally replying to another comment.
#[utoipa::path(
    post,
    path = "/api/v1/comments",
    request_body = CreateCommentBody,
    responses(
        (status = 201, description = "Comment created", body = CommentResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Post or parent comment not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["content"],
    operation_id = "createComment"
)]
#[post("/comments")]
pub async fn create_comment(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<CreateCommentBody>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let post_id = require(body.post_id, "postId")?;
    let parent_comment_id = body
        .parent_comment_id
        .map(|raw| parse_uuid(&raw, "parentCommentId").map(CommentId::from_uuid))
        .transpose()?;
    let request = CreateCommentRequest {
        author: user.user_id(),
        post_id: parse_uuid(&post_id, "postId").map(PostId::from_uuid)?,
        content: require(body.content, "content")?,
        parent_comment_id,
    };
    let comment = state.content.create_comment(request).await?;
    Ok(HttpResponse::Created().json(CommentResponse::from(comment)))
}

#[cfg(test)]
#[path = "content_tests.rs"]
mod tests;
