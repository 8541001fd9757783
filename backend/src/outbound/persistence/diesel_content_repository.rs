//! PostgreSQL-backed [`ContentRepository`] for posts and comments.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ContentRepository, ContentRepositoryError};
use crate::domain::{
    Comment, CommentId, CommentSummary, CommunityId, Post, PostId, PostSummary, UserName,
};

use super::diesel_helpers::{DbFailure, collect_rows};
use super::models::{CommentRow, NewCommentRow, NewPostRow, PostRow};
use super::pool::DbPool;
use super::schema::{comments, posts, users};

const POST_COMMUNITY_FKEY: &str = "posts_community_id_fkey";
const COMMENT_POST_FKEY: &str = "comments_post_id_fkey";
const COMMENT_PARENT_FKEY: &str = "comments_parent_comment_id_fkey";

/// Diesel implementation of the content repository.
#[derive(Clone)]
pub struct DieselContentRepository {
    pool: DbPool,
}

impl DieselContentRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_failure(failure: impl Into<DbFailure>) -> ContentRepositoryError {
    match failure.into().into_parts() {
        (true, message) => ContentRepositoryError::connection(message),
        (false, message) => ContentRepositoryError::query(message),
    }
}

fn author_name(raw: String) -> Result<UserName, String> {
    UserName::new(raw).map_err(|err| format!("stored author name is invalid: {err}"))
}

fn summarise_post((row, name): (PostRow, String)) -> Result<PostSummary, String> {
    Ok(PostSummary {
        post: Post::try_from(row)?,
        author_name: author_name(name)?,
    })
}

fn summarise_comment((row, name): (CommentRow, String)) -> Result<CommentSummary, String> {
    Ok(CommentSummary {
        comment: Comment::try_from(row)?,
        author_name: author_name(name)?,
    })
}

#[async_trait]
impl ContentRepository for DieselContentRepository {
    async fn post_exists(&self, id: &PostId) -> Result<bool, ContentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_failure)?;

        diesel::select(diesel::dsl::exists(
            posts::table.filter(posts::id.eq(id.as_uuid())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_failure)
    }

    async fn comment_exists(&self, id: &CommentId) -> Result<bool, ContentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_failure)?;

        diesel::select(diesel::dsl::exists(
            comments::table.filter(comments::id.eq(id.as_uuid())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_failure)
    }

    async fn insert_post(&self, post: &Post) -> Result<(), ContentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_failure)?;

        diesel::insert_into(posts::table)
            .values(NewPostRow::from(post))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| {
                let failure = DbFailure::from(err);
                if failure.violates_foreign_key(POST_COMMUNITY_FKEY) {
                    ContentRepositoryError::community_not_found(post.community_id.to_string())
                } else {
                    map_failure(failure)
                }
            })
    }

    async fn find_post(&self, id: &PostId) -> Result<Option<Post>, ContentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_failure)?;

        let row: Option<PostRow> = posts::table
            .filter(posts::id.eq(id.as_uuid()))
            .select(PostRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_failure)?;

        row.map(Post::try_from)
            .transpose()
            .map_err(ContentRepositoryError::query)
    }

    async fn list_posts(
        &self,
        community_id: &CommunityId,
    ) -> Result<Vec<PostSummary>, ContentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_failure)?;

        let rows: Vec<(PostRow, String)> = posts::table
            .inner_join(users::table.on(users::id.eq(posts::author_id)))
            .filter(posts::community_id.eq(community_id.as_uuid()))
            .order_by((posts::created_at.desc(), posts::id.desc()))
            .select((PostRow::as_select(), users::name))
            .load(&mut conn)
            .await
            .map_err(map_failure)?;

        collect_rows(
            rows.into_iter().map(summarise_post),
            ContentRepositoryError::query,
        )
    }

    async fn insert_comment(&self, comment: &Comment) -> Result<(), ContentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_failure)?;

        diesel::insert_into(comments::table)
            .values(NewCommentRow::from(comment))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| {
                let failure = DbFailure::from(err);
                if failure.violates_foreign_key(COMMENT_POST_FKEY) {
                    return ContentRepositoryError::post_not_found(comment.post_id.to_string());
                }
                match comment.parent_comment_id {
                    Some(parent) if failure.violates_foreign_key(COMMENT_PARENT_FKEY) => {
                        ContentRepositoryError::parent_comment_not_found(parent.to_string())
                    }
                    _ => map_failure(failure),
                }
            })
    }

    async fn find_comment(
        &self,
        id: &CommentId,
    ) -> Result<Option<Comment>, ContentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_failure)?;

        let row: Option<CommentRow> = comments::table
            .filter(comments::id.eq(id.as_uuid()))
            .select(CommentRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_failure)?;

        row.map(Comment::try_from)
            .transpose()
            .map_err(ContentRepositoryError::query)
    }

    async fn list_comments(
        &self,
        post_id: &PostId,
    ) -> Result<Vec<CommentSummary>, ContentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_failure)?;

        let rows: Vec<(CommentRow, String)> = comments::table
            .inner_join(users::table.on(users::id.eq(comments::author_id)))
            .filter(comments::post_id.eq(post_id.as_uuid()))
            .order_by((comments::created_at.asc(), comments::id.asc()))
            .select((CommentRow::as_select(), users::name))
            .load(&mut conn)
            .await
            .map_err(map_failure)?;

        collect_rows(
            rows.into_iter().map(summarise_comment),
            ContentRepositoryError::query,
        )
    }
}
