//! Posts and threaded comments.

use chrono::{DateTime, Utc};

use super::text::bounded_text;
use super::{CommentId, CommunityId, PostId, UserId, UserName, VoteScore};

bounded_text!(
    /// Post headline, trimmed.
    PostTitle, field = "title", min = 1, max = 300, trimmed
);

bounded_text!(
    /// Post body, stored as written.
    PostContent, field = "content", min = 1, max = 40_000, verbatim
);

bounded_text!(
    /// Comment body, stored as written.
    CommentContent, field = "content", min = 1, max = 10_000, verbatim
);

/// Post inside a community.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    /// Post identifier.
    pub id: PostId,
    /// Owning community.
    pub community_id: CommunityId,
    /// Author account.
    pub author_id: UserId,
    /// Headline.
    pub title: PostTitle,
    /// Body text.
    pub content: PostContent,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Cached net vote score.
    pub vote_score: VoteScore,
}

/// Comment on a post, optionally replying to another comment on the same post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Comment identifier.
    pub id: CommentId,
    /// Post the comment belongs to.
    pub post_id: PostId,
    /// Author account.
    pub author_id: UserId,
    /// Body text.
    pub content: CommentContent,
    /// Parent comment for threaded replies.
    pub parent_comment_id: Option<CommentId>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Cached net vote score.
    pub vote_score: VoteScore,
}

/// Post joined with its author's display name for listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostSummary {
    /// The post.
    pub post: Post,
    /// Author display name.
    pub author_name: UserName,
}

/// Comment joined with its author's display name for listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentSummary {
    /// The comment.
    pub comment: Comment,
    /// Author display name.
    pub author_name: UserName,
}
