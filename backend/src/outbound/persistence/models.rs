//! Internal Diesel row structs and their conversion into domain types.
//!
//! Rows never leave the persistence layer. Conversions re-validate stored
//! text through the domain constructors and report corrupt rows as plain
//! strings, which repositories surface as query errors.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    Account, Comment, CommentContent, CommentId, Community, CommunityDescription, CommunityId,
    CommunityName, Email, Membership, MembershipRole, PasswordHash, Post, PostContent, PostId,
    PostTitle, UserId, UserName, UserRole, Vote, VoteId, VoteScore, VoteTarget, VoteType,
};

use super::schema::{comments, communities, community_members, posts, users, votes};

fn corrupt(entity: &str, id: Uuid, err: impl std::fmt::Display) -> String {
    format!("stored {entity} {id} is invalid: {err}")
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: &'a str,
    pub created_at: DateTime<Utc>,
}

impl<'a> From<&'a Account> for NewUserRow<'a> {
    fn from(account: &'a Account) -> Self {
        Self {
            id: *account.id.as_uuid(),
            name: account.name.as_str(),
            email: account.email.as_ref(),
            password_hash: account.password_hash.as_ref(),
            role: account.role.as_str(),
            created_at: account.created_at,
        }
    }
}

impl TryFrom<UserRow> for Account {
    type Error = String;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: UserId::from_uuid(row.id),
            name: UserName::new(row.name).map_err(|err| corrupt("user", row.id, err))?,
            email: Email::new(&row.email).map_err(|err| corrupt("user", row.id, err))?,
            password_hash: PasswordHash::new(row.password_hash),
            role: row
                .role
                .parse::<UserRole>()
                .map_err(|err| corrupt("user", row.id, err))?,
            created_at: row.created_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Communities and memberships
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = communities)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CommunityRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = communities)]
pub(crate) struct NewCommunityRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub description: &'a str,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl<'a> From<&'a Community> for NewCommunityRow<'a> {
    fn from(community: &'a Community) -> Self {
        Self {
            id: *community.id.as_uuid(),
            name: community.name.as_str(),
            description: community.description.as_str(),
            created_by: *community.created_by.as_uuid(),
            created_at: community.created_at,
        }
    }
}

impl TryFrom<CommunityRow> for Community {
    type Error = String;

    fn try_from(row: CommunityRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: CommunityId::from_uuid(row.id),
            name: CommunityName::new(row.name).map_err(|err| corrupt("community", row.id, err))?,
            description: CommunityDescription::new(row.description)
                .map_err(|err| corrupt("community", row.id, err))?,
            created_by: UserId::from_uuid(row.created_by),
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = community_members)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MembershipRow {
    pub user_id: Uuid,
    pub community_id: Uuid,
    pub role: String,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = community_members)]
pub(crate) struct NewMembershipRow<'a> {
    pub user_id: Uuid,
    pub community_id: Uuid,
    pub role: &'a str,
    pub joined_at: DateTime<Utc>,
}

impl From<&Membership> for NewMembershipRow<'static> {
    fn from(membership: &Membership) -> Self {
        Self {
            user_id: *membership.user_id.as_uuid(),
            community_id: *membership.community_id.as_uuid(),
            role: membership.role.as_str(),
            joined_at: membership.joined_at,
        }
    }
}

impl TryFrom<MembershipRow> for Membership {
    type Error = String;

    fn try_from(row: MembershipRow) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: UserId::from_uuid(row.user_id),
            community_id: CommunityId::from_uuid(row.community_id),
            role: row
                .role
                .parse::<MembershipRole>()
                .map_err(|err| corrupt("membership", row.community_id, err))?,
            joined_at: row.joined_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Posts and comments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PostRow {
    pub id: Uuid,
    pub community_id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    pub vote_score: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = posts)]
pub(crate) struct NewPostRow<'a> {
    pub id: Uuid,
    pub community_id: Uuid,
    pub author_id: Uuid,
    pub title: &'a str,
    pub content: &'a str,
    pub vote_score: i64,
    pub created_at: DateTime<Utc>,
}

impl<'a> From<&'a Post> for NewPostRow<'a> {
    fn from(post: &'a Post) -> Self {
        Self {
            id: *post.id.as_uuid(),
            community_id: *post.community_id.as_uuid(),
            author_id: *post.author_id.as_uuid(),
            title: post.title.as_str(),
            content: post.content.as_str(),
            vote_score: post.vote_score.value(),
            created_at: post.created_at,
        }
    }
}

impl TryFrom<PostRow> for Post {
    type Error = String;

    fn try_from(row: PostRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: PostId::from_uuid(row.id),
            community_id: CommunityId::from_uuid(row.community_id),
            author_id: UserId::from_uuid(row.author_id),
            title: PostTitle::new(row.title).map_err(|err| corrupt("post", row.id, err))?,
            content: PostContent::new(row.content).map_err(|err| corrupt("post", row.id, err))?,
            created_at: row.created_at,
            vote_score: VoteScore::new(row.vote_score),
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CommentRow {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub parent_comment_id: Option<Uuid>,
    pub content: String,
    pub vote_score: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = comments)]
pub(crate) struct NewCommentRow<'a> {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub parent_comment_id: Option<Uuid>,
    pub content: &'a str,
    pub vote_score: i64,
    pub created_at: DateTime<Utc>,
}

impl<'a> From<&'a Comment> for NewCommentRow<'a> {
    fn from(comment: &'a Comment) -> Self {
        Self {
            id: *comment.id.as_uuid(),
            post_id: *comment.post_id.as_uuid(),
            author_id: *comment.author_id.as_uuid(),
            parent_comment_id: comment.parent_comment_id.map(Uuid::from),
            content: comment.content.as_str(),
            vote_score: comment.vote_score.value(),
            created_at: comment.created_at,
        }
    }
}

impl TryFrom<CommentRow> for Comment {
    type Error = String;

    fn try_from(row: CommentRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: CommentId::from_uuid(row.id),
            post_id: PostId::from_uuid(row.post_id),
            author_id: UserId::from_uuid(row.author_id),
            content: CommentContent::new(row.content)
                .map_err(|err| corrupt("comment", row.id, err))?,
            parent_comment_id: row.parent_comment_id.map(CommentId::from_uuid),
            created_at: row.created_at,
            vote_score: VoteScore::new(row.vote_score),
        })
    }
}

// ---------------------------------------------------------------------------
// Votes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = votes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct VoteRow {
    pub id: Uuid,
    pub voter_id: Uuid,
    pub post_id: Option<Uuid>,
    pub comment_id: Option<Uuid>,
    pub vote_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = votes)]
pub(crate) struct NewVoteRow {
    pub id: Uuid,
    pub voter_id: Uuid,
    pub post_id: Option<Uuid>,
    pub comment_id: Option<Uuid>,
    pub vote_type: &'static str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<VoteRow> for Vote {
    type Error = String;

    fn try_from(row: VoteRow) -> Result<Self, Self::Error> {
        let target = match (row.post_id, row.comment_id) {
            (Some(post), None) => VoteTarget::Post(PostId::from_uuid(post)),
            (None, Some(comment)) => VoteTarget::Comment(CommentId::from_uuid(comment)),
            _ => return Err(corrupt("vote", row.id, "expected exactly one target")),
        };
        Ok(Self {
            id: VoteId::from_uuid(row.id),
            voter_id: UserId::from_uuid(row.voter_id),
            target,
            vote_type: row
                .vote_type
                .parse::<VoteType>()
                .map_err(|err| corrupt("vote", row.id, err))?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
