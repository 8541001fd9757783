//! Domain primitives, services, and ports.
//!
//! Purpose: hold the CampusSphere model (accounts, communities, posts,
//! comments, votes) and the services that enforce its rules. Nothing here
//! knows about HTTP or SQL; adapters reach the domain through [`ports`].
//!
//! Public surface:
//! - [`Error`] / [`ErrorCode`]: transport-agnostic failure taxonomy.
//! - [`VoteLedger`]: idempotent vote upsert with full score recomputation.
//! - [`MembershipManager`]: community creation and idempotent joins.
//! - [`ContentService`]: posts and threaded comments.
//! - [`AccountService`]: registration, login, and token checks.

pub mod account_service;
pub mod community;
pub mod content;
pub mod content_service;
pub mod error;
pub mod ids;
pub mod membership_manager;
pub mod ports;
pub(crate) mod text;
pub mod trace_id;
pub mod user;
pub mod vote;
pub mod vote_ledger;

pub use self::account_service::AccountService;
pub use self::community::{
    Community, CommunityDescription, CommunityDetail, CommunityName, JoinOutcome, Membership,
    MembershipRole, UnknownMembershipRole,
};
pub use self::content::{
    Comment, CommentContent, CommentSummary, Post, PostContent, PostSummary, PostTitle,
};
pub use self::content_service::ContentService;
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::ids::{CommentId, CommunityId, IdParseError, PostId, UserId, VoteId};
pub use self::membership_manager::MembershipManager;
pub use self::text::TextValidationError;
pub use self::trace_id::TraceId;
pub use self::user::{
    AccessToken, Account, Email, Identity, Password, PasswordHash, UnknownUserRole, UserName,
    UserRole,
};
pub use self::vote::{
    Ballot, BallotEffect, CastOutcome, TargetKind, TargetKindParseError, Vote, VoteScore,
    VoteTarget, VoteType, VoteTypeParseError,
};
pub use self::vote_ledger::VoteLedger;
