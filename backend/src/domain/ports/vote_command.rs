//! Driving port for casting votes.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Error, UserId, VoteScore};

/// Vote submission as received from an inbound adapter.
///
/// `target_kind` and `vote_type` stay raw strings so the ledger owns their
/// parsing and reports malformed values as `invalid_argument`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitVoteRequest {
    /// Authenticated voter.
    pub voter: UserId,
    /// `post` or `comment`.
    pub target_kind: String,
    /// Identifier of the post or comment.
    pub target_id: Uuid,
    /// `UPVOTE` or `DOWNVOTE`.
    pub vote_type: String,
}

/// Score of the target after the vote was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitVoteResponse {
    /// Recomputed net score.
    pub vote_score: VoteScore,
}

/// Domain use-case port for voting.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VoteCommand: Send + Sync {
    /// Record or replace the voter's vote and return the new target score.
    async fn submit_vote(&self, request: SubmitVoteRequest) -> Result<SubmitVoteResponse, Error>;
}
