//! Vote ledger domain service.
//!
//! Implements [`VoteCommand`]: parses the raw submission, checks that the
//! target exists, and hands the ballot to [`VoteRepository::cast`], which
//! upserts the single vote row and recomputes the cached score in one
//! transaction.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{debug, info};

use crate::domain::ports::{
    ContentRepository, ContentRepositoryError, SubmitVoteRequest, SubmitVoteResponse, VoteCommand,
    VoteRepository, VoteRepositoryError,
};
use crate::domain::{Ballot, BallotEffect, Error, TargetKind, VoteTarget, VoteType};

fn map_vote_repository_error(error: VoteRepositoryError) -> Error {
    match error {
        VoteRepositoryError::Connection { message } => {
            Error::internal(format!("vote storage unavailable: {message}"))
        }
        VoteRepositoryError::Query { message } => {
            Error::internal(format!("vote storage error: {message}"))
        }
        VoteRepositoryError::TargetNotFound { target } => {
            Error::not_found(format!("vote target {target} does not exist"))
        }
    }
}

fn map_content_repository_error(error: ContentRepositoryError) -> Error {
    match error {
        ContentRepositoryError::Connection { message } => {
            Error::internal(format!("content storage unavailable: {message}"))
        }
        other => Error::internal(format!("content storage error: {other}")),
    }
}

fn parse_ballot(request: &SubmitVoteRequest) -> Result<Ballot, Error> {
    let vote_type: VoteType = request.vote_type.parse().map_err(|err| {
        Error::invalid_argument(format!("{err}")).with_details(json!({
            "field": "voteType",
            "value": request.vote_type,
            "code": "invalid_vote_type",
        }))
    })?;
    let kind: TargetKind = request.target_kind.parse().map_err(|err| {
        Error::invalid_argument(format!("{err}")).with_details(json!({
            "field": "targetKind",
            "value": request.target_kind,
            "code": "invalid_target_kind",
        }))
    })?;
    Ok(Ballot {
        voter: request.voter,
        target: VoteTarget::new(kind, request.target_id),
        vote_type,
    })
}

/// Vote ledger implementing [`VoteCommand`].
#[derive(Clone)]
pub struct VoteLedger<V, C> {
    votes: Arc<V>,
    content: Arc<C>,
    clock: Arc<dyn Clock>,
}

impl<V, C> VoteLedger<V, C> {
    /// Create a ledger over the vote store and the content existence checks.
    pub fn new(votes: Arc<V>, content: Arc<C>, clock: Arc<dyn Clock>) -> Self {
        Self {
            votes,
            content,
            clock,
        }
    }
}

impl<V, C> VoteLedger<V, C>
where
    C: ContentRepository,
{
    async fn target_exists(&self, target: &VoteTarget) -> Result<bool, Error> {
        let exists = match target {
            VoteTarget::Post(id) => self.content.post_exists(id).await,
            VoteTarget::Comment(id) => self.content.comment_exists(id).await,
        };
        exists.map_err(map_content_repository_error)
    }
}

#[async_trait]
impl<V, C> VoteCommand for VoteLedger<V, C>
where
    V: VoteRepository,
    C: ContentRepository,
{
    async fn submit_vote(&self, request: SubmitVoteRequest) -> Result<SubmitVoteResponse, Error> {
        let ballot = parse_ballot(&request)?;

        if !self.target_exists(&ballot.target).await? {
            return Err(Error::not_found(format!(
                "{} {} does not exist",
                ballot.target.kind(),
                ballot.target.id()
            ))
            .with_details(json!({
                "field": "targetId",
                "value": ballot.target.id().to_string(),
                "code": "target_not_found",
            })));
        }

        let outcome = self
            .votes
            .cast(&ballot, self.clock.utc())
            .await
            .map_err(map_vote_repository_error)?;

        match outcome.effect {
            BallotEffect::Unchanged => debug!(
                voter = %ballot.voter,
                vote_target = %ballot.target,
                vote_type = %ballot.vote_type,
                "repeat vote left ledger unchanged"
            ),
            effect => info!(
                voter = %ballot.voter,
                vote_target = %ballot.target,
                vote_type = %ballot.vote_type,
                ?effect,
                score = outcome.score.value(),
                "vote recorded"
            ),
        }

        Ok(SubmitVoteResponse {
            vote_score: outcome.score,
        })
    }
}

#[cfg(test)]
#[path = "vote_ledger_tests.rs"]
mod tests;
