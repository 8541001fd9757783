//! Port for the vote ledger's transactional storage.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Ballot, CastOutcome, UserId, Vote, VoteTarget};

use super::define_port_error;

define_port_error! {
    /// Errors raised by vote repository adapters.
    pub enum VoteRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "vote repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "vote repository query failed: {message}",
        /// The post or comment vanished before the vote was recorded.
        TargetNotFound { target: String } =>
            "vote target {target} does not exist",
    }
}

/// Port for recording votes and maintaining cached scores.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VoteRepository: Send + Sync {
    /// Apply `ballot` and refresh the target's cached score atomically.
    ///
    /// Within one transaction the adapter locks the target row, upserts the
    /// voter's single vote, recomputes the score from every vote on the
    /// target with [`crate::domain::VoteScore::tally`], and writes it back.
    /// Any failure leaves storage untouched.
    async fn cast(
        &self,
        ballot: &Ballot,
        cast_at: DateTime<Utc>,
    ) -> Result<CastOutcome, VoteRepositoryError>;

    /// Load the voter's vote on a target, if any.
    async fn find_vote(
        &self,
        voter: &UserId,
        target: &VoteTarget,
    ) -> Result<Option<Vote>, VoteRepositoryError>;

    /// Count vote rows on a target.
    async fn count_votes(&self, target: &VoteTarget) -> Result<u64, VoteRepositoryError>;
}
