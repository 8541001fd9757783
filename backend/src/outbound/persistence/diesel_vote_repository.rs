//! PostgreSQL-backed [`VoteRepository`].
//!
//! [`VoteRepository::cast`] runs as one transaction:
//!
//! 1. lock the target post or comment row with `SELECT ... FOR UPDATE`;
//! 2. read the voter's existing vote on that target;
//! 3. insert, update, or leave the vote row as the ballot requires;
//! 4. reload every vote type on the target and tally the score;
//! 5. write the score back to the target row.
//!
//! The row lock serialises concurrent casts on the same target, so the
//! cached score always equals the tally of committed votes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{VoteRepository, VoteRepositoryError};
use crate::domain::{
    Ballot, BallotEffect, CastOutcome, UserId, Vote, VoteId, VoteScore, VoteTarget, VoteType,
};

use super::diesel_helpers::{DbFailure, count_to_u64};
use super::models::{NewVoteRow, VoteRow};
use super::pool::DbPool;
use super::schema::{comments, posts, votes};

const POST_FKEY: &str = "votes_post_id_fkey";
const COMMENT_FKEY: &str = "votes_comment_id_fkey";

/// Diesel implementation of the vote repository.
#[derive(Clone)]
pub struct DieselVoteRepository {
    pool: DbPool,
}

impl DieselVoteRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Failures raised inside the cast transaction.
#[derive(Debug)]
enum CastFailure {
    Database(diesel::result::Error),
    TargetMissing,
    CorruptVote(String),
}

impl From<diesel::result::Error> for CastFailure {
    fn from(error: diesel::result::Error) -> Self {
        Self::Database(error)
    }
}

fn map_failure(failure: impl Into<DbFailure>) -> VoteRepositoryError {
    match failure.into().into_parts() {
        (true, message) => VoteRepositoryError::connection(message),
        (false, message) => VoteRepositoryError::query(message),
    }
}

fn map_cast_failure(failure: CastFailure, target: &VoteTarget) -> VoteRepositoryError {
    match failure {
        CastFailure::TargetMissing => VoteRepositoryError::target_not_found(target.to_string()),
        CastFailure::CorruptVote(message) => VoteRepositoryError::query(message),
        CastFailure::Database(error) => {
            let failure = DbFailure::from(error);
            if failure.violates_foreign_key(POST_FKEY) || failure.violates_foreign_key(COMMENT_FKEY)
            {
                VoteRepositoryError::target_not_found(target.to_string())
            } else {
                map_failure(failure)
            }
        }
    }
}

fn target_columns(target: &VoteTarget) -> (Option<Uuid>, Option<Uuid>) {
    match target {
        VoteTarget::Post(id) => (Some(*id.as_uuid()), None),
        VoteTarget::Comment(id) => (None, Some(*id.as_uuid())),
    }
}

/// Lock the target row for the rest of the transaction.
async fn lock_target<C>(conn: &mut C, target: &VoteTarget) -> Result<bool, diesel::result::Error>
where
    C: AsyncConnection<Backend = Pg> + Send,
{
    let locked: Option<Uuid> = match target {
        VoteTarget::Post(id) => {
            posts::table
                .filter(posts::id.eq(id.as_uuid()))
                .select(posts::id)
                .for_update()
                .first(conn)
                .await
                .optional()?
        }
        VoteTarget::Comment(id) => {
            comments::table
                .filter(comments::id.eq(id.as_uuid()))
                .select(comments::id)
                .for_update()
                .first(conn)
                .await
                .optional()?
        }
    };
    Ok(locked.is_some())
}

async fn load_vote<C>(
    conn: &mut C,
    voter: &UserId,
    target: &VoteTarget,
) -> Result<Option<VoteRow>, diesel::result::Error>
where
    C: AsyncConnection<Backend = Pg> + Send,
{
    let by_voter = votes::table.filter(votes::voter_id.eq(voter.as_uuid()));
    match target {
        VoteTarget::Post(id) => {
            by_voter
                .filter(votes::post_id.eq(id.as_uuid()))
                .select(VoteRow::as_select())
                .first(conn)
                .await
                .optional()
        }
        VoteTarget::Comment(id) => {
            by_voter
                .filter(votes::comment_id.eq(id.as_uuid()))
                .select(VoteRow::as_select())
                .first(conn)
                .await
                .optional()
        }
    }
}

async fn load_vote_types<C>(
    conn: &mut C,
    target: &VoteTarget,
) -> Result<Vec<String>, diesel::result::Error>
where
    C: AsyncConnection<Backend = Pg> + Send,
{
    match target {
        VoteTarget::Post(id) => {
            votes::table
                .filter(votes::post_id.eq(id.as_uuid()))
                .select(votes::vote_type)
                .load(conn)
                .await
        }
        VoteTarget::Comment(id) => {
            votes::table
                .filter(votes::comment_id.eq(id.as_uuid()))
                .select(votes::vote_type)
                .load(conn)
                .await
        }
    }
}

async fn write_score<C>(
    conn: &mut C,
    target: &VoteTarget,
    score: VoteScore,
) -> Result<(), diesel::result::Error>
where
    C: AsyncConnection<Backend = Pg> + Send,
{
    match target {
        VoteTarget::Post(id) => {
            diesel::update(posts::table.filter(posts::id.eq(id.as_uuid())))
                .set(posts::vote_score.eq(score.value()))
                .execute(conn)
                .await?;
        }
        VoteTarget::Comment(id) => {
            diesel::update(comments::table.filter(comments::id.eq(id.as_uuid())))
                .set(comments::vote_score.eq(score.value()))
                .execute(conn)
                .await?;
        }
    }
    Ok(())
}

/// Row change implied by a ballot effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VoteWrite {
    Insert,
    Update(Uuid),
    Skip,
}

/// Pair the ballot effect with the stored row it was computed from.
fn plan_write(effect: BallotEffect, existing: Option<Uuid>) -> Result<VoteWrite, CastFailure> {
    match (effect, existing) {
        (BallotEffect::Inserted, None) => Ok(VoteWrite::Insert),
        (BallotEffect::Changed { .. }, Some(vote_id)) => Ok(VoteWrite::Update(vote_id)),
        (BallotEffect::Unchanged, Some(_)) => Ok(VoteWrite::Skip),
        (effect, existing) => Err(CastFailure::CorruptVote(format!(
            "ballot effect {effect:?} disagrees with stored vote {existing:?}"
        ))),
    }
}

fn tally(raw: Vec<String>) -> Result<VoteScore, CastFailure> {
    let types = raw
        .into_iter()
        .map(|value| {
            value
                .parse::<VoteType>()
                .map_err(|err| CastFailure::CorruptVote(format!("stored vote is invalid: {err}")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(VoteScore::tally(types))
}

#[async_trait]
impl VoteRepository for DieselVoteRepository {
    async fn cast(
        &self,
        ballot: &Ballot,
        cast_at: DateTime<Utc>,
    ) -> Result<CastOutcome, VoteRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_failure)?;
        let ballot = *ballot;

        let outcome = conn
            .transaction::<_, CastFailure, _>(|conn| {
                async move {
                    if !lock_target(conn, &ballot.target).await? {
                        return Err(CastFailure::TargetMissing);
                    }

                    let existing = load_vote(conn, &ballot.voter, &ballot.target).await?;
                    let previous = existing
                        .as_ref()
                        .map(|row| row.vote_type.parse::<VoteType>())
                        .transpose()
                        .map_err(|err| {
                            CastFailure::CorruptVote(format!("stored vote is invalid: {err}"))
                        })?;
                    let effect = ballot.effect_on(previous);

                    match plan_write(effect, existing.as_ref().map(|row| row.id))? {
                        VoteWrite::Insert => {
                            let (post_id, comment_id) = target_columns(&ballot.target);
                            diesel::insert_into(votes::table)
                                .values(NewVoteRow {
                                    id: *VoteId::random().as_uuid(),
                                    voter_id: *ballot.voter.as_uuid(),
                                    post_id,
                                    comment_id,
                                    vote_type: ballot.vote_type.as_str(),
                                    created_at: cast_at,
                                    updated_at: cast_at,
                                })
                                .execute(conn)
                                .await?;
                        }
                        VoteWrite::Update(vote_id) => {
                            diesel::update(votes::table.filter(votes::id.eq(vote_id)))
                                .set((
                                    votes::vote_type.eq(ballot.vote_type.as_str()),
                                    votes::updated_at.eq(cast_at),
                                ))
                                .execute(conn)
                                .await?;
                        }
                        VoteWrite::Skip => {}
                    }

                    let score = tally(load_vote_types(conn, &ballot.target).await?)?;
                    write_score(conn, &ballot.target, score).await?;
                    Ok(CastOutcome { score, effect })
                }
                .scope_boxed()
            })
            .await
            .map_err(|failure| map_cast_failure(failure, &ballot.target))?;

        debug!(
            vote_target = %ballot.target,
            score = outcome.score.value(),
            "vote transaction committed"
        );
        Ok(outcome)
    }

    async fn find_vote(
        &self,
        voter: &UserId,
        target: &VoteTarget,
    ) -> Result<Option<Vote>, VoteRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_failure)?;

        let row = load_vote(&mut conn, voter, target)
            .await
            .map_err(map_failure)?;

        row.map(Vote::try_from)
            .transpose()
            .map_err(VoteRepositoryError::query)
    }

    async fn count_votes(&self, target: &VoteTarget) -> Result<u64, VoteRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_failure)?;

        let count: i64 = match target {
            VoteTarget::Post(id) => {
                votes::table
                    .filter(votes::post_id.eq(id.as_uuid()))
                    .count()
                    .get_result(&mut conn)
                    .await
            }
            VoteTarget::Comment(id) => {
                votes::table
                    .filter(votes::comment_id.eq(id.as_uuid()))
                    .count()
                    .get_result(&mut conn)
                    .await
            }
        }
        .map_err(map_failure)?;

        Ok(count_to_u64(count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CommentId, PostId};
    use rstest::rstest;

    #[rstest]
    fn post_targets_fill_only_the_post_column() {
        let id = PostId::random();
        assert_eq!(
            target_columns(&VoteTarget::Post(id)),
            (Some(*id.as_uuid()), None)
        );
    }

    #[rstest]
    fn comment_targets_fill_only_the_comment_column() {
        let id = CommentId::random();
        assert_eq!(
            target_columns(&VoteTarget::Comment(id)),
            (None, Some(*id.as_uuid()))
        );
    }

    #[rstest]
    fn tally_sums_stored_vote_types() {
        let raw = vec!["UPVOTE".to_owned(), "UPVOTE".to_owned(), "DOWNVOTE".to_owned()];
        let score = tally(raw).expect("stored values are valid");
        assert_eq!(score.value(), 1);
    }

    #[rstest]
    fn tally_rejects_corrupt_rows() {
        let result = tally(vec!["sideways".to_owned()]);
        assert!(matches!(result, Err(CastFailure::CorruptVote(_))));
    }

    #[rstest]
    #[case(BallotEffect::Inserted, None, Some(VoteWrite::Insert))]
    #[case(BallotEffect::Inserted, Some(Uuid::nil()), None)]
    #[case(
        BallotEffect::Changed { from: VoteType::Upvote },
        Some(Uuid::nil()),
        Some(VoteWrite::Update(Uuid::nil()))
    )]
    #[case(BallotEffect::Changed { from: VoteType::Upvote }, None, None)]
    #[case(BallotEffect::Unchanged, Some(Uuid::nil()), Some(VoteWrite::Skip))]
    #[case(BallotEffect::Unchanged, None, None)]
    fn write_plan_requires_a_matching_stored_row(
        #[case] effect: BallotEffect,
        #[case] existing: Option<Uuid>,
        #[case] expected: Option<VoteWrite>,
    ) {
        match (plan_write(effect, existing), expected) {
            (Ok(write), Some(expected)) => assert_eq!(write, expected),
            (Err(CastFailure::CorruptVote(_)), None) => {}
            (other, expected) => panic!("expected {expected:?}, got {other:?}"),
        }
    }

    #[rstest]
    fn missing_target_maps_to_target_not_found() {
        let target = VoteTarget::Post(PostId::random());
        let error = map_cast_failure(CastFailure::TargetMissing, &target);
        assert_eq!(
            error,
            VoteRepositoryError::target_not_found(target.to_string())
        );
    }
}
