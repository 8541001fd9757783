//! Tests for the vote ledger service.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use mockable::MockClock;
use rstest::{fixture, rstest};
use uuid::Uuid;

use super::*;
use crate::domain::ports::{MockContentRepository, MockVoteRepository};
use crate::domain::{CastOutcome, ErrorCode, PostId, UserId, VoteScore};

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

#[fixture]
fn clock() -> Arc<dyn Clock> {
    let mut clock = MockClock::new();
    clock.expect_utc().returning(fixed_now);
    Arc::new(clock)
}

fn request(target_kind: &str, target_id: Uuid, vote_type: &str) -> SubmitVoteRequest {
    SubmitVoteRequest {
        voter: UserId::random(),
        target_kind: target_kind.to_owned(),
        target_id,
        vote_type: vote_type.to_owned(),
    }
}

fn ledger(
    votes: MockVoteRepository,
    content: MockContentRepository,
    clock: Arc<dyn Clock>,
) -> VoteLedger<MockVoteRepository, MockContentRepository> {
    VoteLedger::new(Arc::new(votes), Arc::new(content), clock)
}

#[rstest]
#[tokio::test]
async fn upvote_on_existing_post_returns_recomputed_score(clock: Arc<dyn Clock>) {
    let post_id = Uuid::new_v4();
    let mut content = MockContentRepository::new();
    content
        .expect_post_exists()
        .withf(move |id| id == &PostId::from_uuid(post_id))
        .times(1)
        .return_once(|_| Ok(true));
    let mut votes = MockVoteRepository::new();
    votes
        .expect_cast()
        .withf(move |ballot, cast_at| {
            ballot.target == VoteTarget::Post(PostId::from_uuid(post_id))
                && ballot.vote_type == VoteType::Upvote
                && *cast_at == fixed_now()
        })
        .times(1)
        .return_once(|_, _| {
            Ok(CastOutcome {
                score: VoteScore::new(1),
                effect: BallotEffect::Inserted,
            })
        });

    let response = ledger(votes, content, clock)
        .submit_vote(request("post", post_id, "UPVOTE"))
        .await
        .expect("vote accepted");

    assert_eq!(response.vote_score, VoteScore::new(1));
}

#[rstest]
#[tokio::test]
async fn comment_targets_use_comment_existence_check(clock: Arc<dyn Clock>) {
    let mut content = MockContentRepository::new();
    content.expect_post_exists().never();
    content
        .expect_comment_exists()
        .times(1)
        .return_once(|_| Ok(true));
    let mut votes = MockVoteRepository::new();
    votes.expect_cast().times(1).return_once(|_, _| {
        Ok(CastOutcome {
            score: VoteScore::new(-1),
            effect: BallotEffect::Changed {
                from: VoteType::Upvote,
            },
        })
    });

    let response = ledger(votes, content, clock)
        .submit_vote(request("comment", Uuid::new_v4(), "DOWNVOTE"))
        .await
        .expect("vote accepted");

    assert_eq!(response.vote_score.value(), -1);
}

#[rstest]
#[case("post", "upvote", "voteType")]
#[case("post", "SIDEWAYS", "voteType")]
#[case("thread", "UPVOTE", "targetKind")]
#[case("", "UPVOTE", "targetKind")]
#[tokio::test]
async fn malformed_submissions_are_invalid_arguments(
    clock: Arc<dyn Clock>,
    #[case] kind: &str,
    #[case] vote_type: &str,
    #[case] field: &str,
) {
    let mut content = MockContentRepository::new();
    content.expect_post_exists().never();
    content.expect_comment_exists().never();
    let mut votes = MockVoteRepository::new();
    votes.expect_cast().never();

    let error = ledger(votes, content, clock)
        .submit_vote(request(kind, Uuid::new_v4(), vote_type))
        .await
        .expect_err("malformed submission must fail");

    assert_eq!(error.code(), ErrorCode::InvalidArgument);
    let details = error.details().expect("details attached");
    assert_eq!(details["field"], field);
}

#[rstest]
#[tokio::test]
async fn missing_target_is_not_found_and_never_cast(clock: Arc<dyn Clock>) {
    let mut content = MockContentRepository::new();
    content
        .expect_post_exists()
        .times(1)
        .return_once(|_| Ok(false));
    let mut votes = MockVoteRepository::new();
    votes.expect_cast().never();

    let error = ledger(votes, content, clock)
        .submit_vote(request("post", Uuid::new_v4(), "UPVOTE"))
        .await
        .expect_err("missing target must fail");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn target_vanishing_mid_transaction_is_not_found(clock: Arc<dyn Clock>) {
    let mut content = MockContentRepository::new();
    content
        .expect_post_exists()
        .times(1)
        .return_once(|_| Ok(true));
    let mut votes = MockVoteRepository::new();
    votes
        .expect_cast()
        .times(1)
        .return_once(|_, _| Err(VoteRepositoryError::target_not_found("post 1")));

    let error = ledger(votes, content, clock)
        .submit_vote(request("post", Uuid::new_v4(), "UPVOTE"))
        .await
        .expect_err("vanished target must fail");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[case(VoteRepositoryError::connection("pool exhausted"))]
#[case(VoteRepositoryError::query("deadlock detected"))]
#[tokio::test]
async fn storage_failures_surface_as_internal(
    clock: Arc<dyn Clock>,
    #[case] failure: VoteRepositoryError,
) {
    let mut content = MockContentRepository::new();
    content
        .expect_post_exists()
        .times(1)
        .return_once(|_| Ok(true));
    let mut votes = MockVoteRepository::new();
    votes
        .expect_cast()
        .times(1)
        .return_once(move |_, _| Err(failure));

    let error = ledger(votes, content, clock)
        .submit_vote(request("post", Uuid::new_v4(), "UPVOTE"))
        .await
        .expect_err("storage failure must fail");

    assert_eq!(error.code(), ErrorCode::Internal);
}

#[rstest]
#[tokio::test]
async fn existence_check_failure_is_internal(clock: Arc<dyn Clock>) {
    let mut content = MockContentRepository::new();
    content
        .expect_post_exists()
        .times(1)
        .return_once(|_| Err(ContentRepositoryError::connection("refused")));
    let mut votes = MockVoteRepository::new();
    votes.expect_cast().never();

    let error = ledger(votes, content, clock)
        .submit_vote(request("post", Uuid::new_v4(), "UPVOTE"))
        .await
        .expect_err("lookup failure must fail");

    assert_eq!(error.code(), ErrorCode::Internal);
}
