//! In-memory adapters for integration tests.
//!
//! Compiled only with the `test-support` feature. [`InMemoryStore`] implements
//! every repository port over one mutex-guarded state so tests can drive the
//! real domain services without PostgreSQL, and [`FixedClock`] makes
//! timestamps deterministic.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use argon2::Params;
use async_trait::async_trait;
use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;
use zeroize::Zeroizing;

use crate::domain::ports::{
    AccountRepository, AccountRepositoryError, CommunityRepository, CommunityRepositoryError,
    ContentRepository, ContentRepositoryError, VoteRepository, VoteRepositoryError,
};
use crate::domain::{
    Account, Ballot, BallotEffect, CastOutcome, Comment, CommentId, CommentSummary, Community,
    CommunityId, Email, JoinOutcome, Membership, Post, PostId, PostSummary, UserId, Vote, VoteId,
    VoteScore, VoteTarget,
};
use crate::inbound::http::state::{HttpState, HttpStateAdapters};
use crate::outbound::security::{Argon2PasswordHasher, JwtTokenService, WeakSecretError};

/// Signing secret used by [`in_memory_http_state`].
pub const TEST_JWT_SECRET: &str = "campussphere-test-secret-0123456789";

/// Clock that only moves when told to.
pub struct FixedClock(Mutex<DateTime<Utc>>);

impl FixedClock {
    /// Start at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// Start at 2026-09-01T09:00:00Z.
    pub fn term_start() -> Self {
        Self::new(
            Utc.with_ymd_and_hms(2026, 9, 1, 9, 0, 0)
                .single()
                .unwrap_or_default(),
        )
    }

    /// Move the clock forward by whole seconds.
    pub fn advance_seconds(&self, seconds: i64) {
        *self.lock_clock() += TimeDelta::seconds(seconds);
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

#[derive(Default)]
struct StoreState {
    accounts: Vec<Account>,
    communities: Vec<Community>,
    memberships: Vec<Membership>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
    votes: Vec<Vote>,
    fail_owner_insert: bool,
    unavailable: bool,
}

impl StoreState {
    fn author_name(&self, id: &UserId) -> Option<crate::domain::UserName> {
        self.accounts
            .iter()
            .find(|account| account.id == *id)
            .map(|account| account.name.clone())
    }

    fn target_exists(&self, target: &VoteTarget) -> bool {
        match target {
            VoteTarget::Post(id) => self.posts.iter().any(|post| post.id == *id),
            VoteTarget::Comment(id) => self.comments.iter().any(|comment| comment.id == *id),
        }
    }

    fn write_score(&mut self, target: &VoteTarget, score: VoteScore) {
        match target {
            VoteTarget::Post(id) => {
                if let Some(post) = self.posts.iter_mut().find(|post| post.id == *id) {
                    post.vote_score = score;
                }
            }
            VoteTarget::Comment(id) => {
                if let Some(comment) = self.comments.iter_mut().find(|c| c.id == *id) {
                    comment.vote_score = score;
                }
            }
        }
    }
}

/// Repository adapters backed by process memory.
///
/// Clones share state, so one store can be handed to every service.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make the owner-membership half of the next community creation fail.
    ///
    /// The community row is written first and then discarded, as a rolled
    /// back transaction would.
    pub fn fail_next_owner_insert(&self) {
        self.lock().fail_owner_insert = true;
    }

    /// Simulate a lost database connection for every subsequent call.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.lock().unavailable = unavailable;
    }

    /// Number of stored communities.
    pub fn community_count(&self) -> usize {
        self.lock().communities.len()
    }

    /// Number of membership rows for a community.
    pub fn membership_count(&self, community_id: &CommunityId) -> usize {
        self.lock()
            .memberships
            .iter()
            .filter(|m| m.community_id == *community_id)
            .count()
    }

    /// Every vote row on a target.
    pub fn votes_on(&self, target: &VoteTarget) -> Vec<Vote> {
        self.lock()
            .votes
            .iter()
            .filter(|vote| vote.target == *target)
            .cloned()
            .collect()
    }

    /// Cached score currently stored on a target.
    pub fn stored_score(&self, target: &VoteTarget) -> Option<VoteScore> {
        let state = self.lock();
        match target {
            VoteTarget::Post(id) => state
                .posts
                .iter()
                .find(|post| post.id == *id)
                .map(|post| post.vote_score),
            VoteTarget::Comment(id) => state
                .comments
                .iter()
                .find(|comment| comment.id == *id)
                .map(|comment| comment.vote_score),
        }
    }
}

const UNAVAILABLE: &str = "in-memory store unavailable";

#[async_trait]
impl AccountRepository for InMemoryStore {
    async fn insert(&self, account: &Account) -> Result<(), AccountRepositoryError> {
        let mut state = self.lock();
        if state.unavailable {
            return Err(AccountRepositoryError::connection(UNAVAILABLE));
        }
        if state.accounts.iter().any(|a| a.email == account.email) {
            return Err(AccountRepositoryError::duplicate_email(
                account.email.to_string(),
            ));
        }
        state.accounts.push(account.clone());
        Ok(())
    }

    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<Account>, AccountRepositoryError> {
        let state = self.lock();
        if state.unavailable {
            return Err(AccountRepositoryError::connection(UNAVAILABLE));
        }
        Ok(state.accounts.iter().find(|a| a.email == *email).cloned())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<Account>, AccountRepositoryError> {
        let state = self.lock();
        if state.unavailable {
            return Err(AccountRepositoryError::connection(UNAVAILABLE));
        }
        Ok(state.accounts.iter().find(|a| a.id == *id).cloned())
    }
}

#[async_trait]
impl CommunityRepository for InMemoryStore {
    async fn create_with_owner(
        &self,
        community: &Community,
        owner: &Membership,
    ) -> Result<(), CommunityRepositoryError> {
        let mut state = self.lock();
        if state.unavailable {
            return Err(CommunityRepositoryError::connection(UNAVAILABLE));
        }
        let rollback_to = state.communities.len();
        state.communities.push(community.clone());

        let owner_insert = if std::mem::take(&mut state.fail_owner_insert) {
            Err(CommunityRepositoryError::query(
                "owner membership insert failed",
            ))
        } else if !state.accounts.iter().any(|a| a.id == owner.user_id) {
            Err(CommunityRepositoryError::query(
                "foreign key community_members_user_id_fkey violated",
            ))
        } else {
            Ok(())
        };

        match owner_insert {
            Ok(()) => {
                state.memberships.push(owner.clone());
                Ok(())
            }
            Err(error) => {
                state.communities.truncate(rollback_to);
                Err(error)
            }
        }
    }

    async fn find_by_id(
        &self,
        id: &CommunityId,
    ) -> Result<Option<Community>, CommunityRepositoryError> {
        let state = self.lock();
        if state.unavailable {
            return Err(CommunityRepositoryError::connection(UNAVAILABLE));
        }
        Ok(state.communities.iter().find(|c| c.id == *id).cloned())
    }

    async fn list(&self) -> Result<Vec<Community>, CommunityRepositoryError> {
        let state = self.lock();
        if state.unavailable {
            return Err(CommunityRepositoryError::connection(UNAVAILABLE));
        }
        let mut communities: Vec<_> = state.communities.iter().rev().cloned().collect();
        communities.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(communities)
    }

    async fn add_member(
        &self,
        membership: &Membership,
    ) -> Result<JoinOutcome, CommunityRepositoryError> {
        let mut state = self.lock();
        if state.unavailable {
            return Err(CommunityRepositoryError::connection(UNAVAILABLE));
        }
        if !state
            .communities
            .iter()
            .any(|c| c.id == membership.community_id)
        {
            return Err(CommunityRepositoryError::community_not_found(
                membership.community_id.to_string(),
            ));
        }
        let exists = state.memberships.iter().any(|m| {
            m.user_id == membership.user_id && m.community_id == membership.community_id
        });
        if exists {
            return Ok(JoinOutcome::AlreadyMember);
        }
        state.memberships.push(membership.clone());
        Ok(JoinOutcome::Joined)
    }

    async fn count_members(&self, id: &CommunityId) -> Result<u64, CommunityRepositoryError> {
        let state = self.lock();
        if state.unavailable {
            return Err(CommunityRepositoryError::connection(UNAVAILABLE));
        }
        let count = state
            .memberships
            .iter()
            .filter(|m| m.community_id == *id)
            .count();
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }

    async fn find_membership(
        &self,
        user_id: &UserId,
        community_id: &CommunityId,
    ) -> Result<Option<Membership>, CommunityRepositoryError> {
        let state = self.lock();
        if state.unavailable {
            return Err(CommunityRepositoryError::connection(UNAVAILABLE));
        }
        Ok(state
            .memberships
            .iter()
            .find(|m| m.user_id == *user_id && m.community_id == *community_id)
            .cloned())
    }
}

#[async_trait]
impl ContentRepository for InMemoryStore {
    async fn post_exists(&self, id: &PostId) -> Result<bool, ContentRepositoryError> {
        let state = self.lock();
        if state.unavailable {
            return Err(ContentRepositoryError::connection(UNAVAILABLE));
        }
        Ok(state.posts.iter().any(|post| post.id == *id))
    }

    async fn comment_exists(&self, id: &CommentId) -> Result<bool, ContentRepositoryError> {
        let state = self.lock();
        if state.unavailable {
            return Err(ContentRepositoryError::connection(UNAVAILABLE));
        }
        Ok(state.comments.iter().any(|comment| comment.id == *id))
    }

    async fn insert_post(&self, post: &Post) -> Result<(), ContentRepositoryError> {
        let mut state = self.lock();
        if state.unavailable {
            return Err(ContentRepositoryError::connection(UNAVAILABLE));
        }
        if !state.communities.iter().any(|c| c.id == post.community_id) {
            return Err(ContentRepositoryError::community_not_found(
                post.community_id.to_string(),
            ));
        }
        state.posts.push(post.clone());
        Ok(())
    }

    async fn find_post(&self, id: &PostId) -> Result<Option<Post>, ContentRepositoryError> {
        let state = self.lock();
        if state.unavailable {
            return Err(ContentRepositoryError::connection(UNAVAILABLE));
        }
        Ok(state.posts.iter().find(|post| post.id == *id).cloned())
    }

    async fn list_posts(
        &self,
        community_id: &CommunityId,
    ) -> Result<Vec<PostSummary>, ContentRepositoryError> {
        let state = self.lock();
        if state.unavailable {
            return Err(ContentRepositoryError::connection(UNAVAILABLE));
        }
        let mut posts: Vec<_> = state
            .posts
            .iter()
            .rev()
            .filter(|post| post.community_id == *community_id)
            .filter_map(|post| {
                state.author_name(&post.author_id).map(|author_name| PostSummary {
                    post: post.clone(),
                    author_name,
                })
            })
            .collect();
        posts.sort_by(|a, b| b.post.created_at.cmp(&a.post.created_at));
        Ok(posts)
    }

    async fn insert_comment(&self, comment: &Comment) -> Result<(), ContentRepositoryError> {
        let mut state = self.lock();
        if state.unavailable {
            return Err(ContentRepositoryError::connection(UNAVAILABLE));
        }
        if !state.posts.iter().any(|post| post.id == comment.post_id) {
            return Err(ContentRepositoryError::post_not_found(
                comment.post_id.to_string(),
            ));
        }
        if let Some(parent) = comment.parent_comment_id {
            if !state.comments.iter().any(|c| c.id == parent) {
                return Err(ContentRepositoryError::parent_comment_not_found(
                    parent.to_string(),
                ));
            }
        }
        state.comments.push(comment.clone());
        Ok(())
    }

    async fn find_comment(
        &self,
        id: &CommentId,
    ) -> Result<Option<Comment>, ContentRepositoryError> {
        let state = self.lock();
        if state.unavailable {
            return Err(ContentRepositoryError::connection(UNAVAILABLE));
        }
        Ok(state.comments.iter().find(|c| c.id == *id).cloned())
    }

    async fn list_comments(
        &self,
        post_id: &PostId,
    ) -> Result<Vec<CommentSummary>, ContentRepositoryError> {
        let state = self.lock();
        if state.unavailable {
            return Err(ContentRepositoryError::connection(UNAVAILABLE));
        }
        let mut comments: Vec<_> = state
            .comments
            .iter()
            .filter(|comment| comment.post_id == *post_id)
            .filter_map(|comment| {
                state
                    .author_name(&comment.author_id)
                    .map(|author_name| CommentSummary {
                        comment: comment.clone(),
                        author_name,
                    })
            })
            .collect();
        comments.sort_by(|a, b| a.comment.created_at.cmp(&b.comment.created_at));
        Ok(comments)
    }
}

#[async_trait]
impl VoteRepository for InMemoryStore {
    async fn cast(
        &self,
        ballot: &Ballot,
        cast_at: DateTime<Utc>,
    ) -> Result<CastOutcome, VoteRepositoryError> {
        let mut state = self.lock();
        if state.unavailable {
            return Err(VoteRepositoryError::connection(UNAVAILABLE));
        }
        if !state.target_exists(&ballot.target) {
            return Err(VoteRepositoryError::target_not_found(
                ballot.target.to_string(),
            ));
        }

        let existing = state
            .votes
            .iter()
            .position(|vote| vote.voter_id == ballot.voter && vote.target == ballot.target);
        let effect = ballot.effect_on(
            existing
                .and_then(|i| state.votes.get(i))
                .map(|vote| vote.vote_type),
        );
        match effect {
            BallotEffect::Inserted => state.votes.push(Vote {
                id: VoteId::random(),
                voter_id: ballot.voter,
                target: ballot.target,
                vote_type: ballot.vote_type,
                created_at: cast_at,
                updated_at: cast_at,
            }),
            BallotEffect::Changed { .. } => {
                if let Some(vote) = existing.and_then(|i| state.votes.get_mut(i)) {
                    vote.vote_type = ballot.vote_type;
                    vote.updated_at = cast_at;
                }
            }
            BallotEffect::Unchanged => {}
        }

        let score = VoteScore::tally(
            state
                .votes
                .iter()
                .filter(|vote| vote.target == ballot.target)
                .map(|vote| vote.vote_type),
        );
        state.write_score(&ballot.target, score);
        Ok(CastOutcome { score, effect })
    }

    async fn find_vote(
        &self,
        voter: &UserId,
        target: &VoteTarget,
    ) -> Result<Option<Vote>, VoteRepositoryError> {
        let state = self.lock();
        if state.unavailable {
            return Err(VoteRepositoryError::connection(UNAVAILABLE));
        }
        Ok(state
            .votes
            .iter()
            .find(|vote| vote.voter_id == *voter && vote.target == *target)
            .cloned())
    }

    async fn count_votes(&self, target: &VoteTarget) -> Result<u64, VoteRepositoryError> {
        let state = self.lock();
        if state.unavailable {
            return Err(VoteRepositoryError::connection(UNAVAILABLE));
        }
        let count = state.votes.iter().filter(|v| v.target == *target).count();
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }
}

/// Argon2 hasher with minimal cost parameters so tests stay fast.
pub fn fast_password_hasher() -> Argon2PasswordHasher {
    match Params::new(8, 1, 1, None) {
        Ok(params) => Argon2PasswordHasher::with_params(params),
        Err(_) => Argon2PasswordHasher::new(),
    }
}

/// Wire real domain services over `store` with JWT and Argon2 adapters.
///
/// # Errors
/// Returns [`WeakSecretError`] only if [`TEST_JWT_SECRET`] is shortened below
/// the signing minimum.
pub fn in_memory_http_state(
    store: &InMemoryStore,
    clock: Arc<dyn Clock>,
) -> Result<HttpState, WeakSecretError> {
    let tokens = JwtTokenService::new(
        &Zeroizing::new(TEST_JWT_SECRET.to_owned()),
        Duration::from_secs(3_600),
    )?
    .with_clock(clock.clone());
    let store = Arc::new(store.clone());
    Ok(HttpState::from_adapters(HttpStateAdapters {
        accounts: store.clone(),
        communities: store.clone(),
        content: store.clone(),
        votes: store,
        hasher: Arc::new(fast_password_hasher()),
        tokens: Arc::new(tokens),
        clock,
    }))
}
