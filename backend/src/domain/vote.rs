//! Vote values and score arithmetic.
//!
//! A voter holds at most one vote per target. Re-submitting replaces the
//! stored vote type in place, and the cached score on the target is always
//! recomputed from the full vote set with [`VoteScore::tally`] rather than
//! adjusted incrementally.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::{CommentId, PostId, UserId, VoteId};

/// Direction of a vote. Wire values are `UPVOTE` and `DOWNVOTE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VoteType {
    /// Counts +1.
    Upvote,
    /// Counts −1.
    Downvote,
}

/// Raised when a vote type string is neither `UPVOTE` nor `DOWNVOTE`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("vote type must be UPVOTE or DOWNVOTE, got {0:?}")]
pub struct VoteTypeParseError(pub String);

impl VoteType {
    /// Stable wire and storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Upvote => "UPVOTE",
            Self::Downvote => "DOWNVOTE",
        }
    }

    /// Contribution of one vote to a score.
    #[must_use]
    pub const fn weight(self) -> i64 {
        match self {
            Self::Upvote => 1,
            Self::Downvote => -1,
        }
    }
}

impl std::str::FromStr for VoteType {
    type Err = VoteTypeParseError;

    /// Parse a vote type. Matching is case-sensitive.
    ///
    /// # Examples
    /// ```
    /// use campussphere::domain::VoteType;
    ///
    /// assert_eq!("UPVOTE".parse::<VoteType>(), Ok(VoteType::Upvote));
    /// assert!("upvote".parse::<VoteType>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UPVOTE" => Ok(Self::Upvote),
            "DOWNVOTE" => Ok(Self::Downvote),
            other => Err(VoteTypeParseError(other.to_owned())),
        }
    }
}

impl fmt::Display for VoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of content a vote points at. Wire values are `post` and `comment`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    /// A post.
    Post,
    /// A comment.
    Comment,
}

/// Raised when a target kind string is neither `post` nor `comment`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("target kind must be post or comment, got {0:?}")]
pub struct TargetKindParseError(pub String);

impl TargetKind {
    /// Stable wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Comment => "comment",
        }
    }
}

impl std::str::FromStr for TargetKind {
    type Err = TargetKindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "post" => Ok(Self::Post),
            "comment" => Ok(Self::Comment),
            other => Err(TargetKindParseError(other.to_owned())),
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The post or comment a vote applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoteTarget {
    /// Vote on a post.
    Post(PostId),
    /// Vote on a comment.
    Comment(CommentId),
}

impl VoteTarget {
    /// Combine a parsed kind with a raw identifier.
    #[must_use]
    pub fn new(kind: TargetKind, id: Uuid) -> Self {
        match kind {
            TargetKind::Post => Self::Post(PostId::from_uuid(id)),
            TargetKind::Comment => Self::Comment(CommentId::from_uuid(id)),
        }
    }

    /// Kind of the target.
    #[must_use]
    pub const fn kind(&self) -> TargetKind {
        match self {
            Self::Post(_) => TargetKind::Post,
            Self::Comment(_) => TargetKind::Comment,
        }
    }

    /// Raw identifier of the target row.
    #[must_use]
    pub fn id(&self) -> Uuid {
        match self {
            Self::Post(id) => *id.as_uuid(),
            Self::Comment(id) => *id.as_uuid(),
        }
    }
}

impl fmt::Display for VoteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.id())
    }
}

/// Net score cached on posts and comments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct VoteScore(i64);

impl VoteScore {
    /// Score of content nobody has voted on.
    pub const ZERO: Self = Self(0);

    /// Wrap a stored score.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Numeric value.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }

    /// Recompute a score from every vote on a target.
    ///
    /// # Examples
    /// ```
    /// use campussphere::domain::{VoteScore, VoteType};
    ///
    /// let score = VoteScore::tally([VoteType::Upvote, VoteType::Upvote, VoteType::Downvote]);
    /// assert_eq!(score.value(), 1);
    /// assert_eq!(VoteScore::tally(Vec::new()), VoteScore::ZERO);
    /// ```
    #[must_use]
    pub fn tally(votes: impl IntoIterator<Item = VoteType>) -> Self {
        Self(
            votes
                .into_iter()
                .fold(0_i64, |acc, vote| acc.saturating_add(vote.weight())),
        )
    }
}

impl fmt::Display for VoteScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated request to record one voter's opinion on one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ballot {
    /// Authenticated voter.
    pub voter: UserId,
    /// Post or comment being voted on.
    pub target: VoteTarget,
    /// Direction of the vote.
    pub vote_type: VoteType,
}

/// What casting a ballot did to the voter's stored vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BallotEffect {
    /// No previous vote; a new row was inserted.
    Inserted,
    /// A previous vote of the other type was overwritten.
    Changed {
        /// Vote type before the overwrite.
        from: VoteType,
    },
    /// The same vote type was submitted again; the row is untouched.
    Unchanged,
}

impl Ballot {
    /// Decide how this ballot applies on top of the voter's existing vote.
    #[must_use]
    pub fn effect_on(&self, existing: Option<VoteType>) -> BallotEffect {
        match existing {
            None => BallotEffect::Inserted,
            Some(previous) if previous == self.vote_type => BallotEffect::Unchanged,
            Some(previous) => BallotEffect::Changed { from: previous },
        }
    }
}

/// Result of a committed vote transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CastOutcome {
    /// Recomputed score now stored on the target.
    pub score: VoteScore,
    /// What happened to the voter's row.
    pub effect: BallotEffect,
}

/// Stored vote row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vote {
    /// Row identifier.
    pub id: VoteId,
    /// Voter.
    pub voter_id: UserId,
    /// Exactly one post or comment.
    pub target: VoteTarget,
    /// Current direction.
    pub vote_type: VoteType,
    /// First cast.
    pub created_at: DateTime<Utc>,
    /// Last overwrite.
    pub updated_at: DateTime<Utc>,
}
