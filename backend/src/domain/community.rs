//! Communities and their memberships.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::text::bounded_text;
use super::{CommunityId, UserId};

bounded_text!(
    /// Community name, trimmed.
    CommunityName, field = "name", min = 1, max = 100, trimmed
);

bounded_text!(
    /// Free-form community description; may be empty.
    CommunityDescription, field = "description", min = 0, max = 2000, trimmed
);

/// Discussion community. Communities are never deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Community {
    /// Community identifier.
    pub id: CommunityId,
    /// Display name.
    pub name: CommunityName,
    /// Description shown on the community page.
    pub description: CommunityDescription,
    /// Account that created the community and holds the owner membership.
    pub created_by: UserId,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Role a user holds within a community.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipRole {
    /// Creator of the community.
    Owner,
    /// Anyone who joined afterwards.
    Member,
}

/// Raised when a stored membership role is unknown.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown membership role: {0}")]
pub struct UnknownMembershipRole(pub String);

impl MembershipRole {
    /// Stable storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Member => "member",
        }
    }
}

impl std::str::FromStr for MembershipRole {
    type Err = UnknownMembershipRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(Self::Owner),
            "member" => Ok(Self::Member),
            other => Err(UnknownMembershipRole(other.to_owned())),
        }
    }
}

/// Membership row keyed by `(user_id, community_id)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Membership {
    /// Member account.
    pub user_id: UserId,
    /// Community joined.
    pub community_id: CommunityId,
    /// Owner or member.
    pub role: MembershipRole,
    /// When the row was first written.
    pub joined_at: DateTime<Utc>,
}

impl Membership {
    /// Owner membership written alongside a new community.
    #[must_use]
    pub fn owner_of(community: &Community) -> Self {
        Self {
            user_id: community.created_by,
            community_id: community.id,
            role: MembershipRole::Owner,
            joined_at: community.created_at,
        }
    }
}

/// Result of an idempotent join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// A new `member` row was written.
    Joined,
    /// A row already existed; nothing changed.
    AlreadyMember,
}

/// Community plus its current member count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommunityDetail {
    /// The community itself.
    pub community: Community,
    /// Number of membership rows, owner included.
    pub member_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TextValidationError;
    use rstest::rstest;

    #[rstest]
    fn name_is_trimmed_and_bounded() {
        assert_eq!(
            CommunityName::new("  CS101  ").map(String::from),
            Ok("CS101".to_owned())
        );
        assert_eq!(
            CommunityName::new("   "),
            Err(TextValidationError::Empty { field: "name" })
        );
        assert_eq!(
            CommunityName::new("x".repeat(101)),
            Err(TextValidationError::TooLong {
                field: "name",
                max: 100
            })
        );
    }

    #[rstest]
    fn description_may_be_empty() {
        let description = CommunityDescription::new("").expect("empty is allowed");
        assert_eq!(description.as_str(), "");
        assert!(CommunityDescription::new("d".repeat(2001)).is_err());
    }

    #[rstest]
    fn owner_membership_mirrors_community() {
        let community = Community {
            id: CommunityId::random(),
            name: CommunityName::new("CS101").expect("valid name"),
            description: CommunityDescription::new("").expect("valid description"),
            created_by: UserId::random(),
            created_at: Utc::now(),
        };
        let membership = Membership::owner_of(&community);
        assert_eq!(membership.user_id, community.created_by);
        assert_eq!(membership.community_id, community.id);
        assert_eq!(membership.role, MembershipRole::Owner);
    }

    #[rstest]
    fn role_round_trips_through_storage_text() {
        for role in [MembershipRole::Owner, MembershipRole::Member] {
            assert_eq!(role.as_str().parse::<MembershipRole>(), Ok(role));
        }
    }
}
