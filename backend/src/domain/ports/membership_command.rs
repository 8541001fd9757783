//! Driving port for community creation and joining.

use async_trait::async_trait;

use crate::domain::{Community, CommunityId, Error, JoinOutcome, UserId};

/// Request to create a community owned by `creator`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCommunityRequest {
    /// Authenticated creator; becomes the owner.
    pub creator: UserId,
    /// Raw name, validated by the manager.
    pub name: String,
    /// Raw description, may be empty.
    pub description: String,
}

/// Request for `user` to join a community.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinCommunityRequest {
    /// Authenticated user.
    pub user: UserId,
    /// Community to join.
    pub community_id: CommunityId,
}

/// Domain use-case port for membership mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MembershipCommand: Send + Sync {
    /// Create a community and its owner membership atomically.
    async fn create_community(&self, request: CreateCommunityRequest) -> Result<Community, Error>;

    /// Join a community. Joining twice succeeds and changes nothing.
    async fn join_community(&self, request: JoinCommunityRequest) -> Result<JoinOutcome, Error>;
}
