//! Membership manager domain service.
//!
//! Creates communities together with their owner membership and records
//! idempotent joins. Also serves the community read side, since both halves
//! share the same repository.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info};

use crate::domain::ports::{
    CommunityQuery, CommunityRepository, CommunityRepositoryError, CreateCommunityRequest,
    JoinCommunityRequest, MembershipCommand,
};
use crate::domain::{
    Community, CommunityDescription, CommunityDetail, CommunityId, CommunityName, Error,
    JoinOutcome, Membership, MembershipRole,
};

pub(crate) fn map_community_repository_error(error: CommunityRepositoryError) -> Error {
    match error {
        CommunityRepositoryError::Connection { message } => {
            Error::internal(format!("community storage unavailable: {message}"))
        }
        CommunityRepositoryError::Query { message } => {
            Error::internal(format!("community storage error: {message}"))
        }
        CommunityRepositoryError::CommunityNotFound { community_id } => {
            community_not_found(&community_id)
        }
    }
}

pub(crate) fn community_not_found(community_id: &impl std::fmt::Display) -> Error {
    Error::not_found(format!("community {community_id} does not exist"))
}

/// Membership manager implementing [`MembershipCommand`] and [`CommunityQuery`].
#[derive(Clone)]
pub struct MembershipManager<R> {
    communities: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> MembershipManager<R> {
    /// Create a manager over the community repository.
    pub fn new(communities: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { communities, clock }
    }
}

impl<R> MembershipManager<R>
where
    R: CommunityRepository,
{
    async fn require_community(&self, id: &CommunityId) -> Result<Community, Error> {
        self.communities
            .find_by_id(id)
            .await
            .map_err(map_community_repository_error)?
            .ok_or_else(|| community_not_found(id))
    }
}

#[async_trait]
impl<R> MembershipCommand for MembershipManager<R>
where
    R: CommunityRepository,
{
    async fn create_community(&self, request: CreateCommunityRequest) -> Result<Community, Error> {
        let name = CommunityName::new(request.name)?;
        let description = CommunityDescription::new(request.description)?;
        let community = Community {
            id: CommunityId::random(),
            name,
            description,
            created_by: request.creator,
            created_at: self.clock.utc(),
        };
        let owner = Membership::owner_of(&community);

        self.communities
            .create_with_owner(&community, &owner)
            .await
            .map_err(map_community_repository_error)?;

        info!(
            community_id = %community.id,
            owner = %community.created_by,
            "community created"
        );
        Ok(community)
    }

    async fn join_community(&self, request: JoinCommunityRequest) -> Result<JoinOutcome, Error> {
        self.require_community(&request.community_id).await?;

        let membership = Membership {
            user_id: request.user,
            community_id: request.community_id,
            role: MembershipRole::Member,
            joined_at: self.clock.utc(),
        };
        let outcome = self
            .communities
            .add_member(&membership)
            .await
            .map_err(map_community_repository_error)?;

        match outcome {
            JoinOutcome::Joined => info!(
                community_id = %request.community_id,
                user_id = %request.user,
                "member joined community"
            ),
            JoinOutcome::AlreadyMember => debug!(
                community_id = %request.community_id,
                user_id = %request.user,
                "join ignored for existing member"
            ),
        }
        Ok(outcome)
    }
}

#[async_trait]
impl<R> CommunityQuery for MembershipManager<R>
where
    R: CommunityRepository,
{
    async fn list_communities(&self) -> Result<Vec<Community>, Error> {
        self.communities
            .list()
            .await
            .map_err(map_community_repository_error)
    }

    async fn get_community(&self, id: CommunityId) -> Result<CommunityDetail, Error> {
        let community = self.require_community(&id).await?;
        let member_count = self
            .communities
            .count_members(&id)
            .await
            .map_err(map_community_repository_error)?;
        Ok(CommunityDetail {
            community,
            member_count,
        })
    }
}

#[cfg(test)]
#[path = "membership_manager_tests.rs"]
mod tests;
