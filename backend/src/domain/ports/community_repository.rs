//! Port for community and membership persistence.
//!
//! Adapters own the transactional guarantees: `create_with_owner` writes the
//! community and its owner membership atomically, and `add_member` is an
//! insert-if-absent keyed on `(user_id, community_id)`.

use async_trait::async_trait;

use crate::domain::{Community, CommunityId, JoinOutcome, Membership, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by community repository adapters.
    pub enum CommunityRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "community repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "community repository query failed: {message}",
        /// The referenced community does not exist.
        CommunityNotFound { community_id: String } =>
            "community {community_id} does not exist",
    }
}

/// Port for communities and their memberships.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommunityRepository: Send + Sync {
    /// Insert `community` and `owner` in one transaction.
    ///
    /// Either both rows are committed or neither is.
    async fn create_with_owner(
        &self,
        community: &Community,
        owner: &Membership,
    ) -> Result<(), CommunityRepositoryError>;

    /// Load a community by id.
    async fn find_by_id(
        &self,
        id: &CommunityId,
    ) -> Result<Option<Community>, CommunityRepositoryError>;

    /// List every community, newest first.
    async fn list(&self) -> Result<Vec<Community>, CommunityRepositoryError>;

    /// Insert `membership` unless a row for the same pair already exists.
    ///
    /// An existing row is left untouched, so an owner stays an owner.
    async fn add_member(
        &self,
        membership: &Membership,
    ) -> Result<JoinOutcome, CommunityRepositoryError>;

    /// Count membership rows for a community.
    async fn count_members(&self, id: &CommunityId) -> Result<u64, CommunityRepositoryError>;

    /// Load the membership row for a pair, if any.
    async fn find_membership(
        &self,
        user_id: &UserId,
        community_id: &CommunityId,
    ) -> Result<Option<Membership>, CommunityRepositoryError>;
}
