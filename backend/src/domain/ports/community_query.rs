//! Driving port for reading communities.

use async_trait::async_trait;

use crate::domain::{Community, CommunityDetail, CommunityId, Error};

/// Domain use-case port for community reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommunityQuery: Send + Sync {
    /// Every community, newest first.
    async fn list_communities(&self) -> Result<Vec<Community>, Error>;

    /// One community with its member count.
    async fn get_community(&self, id: CommunityId) -> Result<CommunityDetail, Error>;
}
