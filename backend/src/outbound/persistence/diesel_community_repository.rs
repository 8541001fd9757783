//! PostgreSQL-backed [`CommunityRepository`].
//!
//! Community creation writes the community row and its owner membership in
//! one transaction. Joins rely on the `(user_id, community_id)` primary key
//! with `ON CONFLICT DO NOTHING`, so concurrent joins settle on exactly one
//! row and an existing owner row is never downgraded.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::AsyncConnection as _;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt as _;

use crate::domain::ports::{CommunityRepository, CommunityRepositoryError};
use crate::domain::{Community, CommunityId, JoinOutcome, Membership, UserId};

use super::diesel_helpers::{DbFailure, collect_rows, count_to_u64};
use super::models::{CommunityRow, MembershipRow, NewCommunityRow, NewMembershipRow};
use super::pool::DbPool;
use super::schema::{communities, community_members};

const MEMBER_COMMUNITY_FKEY: &str = "community_members_community_id_fkey";

/// Diesel implementation of the community repository.
#[derive(Clone)]
pub struct DieselCommunityRepository {
    pool: DbPool,
}

impl DieselCommunityRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_failure(failure: impl Into<DbFailure>) -> CommunityRepositoryError {
    match failure.into().into_parts() {
        (true, message) => CommunityRepositoryError::connection(message),
        (false, message) => CommunityRepositoryError::query(message),
    }
}

fn map_membership_failure(
    error: diesel::result::Error,
    community_id: &CommunityId,
) -> CommunityRepositoryError {
    let failure = DbFailure::from(error);
    if failure.violates_foreign_key(MEMBER_COMMUNITY_FKEY) {
        CommunityRepositoryError::community_not_found(community_id.to_string())
    } else {
        map_failure(failure)
    }
}

#[async_trait]
impl CommunityRepository for DieselCommunityRepository {
    async fn create_with_owner(
        &self,
        community: &Community,
        owner: &Membership,
    ) -> Result<(), CommunityRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_failure)?;
        let community_row = NewCommunityRow::from(community);
        let owner_row = NewMembershipRow::from(owner);

        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                diesel::insert_into(communities::table)
                    .values(&community_row)
                    .execute(conn)
                    .await?;
                diesel::insert_into(community_members::table)
                    .values(&owner_row)
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_failure)
    }

    async fn find_by_id(
        &self,
        id: &CommunityId,
    ) -> Result<Option<Community>, CommunityRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_failure)?;

        let row: Option<CommunityRow> = communities::table
            .filter(communities::id.eq(id.as_uuid()))
            .select(CommunityRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_failure)?;

        row.map(Community::try_from)
            .transpose()
            .map_err(CommunityRepositoryError::query)
    }

    async fn list(&self) -> Result<Vec<Community>, CommunityRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_failure)?;

        let rows: Vec<CommunityRow> = communities::table
            .select(CommunityRow::as_select())
            .order_by((communities::created_at.desc(), communities::id.desc()))
            .load(&mut conn)
            .await
            .map_err(map_failure)?;

        collect_rows(
            rows.into_iter().map(Community::try_from),
            CommunityRepositoryError::query,
        )
    }

    async fn add_member(
        &self,
        membership: &Membership,
    ) -> Result<JoinOutcome, CommunityRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_failure)?;

        let inserted = diesel::insert_into(community_members::table)
            .values(NewMembershipRow::from(membership))
            .on_conflict((community_members::user_id, community_members::community_id))
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(|err| map_membership_failure(err, &membership.community_id))?;

        Ok(if inserted == 0 {
            JoinOutcome::AlreadyMember
        } else {
            JoinOutcome::Joined
        })
    }

    async fn count_members(&self, id: &CommunityId) -> Result<u64, CommunityRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_failure)?;

        let count: i64 = community_members::table
            .filter(community_members::community_id.eq(id.as_uuid()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_failure)?;

        Ok(count_to_u64(count))
    }

    async fn find_membership(
        &self,
        user_id: &UserId,
        community_id: &CommunityId,
    ) -> Result<Option<Membership>, CommunityRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_failure)?;

        let row: Option<MembershipRow> = community_members::table
            .filter(community_members::user_id.eq(user_id.as_uuid()))
            .filter(community_members::community_id.eq(community_id.as_uuid()))
            .select(MembershipRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_failure)?;

        row.map(Membership::try_from)
            .transpose()
            .map_err(CommunityRepositoryError::query)
    }
}
