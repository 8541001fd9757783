//! PostgreSQL-backed [`AccountRepository`].

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{AccountRepository, AccountRepositoryError};
use crate::domain::{Account, Email, UserId};

use super::diesel_helpers::DbFailure;
use super::models::{NewUserRow, UserRow};
use super::pool::DbPool;
use super::schema::users;

const EMAIL_UNIQUE_INDEX: &str = "users_email_key";

/// Diesel implementation of the account repository.
#[derive(Clone)]
pub struct DieselAccountRepository {
    pool: DbPool,
}

impl DieselAccountRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_failure(failure: impl Into<DbFailure>) -> AccountRepositoryError {
    match failure.into().into_parts() {
        (true, message) => AccountRepositoryError::connection(message),
        (false, message) => AccountRepositoryError::query(message),
    }
}

fn map_row(row: UserRow) -> Result<Account, AccountRepositoryError> {
    Account::try_from(row).map_err(AccountRepositoryError::query)
}

#[async_trait]
impl AccountRepository for DieselAccountRepository {
    async fn insert(&self, account: &Account) -> Result<(), AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_failure)?;

        diesel::insert_into(users::table)
            .values(NewUserRow::from(account))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| {
                let failure = DbFailure::from(err);
                if failure.violates_unique(EMAIL_UNIQUE_INDEX) {
                    AccountRepositoryError::duplicate_email(account.email.as_ref())
                } else {
                    map_failure(failure)
                }
            })
    }

    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<Account>, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_failure)?;

        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_failure)?;

        row.map(map_row).transpose()
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<Account>, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_failure)?;

        let row: Option<UserRow> = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_failure)?;

        row.map(map_row).transpose()
    }
}
