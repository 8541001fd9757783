//! Port for account persistence.

use async_trait::async_trait;

use crate::domain::{Account, Email, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by account repository adapters.
    pub enum AccountRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "account repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "account repository query failed: {message}",
        /// Another account already uses the email address.
        DuplicateEmail { email: String } =>
            "an account already exists for {email}",
    }
}

/// Port for storing and loading accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Insert a new account.
    ///
    /// Fails with [`AccountRepositoryError::DuplicateEmail`] when the email
    /// is already registered.
    async fn insert(&self, account: &Account) -> Result<(), AccountRepositoryError>;

    /// Look an account up by its normalised email.
    async fn find_by_email(&self, email: &Email)
    -> Result<Option<Account>, AccountRepositoryError>;

    /// Look an account up by id.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<Account>, AccountRepositoryError>;
}
