//! Account domain service: registration, login, and token checks.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info};

use crate::domain::ports::{
    AccountRepository, AccountRepositoryError, AuthService, LoginRequest, PasswordHasher,
    PasswordHasherError, RegisterRequest, TokenService, TokenServiceError,
};
use crate::domain::{
    AccessToken, Account, Email, Error, Identity, Password, UserId, UserName, UserRole,
};

const BAD_CREDENTIALS: &str = "invalid email or password";

fn map_account_repository_error(error: AccountRepositoryError) -> Error {
    match error {
        AccountRepositoryError::Connection { message } => {
            Error::internal(format!("account storage unavailable: {message}"))
        }
        AccountRepositoryError::Query { message } => {
            Error::internal(format!("account storage error: {message}"))
        }
        AccountRepositoryError::DuplicateEmail { email } => {
            Error::conflict(format!("an account already exists for {email}"))
        }
    }
}

fn map_hasher_error(error: PasswordHasherError) -> Error {
    Error::internal(error.to_string())
}

fn map_token_error(error: TokenServiceError) -> Error {
    match error {
        TokenServiceError::Issue { message } => {
            Error::internal(format!("failed to issue token: {message}"))
        }
        TokenServiceError::Invalid { .. } => Error::unauthorized("invalid bearer token"),
        TokenServiceError::Expired => Error::unauthorized("bearer token has expired"),
    }
}

/// Account service implementing [`AuthService`].
#[derive(Clone)]
pub struct AccountService<R> {
    accounts: Arc<R>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenService>,
    clock: Arc<dyn Clock>,
}

impl<R> AccountService<R> {
    /// Create an account service.
    pub fn new(
        accounts: Arc<R>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            accounts,
            hasher,
            tokens,
            clock,
        }
    }
}

#[async_trait]
impl<R> AuthService for AccountService<R>
where
    R: AccountRepository,
{
    async fn register(&self, request: RegisterRequest) -> Result<Account, Error> {
        let RegisterRequest {
            name,
            email,
            password,
        } = request;
        let name = UserName::new(name)?;
        let email = Email::new(email)?;
        let password = Password::new(password)?;

        if self
            .accounts
            .find_by_email(&email)
            .await
            .map_err(map_account_repository_error)?
            .is_some()
        {
            return Err(Error::conflict(format!("an account already exists for {email}")));
        }

        let account = Account {
            id: UserId::random(),
            name,
            email,
            password_hash: self.hasher.hash(&password).map_err(map_hasher_error)?,
            role: UserRole::Student,
            created_at: self.clock.utc(),
        };
        self.accounts
            .insert(&account)
            .await
            .map_err(map_account_repository_error)?;

        info!(user_id = %account.id, "account registered");
        Ok(account)
    }

    async fn login(&self, request: LoginRequest) -> Result<AccessToken, Error> {
        let Ok(email) = Email::new(&request.email) else {
            return Err(Error::unauthorized(BAD_CREDENTIALS));
        };
        let password = Password::unchecked(request.password);

        let Some(account) = self
            .accounts
            .find_by_email(&email)
            .await
            .map_err(map_account_repository_error)?
        else {
            debug!("login attempt for unknown email");
            return Err(Error::unauthorized(BAD_CREDENTIALS));
        };

        let verified = self
            .hasher
            .verify(&password, &account.password_hash)
            .map_err(map_hasher_error)?;
        if !verified {
            debug!(user_id = %account.id, "login attempt with wrong password");
            return Err(Error::unauthorized(BAD_CREDENTIALS));
        }

        let token = self
            .tokens
            .issue(&account.identity())
            .map_err(map_token_error)?;
        info!(user_id = %account.id, "login succeeded");
        Ok(token)
    }

    fn authenticate(&self, token: &str) -> Result<Identity, Error> {
        self.tokens.verify(token).map_err(|err| {
            debug!(error = %err, "bearer token rejected");
            map_token_error(err)
        })
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
