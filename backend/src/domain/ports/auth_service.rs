//! Driving port for registration, login, and bearer-token checks.
//!
//! Inbound adapters call this port to turn credentials into tokens and tokens
//! into identities without touching hashing or signing code.

use async_trait::async_trait;

use crate::domain::{AccessToken, Account, Error, Identity};

/// Registration form as received from an inbound adapter.
#[derive(Clone, PartialEq, Eq)]
pub struct RegisterRequest {
    /// Display name.
    pub name: String,
    /// Email address; normalised to lowercase.
    pub email: String,
    /// Plain-text password.
    pub password: String,
}

/// Login form as received from an inbound adapter.
#[derive(Clone, PartialEq, Eq)]
pub struct LoginRequest {
    /// Email address.
    pub email: String,
    /// Plain-text password.
    pub password: String,
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Create a `student` account.
    async fn register(&self, request: RegisterRequest) -> Result<Account, Error>;

    /// Exchange credentials for a bearer token.
    async fn login(&self, request: LoginRequest) -> Result<AccessToken, Error>;

    /// Resolve a bearer token to the caller's identity.
    fn authenticate(&self, token: &str) -> Result<Identity, Error>;
}
