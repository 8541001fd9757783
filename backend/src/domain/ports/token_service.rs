//! Port for issuing and verifying bearer tokens.

use crate::domain::{AccessToken, Identity};

use super::define_port_error;

define_port_error! {
    /// Errors raised by token adapters.
    pub enum TokenServiceError {
        /// The token could not be created.
        Issue { message: String } => "failed to issue token: {message}",
        /// The token is malformed, tampered with, or carries bad claims.
        Invalid { message: String } => "invalid token: {message}",
        /// The token was valid once but has expired.
        Expired => "token has expired",
    }
}

/// Port for stateless bearer tokens.
#[cfg_attr(test, mockall::automock)]
pub trait TokenService: Send + Sync {
    /// Issue a signed token for `identity`.
    fn issue(&self, identity: &Identity) -> Result<AccessToken, TokenServiceError>;

    /// Verify a token and recover the identity it was issued for.
    fn verify(&self, token: &str) -> Result<Identity, TokenServiceError>;
}
