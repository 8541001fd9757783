//! Port for one-way password hashing.

use crate::domain::{Password, PasswordHash};

use super::define_port_error;

define_port_error! {
    /// Errors raised by password hashing adapters.
    pub enum PasswordHasherError {
        /// Hashing failed.
        Hash { message: String } => "password hashing failed: {message}",
        /// A stored hash could not be parsed.
        MalformedHash { message: String } => "stored password hash is malformed: {message}",
    }
}

/// Port for hashing and checking passwords.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// Hash a password with a fresh salt.
    fn hash(&self, password: &Password) -> Result<PasswordHash, PasswordHasherError>;

    /// Check `password` against a stored hash.
    fn verify(&self, password: &Password, hash: &PasswordHash)
    -> Result<bool, PasswordHasherError>;
}
