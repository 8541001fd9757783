//! Credential adapters: password hashing and bearer tokens.

mod argon2_password_hasher;
mod jwt_token_service;

pub use argon2_password_hasher::Argon2PasswordHasher;
pub use jwt_token_service::{JwtTokenService, MIN_SECRET_LEN, WeakSecretError};
