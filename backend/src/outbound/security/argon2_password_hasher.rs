//! Argon2id implementation of [`PasswordHasher`].
//!
//! Hashes are stored as PHC strings, which embed the algorithm, parameters,
//! and salt, so verification needs nothing beyond the stored value.

use argon2::password_hash::{self, SaltString};
use argon2::{Argon2, Params, PasswordHasher as _, PasswordVerifier as _};
use rand::RngCore as _;
use rand::rngs::OsRng;

use crate::domain::ports::{PasswordHasher, PasswordHasherError};
use crate::domain::{Password, PasswordHash};

const SALT_LEN: usize = 16;

/// Argon2id password hasher.
#[derive(Clone)]
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
}

impl Argon2PasswordHasher {
    /// Hasher using the crate's default Argon2id parameters.
    pub fn new() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }

    /// Hasher with explicit cost parameters.
    ///
    /// Low-cost parameters keep test suites fast; production uses
    /// [`Argon2PasswordHasher::new`].
    pub fn with_params(params: Params) -> Self {
        Self {
            argon2: Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params),
        }
    }

    fn salt() -> Result<SaltString, PasswordHasherError> {
        let mut bytes = [0_u8; SALT_LEN];
        OsRng.fill_bytes(&mut bytes);
        SaltString::encode_b64(&bytes).map_err(|err| PasswordHasherError::hash(err.to_string()))
    }
}

impl Default for Argon2PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &Password) -> Result<PasswordHash, PasswordHasherError> {
        let salt = Self::salt()?;
        let encoded = self
            .argon2
            .hash_password(password.expose().as_bytes(), &salt)
            .map_err(|err| PasswordHasherError::hash(err.to_string()))?;
        Ok(PasswordHash::new(encoded.to_string()))
    }

    fn verify(&self, password: &Password, hash: &PasswordHash) -> Result<bool, PasswordHasherError> {
        let parsed = password_hash::PasswordHash::new(hash.as_ref())
            .map_err(|err| PasswordHasherError::malformed_hash(err.to_string()))?;
        match self
            .argon2
            .verify_password(password.expose().as_bytes(), &parsed)
        {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(err) => Err(PasswordHasherError::hash(err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn hasher() -> Argon2PasswordHasher {
        let params = Params::new(8, 1, 1, None).expect("valid low-cost params");
        Argon2PasswordHasher::with_params(params)
    }

    #[rstest]
    fn hashes_verify_against_the_original_password(hasher: Argon2PasswordHasher) {
        let password = Password::new("correct horse battery").expect("valid password");
        let hash = hasher.hash(&password).expect("hashing succeeds");

        assert!(hash.as_ref().starts_with("$argon2id$"));
        assert!(hasher.verify(&password, &hash).expect("verification runs"));
    }

    #[rstest]
    fn wrong_password_is_rejected(hasher: Argon2PasswordHasher) {
        let password = Password::new("correct horse battery").expect("valid password");
        let hash = hasher.hash(&password).expect("hashing succeeds");

        let wrong = Password::unchecked("tr0ub4dor&3");
        assert!(!hasher.verify(&wrong, &hash).expect("verification runs"));
    }

    #[rstest]
    fn same_password_gets_distinct_salts(hasher: Argon2PasswordHasher) {
        let password = Password::new("correct horse battery").expect("valid password");
        let first = hasher.hash(&password).expect("hashing succeeds");
        let second = hasher.hash(&password).expect("hashing succeeds");

        assert_ne!(first, second);
    }

    #[rstest]
    fn malformed_hash_is_reported(hasher: Argon2PasswordHasher) {
        let error = hasher
            .verify(&Password::unchecked("anything"), &PasswordHash::new("plain"))
            .expect_err("malformed hash must fail");

        assert!(matches!(error, PasswordHasherError::MalformedHash { .. }));
    }
}
