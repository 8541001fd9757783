//! HS256 JSON Web Token implementation of [`TokenService`].
//!
//! `iat` and `exp` are read from an injected [`Clock`], and expiry is checked
//! against the same clock, so tests can move time without sleeping.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mockable::{Clock, DefaultClock};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::domain::ports::{TokenService, TokenServiceError};
use crate::domain::{AccessToken, Identity, UserId, UserRole};

/// Minimum HMAC secret length in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// Registered and private claims carried by access tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Claims {
    sub: String,
    role: String,
    iat: u64,
    exp: u64,
}

/// Raised when the signing secret is too short.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("jwt secret must be at least {MIN_SECRET_LEN} bytes, got {actual}")]
pub struct WeakSecretError {
    /// Length of the rejected secret.
    pub actual: usize,
}

/// Signs and verifies HS256 access tokens.
#[derive(Clone)]
pub struct JwtTokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl JwtTokenService {
    /// Build a service from a shared secret and token lifetime.
    ///
    /// # Errors
    ///
    /// Returns [`WeakSecretError`] when `secret` is shorter than
    /// [`MIN_SECRET_LEN`].
    pub fn new(secret: &Zeroizing<String>, ttl: Duration) -> Result<Self, WeakSecretError> {
        let bytes = secret.as_bytes();
        if bytes.len() < MIN_SECRET_LEN {
            return Err(WeakSecretError {
                actual: bytes.len(),
            });
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            ttl,
            clock: Arc::new(DefaultClock),
        })
    }

    /// Read token time from `clock` instead of the system clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    fn now(&self) -> u64 {
        u64::try_from(self.clock.utc().timestamp()).unwrap_or(0)
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is compared against the injected clock in `verify`.
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation
    }

    fn issue_at(&self, identity: &Identity, now: u64) -> Result<AccessToken, TokenServiceError> {
        let claims = Claims {
            sub: identity.user_id.to_string(),
            role: identity.role.as_str().to_owned(),
            iat: now,
            exp: now.saturating_add(self.ttl.as_secs()),
        };
        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|err| TokenServiceError::issue(err.to_string()))?;
        Ok(AccessToken {
            token,
            expires_in: self.ttl.as_secs(),
        })
    }
}

impl fmt::Debug for JwtTokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtTokenService")
            .field("keys", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, identity: &Identity) -> Result<AccessToken, TokenServiceError> {
        self.issue_at(identity, self.now())
    }

    fn verify(&self, token: &str) -> Result<Identity, TokenServiceError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &Self::validation())
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => TokenServiceError::expired(),
                _ => TokenServiceError::invalid(err.to_string()),
            })?;
        let claims = data.claims;
        if claims.exp <= self.now() {
            return Err(TokenServiceError::expired());
        }
        let user_id = claims
            .sub
            .parse::<UserId>()
            .map_err(|err| TokenServiceError::invalid(err.to_string()))?;
        let role = claims
            .role
            .parse::<UserRole>()
            .map_err(|err| TokenServiceError::invalid(err.to_string()))?;
        Ok(Identity { user_id, role })
    }
}
