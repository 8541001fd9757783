//! Builders for HTTP state backed by PostgreSQL and the security adapters.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};

use campussphere::inbound::http::state::{HttpState, HttpStateAdapters};
use campussphere::outbound::persistence::{
    DbPool, DieselAccountRepository, DieselCommunityRepository, DieselContentRepository,
    DieselVoteRepository,
};
use campussphere::outbound::security::{Argon2PasswordHasher, JwtTokenService};

use super::ServerConfig;

/// Wire Diesel repositories, Argon2, and JWT adapters into the domain
/// services exposed to handlers.
///
/// # Errors
/// Returns [`std::io::Error`] when the JWT secret is too short to sign with.
pub(crate) fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let tokens = JwtTokenService::new(&config.jwt_secret, config.token_ttl)
        .map_err(|err| std::io::Error::other(format!("jwt configuration rejected: {err}")))?
        .with_clock(clock.clone());
    let pool: &DbPool = &config.db_pool;

    let state = HttpState::from_adapters(HttpStateAdapters {
        accounts: Arc::new(DieselAccountRepository::new(pool.clone())),
        communities: Arc::new(DieselCommunityRepository::new(pool.clone())),
        content: Arc::new(DieselContentRepository::new(pool.clone())),
        votes: Arc::new(DieselVoteRepository::new(pool.clone())),
        hasher: Arc::new(Argon2PasswordHasher::new()),
        tokens: Arc::new(tokens),
        clock,
    });
    Ok(web::Data::new(state))
}
