//! PostgreSQL persistence adapters using Diesel.
//!
//! Repositories translate between Diesel rows and domain types and map
//! storage failures onto their port error enums. Row structs
//! (`models.rs`) and table definitions (`schema.rs`) stay private to this
//! module.
//!
//! ```ignore
//! use campussphere::outbound::persistence::{DbPool, DieselVoteRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/campussphere")).await?;
//! let votes = DieselVoteRepository::new(pool);
//! ```

mod diesel_account_repository;
mod diesel_community_repository;
mod diesel_content_repository;
pub(crate) mod diesel_helpers;
mod diesel_vote_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_account_repository::DieselAccountRepository;
pub use diesel_community_repository::DieselCommunityRepository;
pub use diesel_content_repository::DieselContentRepository;
pub use diesel_vote_repository::DieselVoteRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
