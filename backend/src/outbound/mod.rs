//! Outbound adapters implementing the driven domain ports.
//!
//! - **persistence**: PostgreSQL repositories using Diesel
//! - **security**: Argon2id password hashing and HS256 bearer tokens
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business rules.

pub mod persistence;
pub mod security;
