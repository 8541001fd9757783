//! HTTP inbound adapter exposing the `/api/v1` REST endpoints.

pub mod accounts;
pub mod auth;
pub mod communities;
pub mod content;
pub mod error;
pub mod health;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;
pub mod votes;

pub use error::ApiResult;
