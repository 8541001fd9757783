//! Domain ports for the hexagonal boundary.
//!
//! Driving ports (`*Command`, `*Query`, [`AuthService`]) are called by inbound
//! adapters. Driven ports (`*Repository`, [`TokenService`],
//! [`PasswordHasher`]) are implemented by outbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod account_repository;
mod auth_service;
mod community_query;
mod community_repository;
mod content_command;
mod content_query;
mod content_repository;
mod membership_command;
mod password_hasher;
mod token_service;
mod vote_command;
mod vote_repository;

#[cfg(test)]
pub use account_repository::MockAccountRepository;
pub use account_repository::{AccountRepository, AccountRepositoryError};
#[cfg(test)]
pub use auth_service::MockAuthService;
pub use auth_service::{AuthService, LoginRequest, RegisterRequest};
#[cfg(test)]
pub use community_query::MockCommunityQuery;
pub use community_query::CommunityQuery;
#[cfg(test)]
pub use community_repository::MockCommunityRepository;
pub use community_repository::{CommunityRepository, CommunityRepositoryError};
#[cfg(test)]
pub use content_command::MockContentCommand;
pub use content_command::{ContentCommand, CreateCommentRequest, CreatePostRequest};
#[cfg(test)]
pub use content_query::MockContentQuery;
pub use content_query::ContentQuery;
#[cfg(test)]
pub use content_repository::MockContentRepository;
pub use content_repository::{ContentRepository, ContentRepositoryError};
#[cfg(test)]
pub use membership_command::MockMembershipCommand;
pub use membership_command::{CreateCommunityRequest, JoinCommunityRequest, MembershipCommand};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHasher, PasswordHasherError};
#[cfg(test)]
pub use token_service::MockTokenService;
pub use token_service::{TokenService, TokenServiceError};
#[cfg(test)]
pub use vote_command::MockVoteCommand;
pub use vote_command::{SubmitVoteRequest, SubmitVoteResponse, VoteCommand};
#[cfg(test)]
pub use vote_repository::MockVoteRepository;
pub use vote_repository::{VoteRepository, VoteRepositoryError};
