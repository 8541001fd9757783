//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::web;

use crate::domain::ports::{
    MockAuthService, MockCommunityQuery, MockContentCommand, MockContentQuery,
    MockMembershipCommand, MockVoteCommand,
};
use crate::domain::{Error, Identity, UserId, UserRole};
use crate::inbound::http::state::HttpState;

/// Bearer token accepted by [`TestPorts::signed_in_as`].
pub const TEST_TOKEN: &str = "test-token";

/// Mock for every driving port; set expectations before calling
/// [`state_with`].
#[derive(Default)]
pub struct TestPorts {
    pub auth: MockAuthService,
    pub membership: MockMembershipCommand,
    pub communities: MockCommunityQuery,
    pub content: MockContentCommand,
    pub content_query: MockContentQuery,
    pub votes: MockVoteCommand,
}

impl TestPorts {
    /// Accept [`TEST_TOKEN`] as proof of `user` and reject anything else.
    pub fn signed_in_as(mut self, user: UserId) -> Self {
        self.auth.expect_authenticate().returning(move |token| {
            if token == TEST_TOKEN {
                Ok(Identity {
                    user_id: user,
                    role: UserRole::Student,
                })
            } else {
                Err(Error::unauthorized("invalid bearer token"))
            }
        });
        self
    }
}

/// `Authorization` header value carrying [`TEST_TOKEN`].
pub fn bearer() -> (actix_web::http::header::HeaderName, String) {
    (
        actix_web::http::header::AUTHORIZATION,
        format!("Bearer {TEST_TOKEN}"),
    )
}

/// Wrap mocked ports as application data.
pub fn state_with(ports: TestPorts) -> web::Data<HttpState> {
    web::Data::new(HttpState {
        auth: Arc::new(ports.auth),
        membership: Arc::new(ports.membership),
        communities: Arc::new(ports.communities),
        content: Arc::new(ports.content),
        content_query: Arc::new(ports.content_query),
        votes: Arc::new(ports.votes),
    })
}
