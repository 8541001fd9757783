//! Shared HTTP adapter state.
//!
//! Handlers receive this through `actix_web::web::Data` and only see the
//! driving ports, so they can be exercised without a database.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    AccountRepository, AuthService, CommunityQuery, CommunityRepository, ContentCommand,
    ContentQuery, ContentRepository, MembershipCommand, PasswordHasher, TokenService,
    VoteCommand, VoteRepository,
};
use crate::domain::{AccountService, ContentService, MembershipManager, VoteLedger};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Registration, login, and bearer token checks.
    pub auth: Arc<dyn AuthService>,
    /// Community creation and joins.
    pub membership: Arc<dyn MembershipCommand>,
    /// Community listing and detail.
    pub communities: Arc<dyn CommunityQuery>,
    /// Post and comment creation.
    pub content: Arc<dyn ContentCommand>,
    /// Post and comment listings.
    pub content_query: Arc<dyn ContentQuery>,
    /// Vote submission.
    pub votes: Arc<dyn VoteCommand>,
}

/// Driven adapters the domain services are built from.
pub struct HttpStateAdapters<A, M, C, V> {
    pub accounts: Arc<A>,
    pub communities: Arc<M>,
    pub content: Arc<C>,
    pub votes: Arc<V>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub tokens: Arc<dyn TokenService>,
    pub clock: Arc<dyn Clock>,
}

impl HttpState {
    /// Build every domain service over the supplied adapters.
    ///
    /// The same adapters back the server and the in-memory integration
    /// tests, so wiring lives in one place.
    pub fn from_adapters<A, M, C, V>(adapters: HttpStateAdapters<A, M, C, V>) -> Self
    where
        A: AccountRepository + 'static,
        M: CommunityRepository + 'static,
        C: ContentRepository + 'static,
        V: VoteRepository + 'static,
    {
        let HttpStateAdapters {
            accounts,
            communities,
            content,
            votes,
            hasher,
            tokens,
            clock,
        } = adapters;

        let membership = Arc::new(MembershipManager::new(communities.clone(), clock.clone()));
        let content_service = Arc::new(ContentService::new(
            content.clone(),
            communities,
            clock.clone(),
        ));
        let ledger = Arc::new(VoteLedger::new(votes, content, clock.clone()));
        let auth = Arc::new(AccountService::new(accounts, hasher, tokens, clock));

        Self {
            auth,
            membership: membership.clone(),
            communities: membership,
            content: content_service.clone(),
            content_query: content_service,
            votes: ledger,
        }
    }
}
