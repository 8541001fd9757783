//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every `/api/v1` handler, the health checks, and the
//! adapter-side schema mirrors ([`ErrorSchema`], [`ErrorCodeSchema`]). Mutating
//! endpoints inherit the global `BearerAuth` requirement; public reads opt out
//! with `security([])` on their path annotations.
//!
//! The document backs Swagger UI in debug builds and is exported by the
//! `openapi-dump` binary.

use crate::inbound::http::accounts::{AccountResponse, LoginBody, RegisterBody, TokenResponse};
use crate::inbound::http::communities::{
    CommunityDetailResponse, CommunityResponse, CreateCommunityBody, JoinResponse,
};
use crate::inbound::http::content::{
    CommentResponse, CreateCommentBody, CreatePostBody, PostResponse,
};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::votes::{VoteBody, VoteResponse};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Name of the bearer security scheme.
pub const BEARER_SCHEME: &str = "BearerAuth";

/// Register the JWT bearer scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            BEARER_SCHEME,
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Token issued by POST /api/v1/auth/login."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "CampusSphere API",
        description = "Communities, threaded discussion, and voting for campus students."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerAuth" = [])),
    paths(
        crate::inbound::http::accounts::register,
        crate::inbound::http::accounts::login,
        crate::inbound::http::communities::list_communities,
        crate::inbound::http::communities::create_community,
        crate::inbound::http::communities::get_community,
        crate::inbound::http::communities::join_community,
        crate::inbound::http::content::list_posts,
        crate::inbound::http::content::create_post,
        crate::inbound::http::content::list_comments,
        crate::inbound::http::content::create_comment,
        crate::inbound::http::votes::submit_vote,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        RegisterBody,
        LoginBody,
        AccountResponse,
        TokenResponse,
        CreateCommunityBody,
        CommunityResponse,
        CommunityDetailResponse,
        JoinResponse,
        CreatePostBody,
        PostResponse,
        CreateCommentBody,
        CommentResponse,
        VoteBody,
        VoteResponse,
    )),
    tags(
        (name = "auth", description = "Registration and login"),
        (name = "communities", description = "Communities and membership"),
        (name = "content", description = "Posts and threaded comments"),
        (name = "votes", description = "Voting on posts and comments"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
