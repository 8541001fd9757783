//! Community HTTP handlers.
//!
//! ```text
//! GET  /api/v1/communities
//! POST /api/v1/communities {"name":"CS101","description":"Intro to CS"}
//! GET  /api/v1/communities/{community_id}
//! POST /api/v1/communities/{community_id}/join
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{CreateCommunityRequest, JoinCommunityRequest};
use crate::domain::{Community, CommunityDetail, CommunityId, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_uuid, require};

#[derive(Debug, Deserialize)]
pub(crate) struct CommunityPath {
    community_id: String,
}

impl CommunityPath {
    pub(crate) fn parse(self) -> Result<CommunityId, Error> {
        parse_uuid(&self.community_id, "communityId").map(CommunityId::from_uuid)
    }
}

/// Community creation body.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommunityBody {
    #[schema(example = "CS101")]
    pub name: Option<String>,
    #[schema(example = "Introduction to computer science")]
    pub description: Option<String>,
}

/// A community.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommunityResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub created_by: String,
    /// RFC 3339 timestamp.
    pub created_at: String,
}

impl From<Community> for CommunityResponse {
    fn from(community: Community) -> Self {
        Self {
            id: community.id.to_string(),
            name: community.name.into(),
            description: community.description.into(),
            created_by: community.created_by.to_string(),
            created_at: community.created_at.to_rfc3339(),
        }
    }
}

/// A community with its member count.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommunityDetailResponse {
    #[serde(flatten)]
    pub community: CommunityResponse,
    pub member_count: u64,
}

impl From<CommunityDetail> for CommunityDetailResponse {
    fn from(detail: CommunityDetail) -> Self {
        Self {
            community: CommunityResponse::from(detail.community),
            member_count: detail.member_count,
        }
    }
}

/// Join acknowledgement.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct JoinResponse {
    pub ok: bool,
}

/// List communities, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/communities",
    responses(
        (status = 200, description = "Communities", body = [CommunityResponse]),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["communities"],
    operation_id = "listCommunities",
    security([])
)]
#[get("/communities")]
pub async fn list_communities(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<CommunityResponse>>> {
    let communities = state.communities.list_communities().await?;
    Ok(web::Json(
        communities
            .into_iter()
            .map(CommunityResponse::from)
            .collect(),
    ))
}

/// Create a community owned by the caller.
#[utoipa::path(
    post,
    path = "/api/v1/communities",
    request_body = CreateCommunityBody,
    responses(
        (status = 201, description = "Community created", body = CommunityResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["communities"],
    operation_id = "createCommunity"
)]
#[post("/communities")]
pub async fn create_community(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<CreateCommunityBody>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let community = state
        .membership
        .create_community(CreateCommunityRequest {
            creator: user.user_id(),
            name: require(body.name, "name")?,
            description: body.description.unwrap_or_default(),
        })
        .await?;
    Ok(HttpResponse::Created().json(CommunityResponse::from(community)))
}

/// Fetch one community with its member count.
#[utoipa::path(
    get,
    path = "/api/v1/communities/{community_id}",
    params(("community_id" = String, Path, description = "Community identifier")),
    responses(
        (status = 200, description = "Community", body = CommunityDetailResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["communities"],
    operation_id = "getCommunity",
    security([])
)]
#[get("/communities/{community_id}")]
pub async fn get_community(
    state: web::Data<HttpState>,
    path: web::Path<CommunityPath>,
) -> ApiResult<web::Json<CommunityDetailResponse>> {
    let community_id = path.into_inner().parse()?;
    let detail = state.communities.get_community(community_id).await?;
    Ok(web::Json(CommunityDetailResponse::from(detail)))
}

/// Join a community. Repeating the call succeeds without change.
#[utoipa::path(
    post,
    path = "/api/v1/communities/{community_id}/join",
    params(("community_id" = String, Path, description = "Community identifier")),
    responses(
        (status = 200, description = "Caller is a member", body = JoinResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["communities"],
    operation_id = "joinCommunity"
)]
#[post("/communities/{community_id}/join")]
pub async fn join_community(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<CommunityPath>,
) -> ApiResult<web::Json<JoinResponse>> {
    let community_id = path.into_inner().parse()?;
    state
        .membership
        .join_community(JoinCommunityRequest {
            user: user.user_id(),
            community_id,
        })
        .await?;
    Ok(web::Json(JoinResponse { ok: true }))
}

#[cfg(test)]
#[path = "communities_tests.rs"]
mod tests;
