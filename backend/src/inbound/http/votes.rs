//! Vote submission handler.
//!
//! ```text
//! POST /api/v1/votes {"targetKind":"post","targetId":"...","voteType":"UPVOTE"}
//! ```

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::SubmitVoteRequest;
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_uuid, require};

/// Vote body.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoteBody {
    /// `post` or `comment`.
    #[schema(example = "post")]
    pub target_kind: Option<String>,
    /// UUID of the post or comment being voted on.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub target_id: Option<String>,
    /// `UPVOTE` or `DOWNVOTE`; case-sensitive.
    #[schema(example = "UPVOTE")]
    pub vote_type: Option<String>,
}

/// Score of the target after the vote.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoteResponse {
    /// Upvotes minus downvotes, recomputed from every stored vote.
    #[schema(example = 1)]
    pub vote_score: i64,
}

/// Cast or change the caller's vote on a post or comment.
///
/// Repeating the same vote is a no-op; switching direction replaces the
/// previous vote. The response always carries the recomputed score.
#[utoipa::path(
    post,
    path = "/api/v1/votes",
    request_body = VoteBody,
    responses(
        (status = 200, description = "Vote recorded", body = VoteResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Target not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["votes"],
    operation_id = "submitVote"
)]
#[post("/votes")]
pub async fn submit_vote(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<VoteBody>,
) -> ApiResult<web::Json<VoteResponse>> {
    let body = payload.into_inner();
    let target_kind = require(body.target_kind, "targetKind")?;
    let target_id = require(body.target_id, "targetId")?;
    let vote_type = require(body.vote_type, "voteType")?;
    let response = state
        .votes
        .submit_vote(SubmitVoteRequest {
            voter: user.user_id(),
            target_kind,
            target_id: parse_uuid(&target_id, "targetId")?,
            vote_type,
        })
        .await?;
    Ok(web::Json(VoteResponse {
        vote_score: response.vote_score.value(),
    }))
}
