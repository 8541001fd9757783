//! OpenAPI schema definitions for domain types.
//!
//! Domain types do not derive `ToSchema`; these mirrors register their shape
//! with utoipa from the adapter layer instead.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_argument")]
    InvalidArgument,
    /// Authentication is missing or failed.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// The referenced resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The request conflicts with existing state.
    #[schema(rename = "conflict")]
    Conflict,
    /// An unexpected server-side failure.
    #[schema(rename = "internal")]
    Internal,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "invalid_argument")]
    code: ErrorCodeSchema,
    /// Human-readable message.
    #[schema(example = "voteType must be UPVOTE or DOWNVOTE")]
    message: String,
    /// Request correlation identifier.
    #[schema(example = "6f1c1c9e-4f59-4a3c-9a1e-0c6f8d3a2b10")]
    trace_id: Option<String>,
    /// Structured context such as the offending field.
    details: Option<serde_json::Value>,
}
