//! Request field validation shared by the HTTP handlers.
//!
//! Failures become `invalid_argument` errors whose details name the
//! offending camelCase field and a stable code.

use serde_json::json;
use uuid::Uuid;

use crate::domain::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValidationCode {
    MissingField,
    InvalidUuid,
}

impl ValidationCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::InvalidUuid => "invalid_uuid",
        }
    }
}

fn field_error(field: &str, code: ValidationCode, message: String) -> Error {
    Error::invalid_argument(message).with_details(json!({
        "field": field,
        "code": code.as_str(),
    }))
}

/// Error for a required field absent from the body.
pub(crate) fn missing_field_error(field: &'static str) -> Error {
    field_error(
        field,
        ValidationCode::MissingField,
        format!("missing required field: {field}"),
    )
}

/// Unwrap a required body field.
pub(crate) fn require<T>(value: Option<T>, field: &'static str) -> Result<T, Error> {
    value.ok_or_else(|| missing_field_error(field))
}

/// Parse a UUID, naming `field` on failure.
pub(crate) fn parse_uuid(value: &str, field: &'static str) -> Result<Uuid, Error> {
    Uuid::parse_str(value.trim()).map_err(|_| {
        field_error(
            field,
            ValidationCode::InvalidUuid,
            format!("{field} must be a valid UUID"),
        )
    })
}
