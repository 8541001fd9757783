//! Length-bounded text values shared by communities, posts, and comments.

use serde_json::json;

use super::Error;

/// Validation failures for bounded text fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TextValidationError {
    /// Required field was empty or whitespace.
    #[error("{field} must not be empty")]
    Empty {
        /// Wire name of the offending field.
        field: &'static str,
    },
    /// Field exceeded its maximum length in characters.
    #[error("{field} must be at most {max} characters")]
    TooLong {
        /// Wire name of the offending field.
        field: &'static str,
        /// Maximum permitted length.
        max: usize,
    },
    /// Field fell short of its minimum length in characters.
    #[error("{field} must be at least {min} characters")]
    TooShort {
        /// Wire name of the offending field.
        field: &'static str,
        /// Minimum permitted length.
        min: usize,
    },
    /// Field did not match the expected format.
    #[error("{field} is not valid")]
    Malformed {
        /// Wire name of the offending field.
        field: &'static str,
    },
}

impl TextValidationError {
    /// Wire name of the field that failed validation.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::Empty { field }
            | Self::TooLong { field, .. }
            | Self::TooShort { field, .. }
            | Self::Malformed { field } => field,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Empty { .. } => "empty",
            Self::TooLong { .. } => "too_long",
            Self::TooShort { .. } => "too_short",
            Self::Malformed { .. } => "malformed",
        }
    }
}

impl From<TextValidationError> for Error {
    fn from(err: TextValidationError) -> Self {
        Error::invalid_argument(err.to_string()).with_details(json!({
            "field": err.field(),
            "code": err.code(),
        }))
    }
}

/// Check `value` against `[min, max]` characters.
///
/// Blank input is reported as [`TextValidationError::Empty`] whenever `min`
/// is non-zero.
pub(crate) fn check_length(
    field: &'static str,
    value: &str,
    min: usize,
    max: usize,
) -> Result<(), TextValidationError> {
    if min > 0 && value.trim().is_empty() {
        return Err(TextValidationError::Empty { field });
    }
    let length = value.chars().count();
    if length < min {
        return Err(TextValidationError::TooShort { field, min });
    }
    if length > max {
        return Err(TextValidationError::TooLong { field, max });
    }
    Ok(())
}

/// Declare a string newtype validated against a character-length range.
///
/// `trimmed` types store the input with surrounding whitespace removed;
/// `verbatim` types keep it as supplied but still reject blank input.
macro_rules! bounded_text {
    (@normalise trimmed, $value:ident) => {
        $value.trim().to_owned()
    };
    (@normalise verbatim, $value:ident) => {
        $value
    };
    (
        $(#[$meta:meta])*
        $name:ident, field = $field:literal, min = $min:expr, max = $max:expr, $mode:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Minimum length in characters.
            pub const MIN: usize = $min;
            /// Maximum length in characters.
            pub const MAX: usize = $max;

            /// Validate and construct the value.
            ///
            /// # Errors
            /// Returns [`TextValidationError`] when the input is out of range.
            pub fn new(
                value: impl Into<String>,
            ) -> Result<Self, $crate::domain::TextValidationError> {
                let value: String = value.into();
                let value: String = bounded_text!(@normalise $mode, value);
                $crate::domain::text::check_length($field, &value, Self::MIN, Self::MAX)?;
                Ok(Self(value))
            }

            /// Borrow the validated text.
            #[must_use]
            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

pub(crate) use bounded_text;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    bounded_text!(
        /// Fixture type.
        Label, field = "label", min = 2, max = 4, trimmed
    );
    bounded_text!(
        /// Fixture type.
        Body, field = "body", min = 1, max = 5, verbatim
    );

    #[rstest]
    fn trimmed_values_drop_surrounding_whitespace() {
        let label = Label::new("  ab  ").expect("valid");
        assert_eq!(label.as_str(), "ab");
    }

    #[rstest]
    fn verbatim_values_keep_whitespace() {
        let body = Body::new(" a b ").expect("valid");
        assert_eq!(body.as_str(), " a b ");
    }

    #[rstest]
    #[case("   ", TextValidationError::Empty { field: "label" })]
    #[case("a", TextValidationError::TooShort { field: "label", min: 2 })]
    #[case("abcde", TextValidationError::TooLong { field: "label", max: 4 })]
    fn rejects_out_of_range(#[case] raw: &str, #[case] expected: TextValidationError) {
        assert_eq!(Label::new(raw), Err(expected));
    }

    #[rstest]
    fn counts_characters_not_bytes() {
        assert!(Label::new("éééé").is_ok());
    }

    #[rstest]
    fn converts_to_invalid_argument_with_field_details() {
        let error: Error = TextValidationError::TooLong { field: "title", max: 300 }.into();
        assert_eq!(error.code(), ErrorCode::InvalidArgument);
        let details = error.details().expect("details attached");
        assert_eq!(details["field"], "title");
        assert_eq!(details["code"], "too_long");
    }
}
