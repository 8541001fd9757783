//! Shared Diesel error classification for the repositories.
//!
//! Each repository owns its port error type, so this module reduces raw
//! Diesel and pool failures to a small [`DbFailure`] that the repository then
//! maps onto its own variants.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::{debug, warn};

use super::pool::PoolError;

/// Storage failure reduced to what repositories care about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DbFailure {
    /// The connection dropped or could not be obtained.
    Connection(String),
    /// Any other query failure.
    Query(String),
    /// A unique index rejected the write.
    UniqueViolation { constraint: Option<String> },
    /// A foreign key rejected the write.
    ForeignKeyViolation { constraint: Option<String> },
}

impl DbFailure {
    /// Whether this is a foreign key violation on `constraint`.
    pub(crate) fn violates_foreign_key(&self, constraint: &str) -> bool {
        matches!(self, Self::ForeignKeyViolation { constraint: Some(name) } if name == constraint)
    }

    /// Whether this is a unique violation on `constraint`.
    pub(crate) fn violates_unique(&self, constraint: &str) -> bool {
        matches!(self, Self::UniqueViolation { constraint: Some(name) } if name == constraint)
    }

    /// Collapse into `(is_connection, message)` for the generic variants.
    pub(crate) fn into_parts(self) -> (bool, String) {
        match self {
            Self::Connection(message) => (true, message),
            Self::Query(message) => (false, message),
            Self::UniqueViolation { constraint } => (
                false,
                format!(
                    "unique constraint {} violated",
                    constraint.as_deref().unwrap_or("<unknown>")
                ),
            ),
            Self::ForeignKeyViolation { constraint } => {
                warn!(
                    constraint = ?constraint,
                    "unmapped foreign key violation"
                );
                (
                    false,
                    format!(
                        "foreign key {} violated",
                        constraint.as_deref().unwrap_or("<unknown>")
                    ),
                )
            }
        }
    }
}

impl From<PoolError> for DbFailure {
    fn from(error: PoolError) -> Self {
        Self::Connection(error.into_message())
    }
}

impl From<DieselError> for DbFailure {
    fn from(error: DieselError) -> Self {
        match &error {
            DieselError::DatabaseError(kind, info) => {
                debug!(
                    ?kind,
                    message = info.message(),
                    constraint = info.constraint_name(),
                    "diesel operation failed"
                );
            }
            _ => debug!(%error, "diesel operation failed"),
        }

        match error {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                Self::UniqueViolation {
                    constraint: info.constraint_name().map(str::to_owned),
                }
            }
            DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
                Self::ForeignKeyViolation {
                    constraint: info.constraint_name().map(str::to_owned),
                }
            }
            DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
                Self::Connection("database connection closed".to_owned())
            }
            DieselError::NotFound => Self::Query("record not found".to_owned()),
            DieselError::QueryBuilderError(_) => Self::Query("database query error".to_owned()),
            _ => Self::Query("database error".to_owned()),
        }
    }
}

/// Collect row conversions, mapping the first failure through `map_err`.
pub(crate) fn collect_rows<T, E>(
    results: impl Iterator<Item = Result<T, String>>,
    map_err: impl FnOnce(String) -> E,
) -> Result<Vec<T>, E> {
    results.collect::<Result<Vec<_>, _>>().map_err(map_err)
}

/// Convert a non-negative `COUNT(*)` into `u64`.
pub(crate) fn count_to_u64(count: i64) -> u64 {
    u64::try_from(count).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn pool_errors_are_connection_failures() {
        let failure = DbFailure::from(PoolError::checkout("timed out"));
        assert_eq!(failure, DbFailure::Connection("timed out".to_owned()));
    }

    #[rstest]
    fn not_found_is_a_query_failure() {
        let failure = DbFailure::from(DieselError::NotFound);
        assert_eq!(failure.into_parts(), (false, "record not found".to_owned()));
    }

    #[rstest]
    fn constraint_matching_is_exact() {
        let failure = DbFailure::ForeignKeyViolation {
            constraint: Some("posts_community_id_fkey".to_owned()),
        };

        assert!(failure.violates_foreign_key("posts_community_id_fkey"));
        assert!(!failure.violates_foreign_key("comments_post_id_fkey"));
        assert!(!failure.violates_unique("posts_community_id_fkey"));
    }

    #[rstest]
    fn collect_rows_reports_first_failure() {
        let rows = vec![Ok(1), Err("bad row".to_owned()), Err("later".to_owned())];
        let result: Result<Vec<i32>, String> = collect_rows(rows.into_iter(), |m| m);
        assert_eq!(result, Err("bad row".to_owned()));
    }

    #[rstest]
    #[case(0, 0)]
    #[case(7, 7)]
    #[case(-1, 0)]
    fn counts_clamp_to_unsigned(#[case] raw: i64, #[case] expected: u64) {
        assert_eq!(count_to_u64(raw), expected);
    }
}
