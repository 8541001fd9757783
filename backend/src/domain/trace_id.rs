//! Request-scoped correlation identifier.
//!
//! The [`crate::Trace`] middleware opens a scope per request; domain errors
//! created inside that scope pick the identifier up automatically. Task-local
//! values do not follow `tokio::spawn` or `spawn_blocking`, so wrap such work
//! in [`TraceId::scope`].

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use tokio::task_local;
use uuid::Uuid;

task_local! {
    static CURRENT: TraceId;
}

/// Correlation id echoed in the `trace-id` header and in error bodies.
///
/// ```
/// use campussphere::TraceId;
///
/// async fn handler() {
///     if let Some(id) = TraceId::current() {
///         tracing::info!(trace_id = %id, "handling request");
///     }
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(Uuid);

impl TraceId {
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Accept a caller-supplied header value.
    ///
    /// Only canonical UUIDs are honoured; the nil UUID is rejected so a
    /// client cannot collapse every request onto one id.
    #[must_use]
    pub fn from_header(value: &str) -> Option<Self> {
        value
            .trim()
            .parse::<Self>()
            .ok()
            .filter(|id| !id.0.is_nil())
    }

    /// The identifier in scope for the running task, if any.
    #[must_use]
    pub fn current() -> Option<Self> {
        CURRENT.try_with(|id| *id).ok()
    }

    /// Run `fut` with `trace_id` in scope.
    ///
    /// ```
    /// use campussphere::TraceId;
    ///
    /// # tokio::runtime::Runtime::new().expect("runtime").block_on(async {
    /// let id = TraceId::from_header("6f1c1c9e-4f59-4a3c-9a1e-0c6f8d3a2b10").expect("uuid");
    /// assert_eq!(TraceId::scope(id, async { TraceId::current() }).await, Some(id));
    /// # });
    /// ```
    pub async fn scope<Fut>(trace_id: Self, fut: Fut) -> Fut::Output
    where
        Fut: Future,
    {
        CURRENT.scope(trace_id, fut).await
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}

impl FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[tokio::test]
    async fn scope_exposes_identifier() {
        let expected = TraceId::generate();
        let observed = TraceId::scope(expected, async move { TraceId::current() }).await;
        assert_eq!(observed, Some(expected));
    }

    #[tokio::test]
    async fn identifier_is_absent_outside_scope() {
        assert!(TraceId::current().is_none());
    }

    #[rstest]
    #[case("6f1c1c9e-4f59-4a3c-9a1e-0c6f8d3a2b10", true)]
    #[case(" 6f1c1c9e-4f59-4a3c-9a1e-0c6f8d3a2b10 ", true)]
    #[case("00000000-0000-0000-0000-000000000000", false)]
    #[case("not-a-uuid", false)]
    #[case("", false)]
    fn header_values_are_filtered(#[case] raw: &str, #[case] accepted: bool) {
        assert_eq!(TraceId::from_header(raw).is_some(), accepted);
    }

    #[test]
    fn displays_hyphenated() {
        let id = TraceId::generate();
        assert_eq!(id.to_string().len(), 36);
        assert_eq!(id.to_string().parse::<TraceId>().ok(), Some(id));
    }
}
