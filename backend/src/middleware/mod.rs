//! Cross-cutting Actix middleware.
//!
//! [`Trace`] stamps each request with a [`crate::TraceId`] and echoes it on
//! the response.

mod trace;

pub use trace::Trace;
