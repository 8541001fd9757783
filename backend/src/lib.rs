//! CampusSphere backend library.
//!
//! Layout follows ports and adapters: [`domain`] holds the model and
//! services, [`inbound`] exposes them over HTTP, and [`outbound`] implements
//! storage and security ports.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(feature = "test-support")]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
