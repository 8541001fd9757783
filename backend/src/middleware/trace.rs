//! Middleware assigning every request a trace identifier.
//!
//! A caller-supplied `trace-id` header is honoured when it holds a UUID;
//! otherwise a fresh one is generated. The id is placed in task-local scope
//! (see [`TraceId::scope`]) so domain errors pick it up, attached to a
//! `tracing` span, and echoed on the response.

use std::task::{Context, Poll};

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{HeaderName, HeaderValue};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::{Instrument as _, debug, error, info_span};

use crate::domain::{TRACE_ID_HEADER, TraceId};

/// Trace middleware factory.
///
/// ```
/// use actix_web::App;
/// use campussphere::Trace;
///
/// let _app = App::new().wrap(Trace);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct Trace;

impl<S, B> Transform<S, ServiceRequest> for Trace
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = TraceMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TraceMiddleware { service }))
    }
}

/// Service produced by [`Trace`].
pub struct TraceMiddleware<S> {
    service: S,
}

fn inbound_trace_id(req: &ServiceRequest) -> Option<TraceId> {
    req.headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(TraceId::from_header)
}

impl<S, B> Service<ServiceRequest> for TraceMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let trace_id = inbound_trace_id(&req).unwrap_or_else(TraceId::generate);
        let span = info_span!(
            "http_request",
            %trace_id,
            method = %req.method(),
            path = %req.path(),
        );
        let fut = self.service.call(req);

        Box::pin(TraceId::scope(
            trace_id,
            async move {
                let mut res = fut.await?;
                debug!(status = res.status().as_u16(), "request completed");
                match HeaderValue::from_str(&trace_id.to_string()) {
                    Ok(value) => {
                        res.response_mut()
                            .headers_mut()
                            .insert(HeaderName::from_static(TRACE_ID_HEADER), value);
                    }
                    Err(error) => {
                        error!(%error, "failed to encode trace identifier header");
                    }
                }
                Ok(res)
            }
            .instrument(span),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, HttpResponse, test, web};

    use crate::domain::Error as DomainError;

    async fn call_with(
        request: test::TestRequest,
    ) -> (ServiceResponse<actix_web::body::BoxBody>, String) {
        let app = test::init_service(
            App::new()
                .wrap(Trace)
                .route(
                    "/",
                    web::get().to(|| async {
                        let id = TraceId::current().map(|id| id.to_string()).unwrap_or_default();
                        HttpResponse::Ok().body(id)
                    }),
                )
                .route(
                    "/fail",
                    web::get().to(|| async {
                        Err::<HttpResponse, _>(DomainError::not_found("nothing here"))
                    }),
                ),
        )
        .await;
        let res = test::call_service(&app, request.to_request()).await;
        let header = res
            .headers()
            .get(TRACE_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_owned();
        (res.map_into_boxed_body(), header)
    }

    #[actix_web::test]
    async fn handler_sees_the_echoed_trace_id() {
        let (res, header) = call_with(test::TestRequest::get().uri("/")).await;
        assert!(!header.is_empty());

        let body = test::read_body(res).await;
        assert_eq!(std::str::from_utf8(&body).expect("utf8 body"), header);
    }

    #[actix_web::test]
    async fn caller_supplied_uuid_is_honoured() {
        let supplied = "6f1c1c9e-4f59-4a3c-9a1e-0c6f8d3a2b10";
        let (_, header) = call_with(
            test::TestRequest::get()
                .uri("/")
                .insert_header((TRACE_ID_HEADER, supplied)),
        )
        .await;

        assert_eq!(header, supplied);
    }

    #[actix_web::test]
    async fn malformed_inbound_id_is_replaced() {
        let (_, header) = call_with(
            test::TestRequest::get()
                .uri("/")
                .insert_header((TRACE_ID_HEADER, "not-a-uuid")),
        )
        .await;

        assert_ne!(header, "not-a-uuid");
        assert!(header.parse::<TraceId>().is_ok());
    }

    #[actix_web::test]
    async fn error_bodies_carry_the_trace_id() {
        let (res, header) = call_with(test::TestRequest::get().uri("/fail")).await;
        let body: DomainError = test::read_body_json(res).await;

        assert_eq!(body.trace_id(), Some(header.as_str()));
    }
}
