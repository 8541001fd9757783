//! Bearer token extractor for authenticated endpoints.
//!
//! Handlers that mutate state take an [`AuthenticatedUser`] argument. The
//! extractor reads `Authorization: Bearer <token>` and resolves it through
//! [`crate::domain::ports::AuthService::authenticate`]; any failure short
//! circuits the request with `401 unauthorized`.

use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, web};
use futures_util::future::{Ready, ready};

use crate::domain::{Error, Identity, UserId};
use crate::inbound::http::state::HttpState;

const BEARER_PREFIX: &str = "Bearer ";

/// Identity of the caller, proven by a valid bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(pub Identity);

impl AuthenticatedUser {
    /// The caller's user id.
    pub fn user_id(&self) -> UserId {
        self.0.user_id
    }
}

fn bearer_token(req: &HttpRequest) -> Result<&str, Error> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| Error::unauthorized("missing bearer token"))?;
    let value = header
        .to_str()
        .map_err(|_| Error::unauthorized("authorization header is not valid text"))?;
    value
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| Error::unauthorized("authorization header must use the Bearer scheme"))
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, Error> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("http state missing"))?;
    let token = bearer_token(req)?;
    state.auth.authenticate(token).map(AuthenticatedUser)
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test};
    use rstest::rstest;

    use crate::domain::UserRole;
    use crate::inbound::http::test_utils::{TestPorts, state_with};

    async fn whoami(user: AuthenticatedUser) -> HttpResponse {
        HttpResponse::Ok().body(user.user_id().to_string())
    }

    fn ports_accepting(token: &'static str, identity: Identity) -> TestPorts {
        let mut ports = TestPorts::default();
        ports
            .auth
            .expect_authenticate()
            .returning(move |presented| {
                if presented == token {
                    Ok(identity)
                } else {
                    Err(Error::unauthorized("invalid bearer token"))
                }
            });
        ports
    }

    #[rstest]
    #[case(None)]
    #[case(Some("Basic dXNlcjpwYXNz"))]
    #[case(Some("Bearer "))]
    #[case(Some("Bearer wrong"))]
    #[actix_web::test]
    async fn rejects_missing_or_bad_credentials(#[case] header: Option<&str>) {
        let identity = Identity {
            user_id: UserId::random(),
            role: UserRole::Student,
        };
        let app = test::init_service(
            App::new()
                .app_data(state_with(ports_accepting("good", identity)))
                .route("/", actix_web::web::get().to(whoami)),
        )
        .await;

        let mut request = test::TestRequest::get().uri("/");
        if let Some(value) = header {
            request = request.insert_header((AUTHORIZATION, value));
        }
        let res = test::call_service(&app, request.to_request()).await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[actix_web::test]
    async fn accepts_valid_bearer_token() {
        let identity = Identity {
            user_id: UserId::random(),
            role: UserRole::Student,
        };
        let app = test::init_service(
            App::new()
                .app_data(state_with(ports_accepting("good", identity)))
                .route("/", actix_web::web::get().to(whoami)),
        )
        .await;

        let request = test::TestRequest::get()
            .uri("/")
            .insert_header((AUTHORIZATION, "Bearer good"))
            .to_request();
        let body = test::call_and_read_body(&app, request).await;

        assert_eq!(
            std::str::from_utf8(&body).expect("utf8 body"),
            identity.user_id.to_string()
        );
    }
}
