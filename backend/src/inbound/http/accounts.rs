//! Account HTTP handlers.
//!
//! ```text
//! POST /api/v1/auth/register {"name":"Ada","email":"ada@example.org","password":"..."}
//! POST /api/v1/auth/login {"email":"ada@example.org","password":"..."}
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::Account;
use crate::domain::ports::{LoginRequest, RegisterRequest};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::require;

/// Registration body.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterBody {
    #[schema(example = "Ada Lovelace")]
    pub name: Option<String>,
    #[schema(example = "ada@example.org")]
    pub email: Option<String>,
    #[schema(example = "correct horse battery", format = Password)]
    pub password: Option<String>,
}

/// Login body.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginBody {
    #[schema(example = "ada@example.org")]
    pub email: Option<String>,
    #[schema(format = Password)]
    pub password: Option<String>,
}

/// Public view of an account.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    #[schema(example = "student")]
    pub role: String,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id.to_string(),
            name: account.name.into(),
            email: account.email.to_string(),
            role: account.role.as_str().to_owned(),
        }
    }
}

/// Issued bearer token.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub token: String,
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Lifetime in seconds.
    pub expires_in: u64,
}

/// Register a student account.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterBody,
    responses(
        (status = 201, description = "Account created", body = AccountResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Email already registered", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterBody>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let request = RegisterRequest {
        name: require(body.name, "name")?,
        email: require(body.email, "email")?,
        password: require(body.password, "password")?,
    };
    let account = state.auth.register(request).await?;
    Ok(HttpResponse::Created().json(AccountResponse::from(account)))
}

/// Exchange credentials for a bearer token.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginBody,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginBody>,
) -> ApiResult<web::Json<TokenResponse>> {
    let body = payload.into_inner();
    let request = LoginRequest {
        email: require(body.email, "email")?,
        password: require(body.password, "password")?,
    };
    let token = state.auth.login(request).await?;
    Ok(web::Json(TokenResponse {
        token: token.token,
        token_type: "Bearer".to_owned(),
        expires_in: token.expires_in,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use chrono::Utc;
    use rstest::rstest;
    use serde_json::{Value, json};

    use crate::domain::{
        AccessToken, Email, Error, PasswordHash, UserId, UserName, UserRole,
    };
    use crate::inbound::http::test_utils::{TestPorts, state_with};

    fn account() -> Account {
        Account {
            id: UserId::random(),
            name: UserName::new("Ada").expect("valid name"),
            email: Email::new("ada@example.org").expect("valid email"),
            password_hash: PasswordHash::new("$argon2id$stored"),
            role: UserRole::Student,
            created_at: Utc::now(),
        }
    }

    #[rstest]
    #[actix_web::test]
    async fn register_returns_created_account_without_hash() {
        let mut ports = TestPorts::default();
        ports
            .auth
            .expect_register()
            .withf(|request| request.email == "ada@example.org")
            .times(1)
            .return_once(|_| Ok(account()));
        let app = test::init_service(App::new().app_data(state_with(ports)).service(register)).await;

        let request = test::TestRequest::post()
            .uri("/auth/register")
            .set_json(json!({
                "name": "Ada",
                "email": "ada@example.org",
                "password": "correct horse"
            }))
            .to_request();
        let res = test::call_service(&app, request).await;

        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["email"], "ada@example.org");
        assert_eq!(body["role"], "student");
        assert!(body.get("passwordHash").is_none());
    }

    #[rstest]
    #[actix_web::test]
    async fn register_without_password_is_bad_request() {
        let mut ports = TestPorts::default();
        ports.auth.expect_register().never();
        let app = test::init_service(App::new().app_data(state_with(ports)).service(register)).await;

        let request = test::TestRequest::post()
            .uri("/auth/register")
            .set_json(json!({"name": "Ada", "email": "ada@example.org"}))
            .to_request();
        let res = test::call_service(&app, request).await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["details"]["field"], "password");
    }

    #[rstest]
    #[actix_web::test]
    async fn duplicate_registration_is_conflict() {
        let mut ports = TestPorts::default();
        ports
            .auth
            .expect_register()
            .return_once(|_| Err(Error::conflict("an account already exists")));
        let app = test::init_service(App::new().app_data(state_with(ports)).service(register)).await;

        let request = test::TestRequest::post()
            .uri("/auth/register")
            .set_json(json!({
                "name": "Ada",
                "email": "ada@example.org",
                "password": "correct horse"
            }))
            .to_request();
        let res = test::call_service(&app, request).await;

        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[rstest]
    #[actix_web::test]
    async fn login_returns_bearer_token() {
        let mut ports = TestPorts::default();
        ports.auth.expect_login().times(1).return_once(|_| {
            Ok(AccessToken {
                token: "signed.jwt.value".to_owned(),
                expires_in: 86_400,
            })
        });
        let app = test::init_service(App::new().app_data(state_with(ports)).service(login)).await;

        let request = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({"email": "ada@example.org", "password": "correct horse"}))
            .to_request();
        let body: TokenResponse = test::call_and_read_body_json(&app, request).await;

        assert_eq!(body.token, "signed.jwt.value");
        assert_eq!(body.token_type, "Bearer");
        assert_eq!(body.expires_in, 86_400);
    }

    #[rstest]
    #[actix_web::test]
    async fn bad_credentials_are_unauthorised() {
        let mut ports = TestPorts::default();
        ports
            .auth
            .expect_login()
            .return_once(|_| Err(Error::unauthorized("invalid email or password")));
        let app = test::init_service(App::new().app_data(state_with(ports)).service(login)).await;

        let request = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({"email": "ada@example.org", "password": "nope"}))
            .to_request();
        let res = test::call_service(&app, request).await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
