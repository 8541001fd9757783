//! Tests for the account service.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use mockable::MockClock;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{MockAccountRepository, MockPasswordHasher, MockTokenService};
use crate::domain::{ErrorCode, PasswordHash};

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 4, 2, 12, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

#[fixture]
fn clock() -> Arc<dyn Clock> {
    let mut clock = MockClock::new();
    clock.expect_utc().returning(fixed_now);
    Arc::new(clock)
}

fn stored_account() -> Account {
    Account {
        id: UserId::random(),
        name: UserName::new("Ada").expect("valid name"),
        email: Email::new("ada@example.org").expect("valid email"),
        password_hash: PasswordHash::new("$argon2id$stored"),
        role: UserRole::Student,
        created_at: fixed_now(),
    }
}

fn register_request(email: &str, password: &str) -> RegisterRequest {
    RegisterRequest {
        name: "Ada".to_owned(),
        email: email.to_owned(),
        password: password.to_owned(),
    }
}

fn service(
    repo: MockAccountRepository,
    hasher: MockPasswordHasher,
    tokens: MockTokenService,
    clock: Arc<dyn Clock>,
) -> AccountService<MockAccountRepository> {
    AccountService::new(Arc::new(repo), Arc::new(hasher), Arc::new(tokens), clock)
}

#[rstest]
#[tokio::test]
async fn register_stores_hashed_student_account(clock: Arc<dyn Clock>) {
    let mut repo = MockAccountRepository::new();
    repo.expect_find_by_email()
        .withf(|email| email.as_ref() == "ada@example.org")
        .times(1)
        .return_once(|_| Ok(None));
    repo.expect_insert()
        .withf(|account| {
            account.role == UserRole::Student
                && account.password_hash == PasswordHash::new("$argon2id$fresh")
        })
        .times(1)
        .return_once(|_| Ok(()));
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_hash()
        .withf(|password| password.expose() == "correct horse")
        .times(1)
        .return_once(|_| Ok(PasswordHash::new("$argon2id$fresh")));

    let account = service(repo, hasher, MockTokenService::new(), clock)
        .register(register_request(" Ada@Example.org ", "correct horse"))
        .await
        .expect("registration succeeds");

    assert_eq!(account.email.as_ref(), "ada@example.org");
    assert_eq!(account.created_at, fixed_now());
}

#[rstest]
#[tokio::test]
async fn register_existing_email_is_conflict(clock: Arc<dyn Clock>) {
    let mut repo = MockAccountRepository::new();
    repo.expect_find_by_email()
        .times(1)
        .return_once(|_| Ok(Some(stored_account())));
    repo.expect_insert().never();
    let mut hasher = MockPasswordHasher::new();
    hasher.expect_hash().never();

    let error = service(repo, hasher, MockTokenService::new(), clock)
        .register(register_request("ada@example.org", "correct horse"))
        .await
        .expect_err("duplicate must fail");

    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn register_race_on_unique_index_is_conflict(clock: Arc<dyn Clock>) {
    let mut repo = MockAccountRepository::new();
    repo.expect_find_by_email().times(1).return_once(|_| Ok(None));
    repo.expect_insert()
        .times(1)
        .return_once(|_| Err(AccountRepositoryError::duplicate_email("ada@example.org")));
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_hash()
        .return_once(|_| Ok(PasswordHash::new("$argon2id$fresh")));

    let error = service(repo, hasher, MockTokenService::new(), clock)
        .register(register_request("ada@example.org", "correct horse"))
        .await
        .expect_err("duplicate must fail");

    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[rstest]
#[case("not-an-email", "correct horse")]
#[case("ada@example.org", "short")]
#[tokio::test]
async fn register_rejects_invalid_input(
    clock: Arc<dyn Clock>,
    #[case] email: &str,
    #[case] password: &str,
) {
    let mut repo = MockAccountRepository::new();
    repo.expect_find_by_email().never();

    let error = service(repo, MockPasswordHasher::new(), MockTokenService::new(), clock)
        .register(register_request(email, password))
        .await
        .expect_err("invalid input must fail");

    assert_eq!(error.code(), ErrorCode::InvalidArgument);
}

#[rstest]
#[tokio::test]
async fn login_issues_token_for_valid_credentials(clock: Arc<dyn Clock>) {
    let account = stored_account();
    let identity = account.identity();
    let mut repo = MockAccountRepository::new();
    repo.expect_find_by_email()
        .times(1)
        .return_once(move |_| Ok(Some(account)));
    let mut hasher = MockPasswordHasher::new();
    hasher.expect_verify().times(1).return_once(|_, _| Ok(true));
    let mut tokens = MockTokenService::new();
    tokens
        .expect_issue()
        .withf(move |claimed| *claimed == identity)
        .times(1)
        .return_once(|_| {
            Ok(AccessToken {
                token: "signed".to_owned(),
                expires_in: 3600,
            })
        });

    let token = service(repo, hasher, tokens, clock)
        .login(LoginRequest {
            email: "ADA@example.org".to_owned(),
            password: "correct horse".to_owned(),
        })
        .await
        .expect("login succeeds");

    assert_eq!(token.token, "signed");
}

#[rstest]
#[case(None, false)]
#[case(Some(false), true)]
#[tokio::test]
async fn login_failures_share_one_message(
    clock: Arc<dyn Clock>,
    #[case] password_matches: Option<bool>,
    #[case] account_exists: bool,
) {
    let mut repo = MockAccountRepository::new();
    repo.expect_find_by_email()
        .times(1)
        .return_once(move |_| Ok(account_exists.then(stored_account)));
    let mut hasher = MockPasswordHasher::new();
    if let Some(matches) = password_matches {
        hasher
            .expect_verify()
            .times(1)
            .return_once(move |_, _| Ok(matches));
    }
    let mut tokens = MockTokenService::new();
    tokens.expect_issue().never();

    let error = service(repo, hasher, tokens, clock)
        .login(LoginRequest {
            email: "ada@example.org".to_owned(),
            password: "wrong password".to_owned(),
        })
        .await
        .expect_err("bad credentials must fail");

    assert_eq!(error.code(), ErrorCode::Unauthorized);
    assert_eq!(error.message(), BAD_CREDENTIALS);
}

#[rstest]
#[case(TokenServiceError::Expired)]
#[case(TokenServiceError::invalid("bad signature"))]
fn authenticate_maps_token_failures_to_unauthorized(
    clock: Arc<dyn Clock>,
    #[case] failure: TokenServiceError,
) {
    let mut tokens = MockTokenService::new();
    tokens
        .expect_verify()
        .times(1)
        .return_once(move |_| Err(failure));

    let error = service(
        MockAccountRepository::new(),
        MockPasswordHasher::new(),
        tokens,
        clock,
    )
    .authenticate("token")
    .expect_err("bad token must fail");

    assert_eq!(error.code(), ErrorCode::Unauthorized);
}
