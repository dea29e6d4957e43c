//! Tests for the identity service.

use std::sync::Arc;

use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{MockAccessTokens, MockUserRepository};
use crate::domain::{EmailAddress, ErrorCode, Username};

fn stored_user(password: &str) -> User {
    User::new(
        UserId::random(),
        Username::new("example").expect("username"),
        EmailAddress::new("example@example.com").expect("email"),
        PasswordHash::hash(password).expect("hash"),
    )
}

#[fixture]
fn signup_details() -> SignupDetails {
    SignupDetails::try_from_parts("example", "password!", "example@example.com")
        .expect("valid signup")
}

fn issuing_tokens() -> MockAccessTokens {
    let mut tokens = MockAccessTokens::new();
    tokens
        .expect_issue()
        .returning(|user| Ok(AccessToken::new(format!("token-for-{user}"))));
    tokens
}

#[rstest]
#[tokio::test]
async fn signup_persists_hashed_user_and_issues_token(signup_details: SignupDetails) {
    let mut users = MockUserRepository::new();
    users.expect_find_by_username().return_once(|_| Ok(None));
    users
        .expect_insert()
        .withf(|user| {
            user.username().as_ref() == "example"
                && user.password_hash().as_str() != "password!"
                && user.password_hash().verify("password!")
        })
        .times(1)
        .return_once(|_| Ok(()));

    let service = IdentityService::new(Arc::new(users), Arc::new(issuing_tokens()));
    let token = service.signup(&signup_details).await.expect("signup succeeds");

    assert!(token.as_str().starts_with("token-for-"));
}

#[rstest]
#[tokio::test]
async fn signup_rejects_taken_username(signup_details: SignupDetails) {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_username()
        .return_once(|_| Ok(Some(stored_user("whatever1"))));
    users.expect_insert().times(0);

    let service = IdentityService::new(Arc::new(users), Arc::new(MockAccessTokens::new()));
    let err = service.signup(&signup_details).await.expect_err("duplicate");

    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn signup_maps_insert_race_to_conflict(signup_details: SignupDetails) {
    let mut users = MockUserRepository::new();
    users.expect_find_by_username().return_once(|_| Ok(None));
    users
        .expect_insert()
        .return_once(|_| Err(UserPersistenceError::duplicate("example")));

    let service = IdentityService::new(Arc::new(users), Arc::new(MockAccessTokens::new()));
    let err = service.signup(&signup_details).await.expect_err("duplicate");

    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[case(UserPersistenceError::connection("refused"), ErrorCode::ServiceUnavailable)]
#[case(UserPersistenceError::query("syntax"), ErrorCode::InternalError)]
#[tokio::test]
async fn signup_maps_repository_failures(
    signup_details: SignupDetails,
    #[case] failure: UserPersistenceError,
    #[case] expected: ErrorCode,
) {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_username()
        .return_once(move |_| Err(failure));

    let service = IdentityService::new(Arc::new(users), Arc::new(MockAccessTokens::new()));
    let err = service.signup(&signup_details).await.expect_err("failure");

    assert_eq!(err.code(), expected);
}

#[rstest]
#[case("password!", true)]
#[case("wrong-password", false)]
#[tokio::test]
async fn login_verifies_password(#[case] attempt: &str, #[case] should_succeed: bool) {
    let user = stored_user("password!");
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_username()
        .return_once(move |_| Ok(Some(user)));

    let service = IdentityService::new(Arc::new(users), Arc::new(issuing_tokens()));
    let credentials = LoginCredentials::try_from_parts("example", attempt).expect("credentials");
    let result = service.login(&credentials).await;

    match (should_succeed, result) {
        (true, Ok(token)) => assert!(token.as_str().starts_with("token-for-")),
        (false, Err(err)) => assert_eq!(err.code(), ErrorCode::Unauthorized),
        (true, Err(err)) => panic!("expected success, got error: {err:?}"),
        (false, Ok(_)) => panic!("expected failure, got a token"),
    }
}

#[rstest]
#[tokio::test]
async fn login_rejects_unknown_user_with_same_message() {
    let mut users = MockUserRepository::new();
    users.expect_find_by_username().return_once(|_| Ok(None));

    let service = IdentityService::new(Arc::new(users), Arc::new(MockAccessTokens::new()));
    let credentials = LoginCredentials::try_from_parts("nobody", "pw").expect("credentials");
    let err = service.login(&credentials).await.expect_err("unknown user");

    assert_eq!(err.code(), ErrorCode::Unauthorized);
    assert_eq!(err.message(), INVALID_CREDENTIALS);
}

#[rstest]
#[tokio::test]
async fn resolve_returns_existing_user() {
    let user = stored_user("password!");
    let id = user.id().clone();
    let token_subject = id.clone();

    let mut tokens = MockAccessTokens::new();
    tokens
        .expect_resolve()
        .return_once(move |_| Ok(token_subject));
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(user)));

    let service = IdentityService::new(Arc::new(users), Arc::new(tokens));
    let resolved = service.resolve("token").await.expect("resolves");

    assert_eq!(resolved, id);
}

#[rstest]
#[tokio::test]
async fn resolve_rejects_invalid_token() {
    let mut tokens = MockAccessTokens::new();
    tokens
        .expect_resolve()
        .return_once(|_| Err(AccessTokenError::invalid("bad signature")));
    let mut users = MockUserRepository::new();
    users.expect_find_by_id().times(0);

    let service = IdentityService::new(Arc::new(users), Arc::new(tokens));
    let err = service.resolve("token").await.expect_err("invalid token");

    assert_eq!(err.code(), ErrorCode::Unauthorized);
}

#[rstest]
#[tokio::test]
async fn resolve_rejects_token_for_deleted_user() {
    let mut tokens = MockAccessTokens::new();
    tokens
        .expect_resolve()
        .return_once(|_| Ok(UserId::random()));
    let mut users = MockUserRepository::new();
    users.expect_find_by_id().return_once(|_| Ok(None));

    let service = IdentityService::new(Arc::new(users), Arc::new(tokens));
    let err = service.resolve("token").await.expect_err("unknown subject");

    assert_eq!(err.code(), ErrorCode::Unauthorized);
}
