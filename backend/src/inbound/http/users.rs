//! Account API handlers.
//!
//! ```text
//! POST /api/signup {"username":"ada","password":"correct horse","email":"ada@example.com"}
//! POST /api/login {"username":"ada","password":"correct horse"}
//! ```
//!
//! Both respond with the raw access token as `text/plain`.

use actix_web::{HttpResponse, http::header::ContentType, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{
    AccessToken, CredentialsValidationError, Error, LoginCredentials, SignupDetails,
    UserValidationError,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

/// Signup request body for `POST /api/signup`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[schema(example = "ada")]
    pub username: String,
    #[schema(example = "correct horse")]
    pub password: String,
    #[schema(example = "ada@example.com")]
    pub email: String,
}

/// Login request body for `POST /api/login`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl TryFrom<&SignupRequest> for SignupDetails {
    type Error = CredentialsValidationError;

    fn try_from(value: &SignupRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.username, &value.password, &value.email)
    }
}

impl TryFrom<&LoginRequest> for LoginCredentials {
    type Error = CredentialsValidationError;

    fn try_from(value: &LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.username, &value.password)
    }
}

fn credentials_field(err: &CredentialsValidationError) -> &'static str {
    match err {
        CredentialsValidationError::EmptyUsername => "username",
        CredentialsValidationError::EmptyPassword
        | CredentialsValidationError::PasswordTooShort { .. } => "password",
        CredentialsValidationError::User(user) => match user {
            UserValidationError::EmptyEmail | UserValidationError::InvalidEmail => "email",
            UserValidationError::EmptyId | UserValidationError::InvalidId => "id",
            UserValidationError::EmptyUsername
            | UserValidationError::UsernameLength { .. }
            | UserValidationError::UsernameInvalidCharacters => "username",
        },
    }
}

fn map_credentials_error(err: &CredentialsValidationError) -> Error {
    Error::invalid_request(err.to_string()).with_details(json!({
        "field": credentials_field(err),
        "code": "invalid_credentials_payload",
    }))
}

fn token_response(token: &AccessToken) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::plaintext())
        .body(token.as_str().to_owned())
}

/// Register a new account and return an access token.
#[utoipa::path(
    post,
    path = "/api/signup",
    request_body = SignupRequest,
    responses(
        (status = 200, description = "Access token", body = String, content_type = "text/plain"),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Username already taken", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "signup",
    security([])
)]
#[post("/signup")]
pub async fn signup(
    state: web::Data<HttpState>,
    payload: web::Json<SignupRequest>,
) -> ApiResult<HttpResponse> {
    let details = SignupDetails::try_from(&payload.into_inner())
        .map_err(|err| map_credentials_error(&err))?;
    let token = state.identity.signup(&details).await?;
    Ok(token_response(&token))
}

/// Exchange credentials for an access token.
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Access token", body = String, content_type = "text/plain"),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials = LoginCredentials::try_from(&payload.into_inner())
        .map_err(|err| map_credentials_error(&err))?;
    let token = state.identity.login(&credentials).await?;
    Ok(token_response(&token))
}
