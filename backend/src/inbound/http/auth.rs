//! Bearer-token authentication for HTTP handlers.
//!
//! Handlers take an [`AuthenticatedUser`] argument; extraction fails with 401
//! when the `Authorization` header is missing, is not a bearer credential, or
//! carries a token the identity port rejects.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;

use crate::domain::{Error, UserId};
use crate::inbound::http::state::HttpState;

const BEARER_PREFIX: &str = "Bearer ";

/// The caller identified by a valid bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(UserId);

impl AuthenticatedUser {
    /// Id of the authenticated caller.
    pub fn id(&self) -> &UserId {
        &self.0
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
pub(crate) fn bearer_token(req: &HttpRequest) -> Result<String, Error> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| Error::unauthorized("missing bearer token"))?;
    let value = header
        .to_str()
        .map_err(|_| Error::unauthorized("malformed authorization header"))?;
    let token = value
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| Error::unauthorized("authorization header must be a bearer token"))?;
    Ok(token.to_owned())
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = bearer_token(req);
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        Box::pin(async move {
            let token = token?;
            let state = state.ok_or_else(|| Error::internal("HTTP state is not configured"))?;
            state.identity.resolve(&token).await.map(AuthenticatedUser)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use actix_web::test::TestRequest;
    use rstest::rstest;

    #[rstest]
    fn bearer_token_is_extracted() {
        let req = TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer abc.def.ghi"))
            .to_http_request();
        assert_eq!(bearer_token(&req).expect("token"), "abc.def.ghi");
    }

    #[rstest]
    #[case(None)]
    #[case(Some("Basic dXNlcjpwYXNz"))]
    #[case(Some("Bearer "))]
    #[case(Some("bearer abc"))]
    fn non_bearer_headers_are_unauthorized(#[case] header: Option<&str>) {
        let mut req = TestRequest::default();
        if let Some(value) = header {
            req = req.insert_header((AUTHORIZATION, value));
        }
        let err = bearer_token(&req.to_http_request()).expect_err("rejected");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }
}
