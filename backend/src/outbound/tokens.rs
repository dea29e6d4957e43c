//! HS256 JSON Web Token adapter for the [`AccessTokens`] port.
//!
//! Tokens carry `sub` (user id), `iat`, and `exp` claims. Expiry is checked
//! against the injected clock rather than the system time.

use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::domain::ports::{AccessTokenError, AccessTokens};
use crate::domain::{AccessToken, UserId};

/// Shortest signing secret accepted, in bytes.
pub const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// Signs and verifies access tokens with a shared secret.
pub struct JwtAccessTokens {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl JwtAccessTokens {
    /// Build an adapter over `secret`; tokens expire `ttl` after issue.
    pub fn new(secret: &Zeroizing<Vec<u8>>, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_slice()),
            decoding: DecodingKey::from_secret(secret.as_slice()),
            ttl,
            clock,
        }
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is compared with the injected clock in `resolve`.
        validation.validate_exp = false;
        validation.required_spec_claims = ["sub", "exp"]
            .into_iter()
            .map(str::to_owned)
            .collect();
        validation
    }
}

impl AccessTokens for JwtAccessTokens {
    fn issue(&self, user: &UserId) -> Result<AccessToken, AccessTokenError> {
        let issued_at = self.clock.utc();
        let claims = Claims {
            sub: user.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map(AccessToken::new)
            .map_err(|err| AccessTokenError::signing(err.to_string()))
    }

    fn resolve(&self, token: &str) -> Result<UserId, AccessTokenError> {
        let decoded = jsonwebtoken::decode::<Claims>(token, &self.decoding, &Self::validation())
            .map_err(|err| AccessTokenError::invalid(err.to_string()))?;
        if decoded.claims.exp <= self.clock.utc().timestamp() {
            return Err(AccessTokenError::invalid("token expired"));
        }
        UserId::new(&decoded.claims.sub).map_err(|err| AccessTokenError::invalid(err.to_string()))
    }
}
