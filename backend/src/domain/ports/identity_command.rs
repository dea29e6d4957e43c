//! Driving port for signup, login, and bearer-token resolution.
//!
//! Inbound adapters call this port without knowing how users are stored or
//! how tokens are encoded, so handler tests can swap in in-memory adapters.

use async_trait::async_trait;

use crate::domain::{AccessToken, Error, LoginCredentials, SignupDetails, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityCommand: Send + Sync {
    /// Register a user and issue their first token.
    async fn signup(&self, details: &SignupDetails) -> Result<AccessToken, Error>;

    /// Check credentials and issue a token.
    async fn login(&self, credentials: &LoginCredentials) -> Result<AccessToken, Error>;

    /// Resolve a bearer token to the id of an existing user.
    async fn resolve(&self, token: &str) -> Result<UserId, Error>;
}
