//! Port for issuing and verifying bearer access tokens.

use crate::domain::{AccessToken, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by access-token adapters.
    pub enum AccessTokenError {
        /// The token is malformed, tampered with, or expired.
        Invalid { message: String } => "access token rejected: {message}",
        /// A token could not be produced.
        Signing { message: String } => "access token signing failed: {message}",
    }
}

/// Issue and resolve access tokens.
///
/// Tokens are self-contained, so both operations are synchronous.
#[cfg_attr(test, mockall::automock)]
pub trait AccessTokens: Send + Sync {
    /// Issue a token whose subject is `user`.
    fn issue(&self, user: &UserId) -> Result<AccessToken, AccessTokenError>;

    /// Verify `token` and return its subject.
    fn resolve(&self, token: &str) -> Result<UserId, AccessTokenError>;
}
