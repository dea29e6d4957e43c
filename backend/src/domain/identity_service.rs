//! Identity service: signup, login, and bearer-token resolution.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::domain::ports::{
    AccessTokenError, AccessTokens, IdentityCommand, UserPersistenceError, UserRepository,
};
use crate::domain::{
    AccessToken, Error, LoginCredentials, PasswordHash, SignupDetails, User, UserId,
};

const INVALID_CREDENTIALS: &str = "invalid username or password";
const INVALID_TOKEN: &str = "missing, invalid, or expired access token";

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::Duplicate { username } => {
            Error::conflict(format!("username {username} is already taken"))
        }
    }
}

fn map_issue_error(error: &AccessTokenError) -> Error {
    Error::internal(format!("failed to issue access token: {error}"))
}

/// Hash on the blocking pool; Argon2 would otherwise stall the async workers.
async fn hash_password(password: &str) -> Result<PasswordHash, Error> {
    let password = Zeroizing::new(password.to_owned());
    tokio::task::spawn_blocking(move || PasswordHash::hash(&password))
        .await
        .map_err(|err| Error::internal(format!("password hashing task failed: {err}")))?
        .map_err(|err| Error::internal(err.to_string()))
}

async fn verify_password(hash: PasswordHash, password: &str) -> Result<bool, Error> {
    let password = Zeroizing::new(password.to_owned());
    tokio::task::spawn_blocking(move || hash.verify(&password))
        .await
        .map_err(|err| Error::internal(format!("password verification task failed: {err}")))
}

/// Identity service implementing [`IdentityCommand`].
#[derive(Clone)]
pub struct IdentityService<U, T> {
    users: Arc<U>,
    tokens: Arc<T>,
}

impl<U, T> IdentityService<U, T> {
    /// Create a service backed by a user store and a token codec.
    pub fn new(users: Arc<U>, tokens: Arc<T>) -> Self {
        Self { users, tokens }
    }
}

#[async_trait]
impl<U, T> IdentityCommand for IdentityService<U, T>
where
    U: UserRepository,
    T: AccessTokens,
{
    async fn signup(&self, details: &SignupDetails) -> Result<AccessToken, Error> {
        let taken = self
            .users
            .find_by_username(details.username().as_ref())
            .await
            .map_err(map_user_error)?;
        if taken.is_some() {
            return Err(Error::conflict(format!(
                "username {} is already taken",
                details.username()
            )));
        }

        let password_hash = hash_password(details.password()).await?;
        let user = User::new(
            UserId::random(),
            details.username().clone(),
            details.email().clone(),
            password_hash,
        );
        self.users.insert(&user).await.map_err(map_user_error)?;
        info!(user_id = %user.id(), username = %user.username(), "user signed up");

        self.tokens
            .issue(user.id())
            .map_err(|err| map_issue_error(&err))
    }

    async fn login(&self, credentials: &LoginCredentials) -> Result<AccessToken, Error> {
        let user = self
            .users
            .find_by_username(credentials.username())
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::unauthorized(INVALID_CREDENTIALS))?;

        if !verify_password(user.password_hash().clone(), credentials.password()).await? {
            debug!(user_id = %user.id(), "password mismatch");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }

        self.tokens
            .issue(user.id())
            .map_err(|err| map_issue_error(&err))
    }

    async fn resolve(&self, token: &str) -> Result<UserId, Error> {
        let user_id = self.tokens.resolve(token).map_err(|err| {
            debug!(error = %err, "bearer token rejected");
            Error::unauthorized(INVALID_TOKEN)
        })?;
        self.users
            .find_by_id(&user_id)
            .await
            .map_err(map_user_error)?
            .map(|user| user.id().clone())
            .ok_or_else(|| Error::unauthorized(INVALID_TOKEN))
    }
}

#[cfg(test)]
#[path = "identity_service_tests.rs"]
mod tests;
