//! Argon2id password hashing.

use argon2::Argon2;
use argon2::password_hash::{
    PasswordHash as PhcString, PasswordHasher, PasswordVerifier, SaltString,
};
use rand::rngs::OsRng;

/// Errors raised while hashing or parsing stored hashes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PasswordHashError {
    #[error("failed to hash password: {message}")]
    Hash { message: String },
    #[error("stored password hash is malformed: {message}")]
    Malformed { message: String },
}

/// Argon2id hash in PHC string format.
///
/// ## Invariants
/// - The wrapped string parses as a PHC hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Hash `password` with Argon2id and a fresh random salt.
    pub fn hash(password: &str) -> Result<Self, PasswordHashError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|err| PasswordHashError::Hash {
                message: err.to_string(),
            })?;
        Ok(Self(hash.to_string()))
    }

    /// Wrap a PHC string read back from storage.
    pub fn from_phc(phc: impl Into<String>) -> Result<Self, PasswordHashError> {
        let phc = phc.into();
        PhcString::new(&phc).map_err(|err| PasswordHashError::Malformed {
            message: err.to_string(),
        })?;
        Ok(Self(phc))
    }

    /// Check `password` against the stored hash.
    pub fn verify(&self, password: &str) -> bool {
        PhcString::new(&self.0).is_ok_and(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
    }

    /// PHC string representation for storage.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}
