//! Authentication primitives: login credentials, signup details, and access
//! tokens.
//!
//! Handlers turn raw request strings into these types before calling the
//! identity service, so the service only ever sees validated input.

use std::fmt;

use zeroize::Zeroizing;

use crate::domain::{EmailAddress, UserValidationError, Username};

/// Domain error returned when credential payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialsValidationError {
    /// Username was missing or blank once trimmed.
    EmptyUsername,
    /// Password was blank.
    EmptyPassword,
    /// Password was shorter than [`PASSWORD_MIN`].
    PasswordTooShort { min: usize },
    /// Username or email failed validation.
    User(UserValidationError),
}

impl fmt::Display for CredentialsValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::PasswordTooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
            Self::User(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for CredentialsValidationError {}

impl From<UserValidationError> for CredentialsValidationError {
    fn from(value: UserValidationError) -> Self {
        Self::User(value)
    }
}

/// Minimum password length accepted at signup.
pub const PASSWORD_MIN: usize = 8;

/// Validated login credentials used by the identity service.
///
/// ## Invariants
/// - `username` is trimmed and must not be empty after trimming.
/// - `password` is required to be non-empty but retains caller-provided
///   whitespace.
///
/// # Examples
/// ```
/// use backend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("admin", "password").unwrap();
/// assert_eq!(creds.username(), "admin");
/// assert_eq!(creds.password(), "password");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw username/password inputs.
    pub fn try_from_parts(
        username: &str,
        password: &str,
    ) -> Result<Self, CredentialsValidationError> {
        let normalized = username.trim();
        if normalized.is_empty() {
            return Err(CredentialsValidationError::EmptyUsername);
        }

        if password.is_empty() {
            return Err(CredentialsValidationError::EmptyPassword);
        }

        Ok(Self {
            username: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Username string suitable for user lookups.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validated registration request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupDetails {
    username: Username,
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl SignupDetails {
    /// Validate raw signup inputs.
    pub fn try_from_parts(
        username: &str,
        password: &str,
        email: &str,
    ) -> Result<Self, CredentialsValidationError> {
        if username.trim().is_empty() {
            return Err(CredentialsValidationError::EmptyUsername);
        }
        if password.is_empty() {
            return Err(CredentialsValidationError::EmptyPassword);
        }
        if password.chars().count() < PASSWORD_MIN {
            return Err(CredentialsValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }
        Ok(Self {
            username: Username::new(username)?,
            email: EmailAddress::new(email)?,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Requested login name.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Contact email.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Plain-text password, hashed before storage.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Bearer token handed to clients after signup or login.
///
/// The token text is held in a zeroising buffer and is only exposed through
/// [`AccessToken::as_str`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken(Zeroizing<String>);

impl AccessToken {
    /// Wrap encoded token text.
    pub fn new(token: impl Into<String>) -> Self {
        Self(Zeroizing::new(token.into()))
    }

    /// Encoded token text as sent in `Authorization: Bearer` headers.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}
