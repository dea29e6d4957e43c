//! Domain primitives, aggregates, and services.
//!
//! Purpose: define strongly typed entities used by the API and persistence
//! layers, the ports through which adapters plug in, and the services that
//! implement the driving ports. Nothing in here depends on actix or Diesel.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic error payload.
//! - User, Character, SheetEntry: the three stored record families.
//! - IdentityService, CharacterService, SheetEntryService: use-case services.

pub mod auth;
pub mod character;
mod character_service;
pub mod error;
mod identity_service;
pub mod password;
pub mod ports;
pub mod sheet_entry;
mod sheet_entry_service;
pub mod trace_id;
pub mod user;

pub use self::auth::{
    AccessToken, CredentialsValidationError, LoginCredentials, PASSWORD_MIN, SignupDetails,
};
pub use self::character::{
    Character, CharacterId, CharacterPatch, CharacterProfile, CharacterSummary,
    CharacterValidationError, PopulatedCharacter, SheetEntryGroups, SheetEntryRefs,
};
pub use self::character_service::CharacterService;
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::identity_service::IdentityService;
pub use self::password::{PasswordHash, PasswordHashError};
pub use self::sheet_entry::{
    Attack, Save, SheetEntry, SheetEntryId, SheetEntryKind, SheetEntryPatch, SheetEntryPayload,
    SheetEntryValidationError, Skill, Spell, Stat,
};
pub use self::sheet_entry_service::SheetEntryService;
pub use self::trace_id::TraceId;
pub use self::user::{EmailAddress, User, UserId, UserValidationError, Username};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::permission_denied("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
