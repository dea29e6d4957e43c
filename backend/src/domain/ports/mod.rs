//! Domain ports for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, [`AccessTokens`]) are implemented by outbound
//! adapters; driving ports (`*Command`, `*Query`) are implemented by the
//! domain services and called by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod access_tokens;
mod character_command;
mod character_query;
mod character_repository;
mod identity_command;
mod sheet_entry_command;
mod sheet_entry_query;
mod sheet_entry_repository;
mod user_repository;

#[cfg(test)]
pub use access_tokens::MockAccessTokens;
pub use access_tokens::{AccessTokenError, AccessTokens};
#[cfg(test)]
pub use character_command::MockCharacterCommand;
pub use character_command::CharacterCommand;
#[cfg(test)]
pub use character_query::MockCharacterQuery;
pub use character_query::CharacterQuery;
#[cfg(test)]
pub use character_repository::MockCharacterRepository;
pub use character_repository::{CharacterRepository, CharacterRepositoryError};
#[cfg(test)]
pub use identity_command::MockIdentityCommand;
pub use identity_command::IdentityCommand;
#[cfg(test)]
pub use sheet_entry_command::MockSheetEntryCommand;
pub use sheet_entry_command::SheetEntryCommand;
#[cfg(test)]
pub use sheet_entry_query::MockSheetEntryQuery;
pub use sheet_entry_query::SheetEntryQuery;
#[cfg(test)]
pub use sheet_entry_repository::MockSheetEntryRepository;
pub use sheet_entry_repository::{SheetEntryRepository, SheetEntryRepositoryError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
