//! Port for character persistence.

use async_trait::async_trait;

use crate::domain::{
    Character, CharacterId, CharacterProfile, SheetEntryId, SheetEntryKind, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by character repository adapters.
    pub enum CharacterRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "character repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "character repository query failed: {message}",
        /// Entries still reference the character, so it cannot be removed.
        Referenced { message: String } =>
            "character is still referenced: {message}",
    }
}

/// Port for storing characters and their entry references.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CharacterRepository: Send + Sync {
    /// Persist a new character.
    async fn insert(&self, character: &Character) -> Result<(), CharacterRepositoryError>;

    /// Find a character by id.
    async fn find_by_id(
        &self,
        id: &CharacterId,
    ) -> Result<Option<Character>, CharacterRepositoryError>;

    /// Characters owned by `owner`, oldest first.
    async fn list_by_owner(&self, owner: &UserId)
    -> Result<Vec<Character>, CharacterRepositoryError>;

    /// Overwrite the display attributes of a character.
    ///
    /// Entry references are untouched so concurrent appends are not lost.
    /// Returns `false` when the character no longer exists.
    async fn update_profile(
        &self,
        id: &CharacterId,
        profile: &CharacterProfile,
    ) -> Result<bool, CharacterRepositoryError>;

    /// Atomically append `entry` to the reference list for `kind`.
    ///
    /// Returns `false` when the character no longer exists.
    async fn append_entry(
        &self,
        id: &CharacterId,
        kind: SheetEntryKind,
        entry: &SheetEntryId,
    ) -> Result<bool, CharacterRepositoryError>;

    /// Remove a character record. Returns `false` when it was already gone.
    ///
    /// Stores that enforce entry references fail with
    /// [`CharacterRepositoryError::Referenced`] while any entry points at the
    /// character.
    async fn delete(&self, id: &CharacterId) -> Result<bool, CharacterRepositoryError>;
}
