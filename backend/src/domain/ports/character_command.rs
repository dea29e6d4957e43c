//! Driving port for character mutations.

use async_trait::async_trait;

use crate::domain::{Character, CharacterId, CharacterPatch, CharacterProfile, Error, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CharacterCommand: Send + Sync {
    /// Create a character owned by `owner`.
    async fn create(&self, owner: &UserId, profile: CharacterProfile) -> Result<Character, Error>;

    /// Apply `patch` to a character the caller owns.
    ///
    /// Ownership is checked before the patch is looked at, so a non-owner
    /// is refused even when the patch is empty.
    async fn update(
        &self,
        caller: &UserId,
        id: &CharacterId,
        patch: CharacterPatch,
    ) -> Result<Character, Error>;

    /// Delete a character the caller owns together with all of its entries.
    async fn delete(&self, caller: &UserId, id: &CharacterId) -> Result<(), Error>;
}
