//! Driving port for character reads.

use async_trait::async_trait;

use crate::domain::{CharacterId, CharacterSummary, Error, PopulatedCharacter, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CharacterQuery: Send + Sync {
    /// Load a character with every referenced entry resolved.
    async fn get(&self, caller: &UserId, id: &CharacterId) -> Result<PopulatedCharacter, Error>;

    /// Summaries of the caller's characters, oldest first.
    async fn list(&self, caller: &UserId) -> Result<Vec<CharacterSummary>, Error>;
}
