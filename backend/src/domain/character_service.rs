//! Character services: creation, population, ownership-checked updates, and
//! cascading deletion.
//!
//! Deletion fans out one `delete_by_character` call per sheet-entry kind,
//! runs them concurrently, and waits for every one to settle before the
//! character record itself is touched. When any of them fails the character
//! is kept, so repeating the delete converges on a clean state.
//!
//! An attach can land between the cascade and the character delete. Stores
//! that enforce the reference refuse the delete, which surfaces as a conflict
//! the caller resolves by deleting again. Stores that do not are swept once
//! more after the character is gone.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::join_all;
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::ports::{
    CharacterCommand, CharacterQuery, CharacterRepository, CharacterRepositoryError,
    SheetEntryRepository, SheetEntryRepositoryError,
};
use crate::domain::{
    Character, CharacterId, CharacterPatch, CharacterProfile, CharacterSummary,
    CharacterValidationError, Error, PopulatedCharacter, SheetEntry, SheetEntryGroups,
    SheetEntryKind, SheetEntryRefs, UserId,
};

pub(crate) fn map_character_error(error: CharacterRepositoryError) -> Error {
    match error {
        CharacterRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("character repository unavailable: {message}"))
        }
        CharacterRepositoryError::Query { message } => {
            Error::internal(format!("character repository error: {message}"))
        }
        CharacterRepositoryError::Referenced { message } => Error::conflict(format!(
            "character is still gaining entries, retry the delete: {message}"
        )),
    }
}

pub(crate) fn map_entry_error(error: SheetEntryRepositoryError) -> Error {
    match error {
        SheetEntryRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("sheet entry repository unavailable: {message}"))
        }
        SheetEntryRepositoryError::Query { message } => {
            Error::internal(format!("sheet entry repository error: {message}"))
        }
    }
}

pub(crate) fn character_not_found(id: &CharacterId) -> Error {
    Error::not_found(format!("character {id} not found"))
}

pub(crate) fn permission_denied() -> Error {
    Error::permission_denied("permission denied")
}

/// Character service implementing [`CharacterCommand`] and [`CharacterQuery`].
#[derive(Clone)]
pub struct CharacterService<C, S> {
    characters: Arc<C>,
    entries: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<C, S> CharacterService<C, S> {
    /// Create a service over the character store and the sheet-entry stores.
    pub fn new(characters: Arc<C>, entries: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            characters,
            entries,
            clock,
        }
    }
}

impl<C, S> CharacterService<C, S>
where
    C: CharacterRepository,
    S: SheetEntryRepository,
{
    async fn load(&self, id: &CharacterId) -> Result<Character, Error> {
        self.characters
            .find_by_id(id)
            .await
            .map_err(map_character_error)?
            .ok_or_else(|| character_not_found(id))
    }

    async fn load_owned(&self, caller: &UserId, id: &CharacterId) -> Result<Character, Error> {
        let character = self.load(id).await?;
        if !character.is_owned_by(caller) {
            warn!(character_id = %id, caller = %caller, "character access denied");
            return Err(permission_denied());
        }
        Ok(character)
    }

    /// Resolve the ids of one kind, keeping reference order and skipping ids
    /// that no longer resolve.
    async fn populate_kind(
        &self,
        kind: SheetEntryKind,
        refs: &SheetEntryRefs,
    ) -> Result<Vec<SheetEntry>, Error> {
        let ids = refs.ids(kind);
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut found: HashMap<_, _> = self
            .entries
            .find_by_ids(kind, ids)
            .await
            .map_err(map_entry_error)?
            .into_iter()
            .map(|entry| (entry.id(), entry))
            .collect();
        Ok(ids.iter().filter_map(|id| found.remove(id)).collect())
    }

    /// Delete every entry of `id` across all kinds, concurrently.
    ///
    /// Every kind settles before the first failure is reported.
    async fn clear_entries(&self, id: &CharacterId) -> Result<u64, SheetEntryRepositoryError> {
        let entries = self.entries.as_ref();
        let outcomes = join_all(SheetEntryKind::ALL.into_iter().map(|kind| async move {
            (kind, entries.delete_by_character(kind, id).await)
        }))
        .await;

        let mut first_failure = None;
        let mut removed = 0_u64;
        for (kind, outcome) in outcomes {
            match outcome {
                Ok(count) => removed += count,
                Err(err) => {
                    warn!(character_id = %id, kind = %kind, error = %err, "cascade delete failed");
                    first_failure.get_or_insert(err);
                }
            }
        }
        first_failure.map_or(Ok(removed), Err)
    }
}

#[async_trait]
impl<C, S> CharacterCommand for CharacterService<C, S>
where
    C: CharacterRepository,
    S: SheetEntryRepository,
{
    async fn create(&self, owner: &UserId, profile: CharacterProfile) -> Result<Character, Error> {
        let character = Character::new(
            CharacterId::random(),
            owner.clone(),
            profile,
            SheetEntryRefs::default(),
            self.clock.utc(),
        );
        self.characters
            .insert(&character)
            .await
            .map_err(map_character_error)?;
        info!(character_id = %character.id(), owner = %owner, "character created");
        Ok(character)
    }

    async fn update(
        &self,
        caller: &UserId,
        id: &CharacterId,
        patch: CharacterPatch,
    ) -> Result<Character, Error> {
        let character = self.load_owned(caller, id).await?;
        if patch.is_empty() {
            return Err(Error::invalid_request(CharacterValidationError::EmptyPatch.to_string()));
        }
        let profile = character
            .profile()
            .patched(&patch)
            .map_err(|err| Error::invalid_request(err.to_string()))?;

        let updated = self
            .characters
            .update_profile(id, &profile)
            .await
            .map_err(map_character_error)?;
        if !updated {
            return Err(character_not_found(id));
        }
        Ok(character.with_profile(profile))
    }

    async fn delete(&self, caller: &UserId, id: &CharacterId) -> Result<(), Error> {
        self.load_owned(caller, id).await?;

        let mut removed = self.clear_entries(id).await.map_err(map_entry_error)?;

        // A concurrent delete may have won the race; the outcome is the same.
        self.characters
            .delete(id)
            .await
            .map_err(map_character_error)?;

        match self.clear_entries(id).await {
            Ok(0) => {}
            Ok(late) => {
                warn!(character_id = %id, late, "removed entries attached during delete");
                removed += late;
            }
            Err(err) => {
                warn!(character_id = %id, error = %err, "post-delete entry sweep failed");
            }
        }
        info!(character_id = %id, removed_entries = removed, "character deleted");
        Ok(())
    }
}

#[async_trait]
impl<C, S> CharacterQuery for CharacterService<C, S>
where
    C: CharacterRepository,
    S: SheetEntryRepository,
{
    async fn get(&self, _caller: &UserId, id: &CharacterId) -> Result<PopulatedCharacter, Error> {
        let character = self.load(id).await?;
        let refs = character.entries();
        let resolved = join_all(
            SheetEntryKind::ALL
                .into_iter()
                .map(|kind| async move { (kind, self.populate_kind(kind, refs).await) }),
        )
        .await;

        let mut groups = SheetEntryGroups::default();
        for (kind, entries) in resolved {
            groups.set(kind, entries?);
        }
        Ok(PopulatedCharacter::new(character, groups))
    }

    async fn list(&self, caller: &UserId) -> Result<Vec<CharacterSummary>, Error> {
        let characters = self
            .characters
            .list_by_owner(caller)
            .await
            .map_err(map_character_error)?;
        Ok(characters.iter().map(CharacterSummary::from).collect())
    }
}

#[cfg(test)]
#[path = "character_service_tests.rs"]
mod tests;
