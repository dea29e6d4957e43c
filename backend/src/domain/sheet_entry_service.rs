//! Sheet-entry services: attachment to a character, owner-only reads, and
//! authorise-then-write updates.
//!
//! Attachment is two writes (insert the entry, append its id to the
//! character). When the append fails the freshly inserted entry is deleted
//! again so callers never observe a half-attached entry.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::domain::character_service::{
    character_not_found, map_character_error, map_entry_error, permission_denied,
};
use crate::domain::ports::{
    CharacterRepository, SheetEntryCommand, SheetEntryQuery, SheetEntryRepository,
};
use crate::domain::{
    CharacterId, Error, SheetEntry, SheetEntryId, SheetEntryKind, SheetEntryPatch,
    SheetEntryPayload, UserId,
};

fn entry_not_found(kind: SheetEntryKind, id: &SheetEntryId) -> Error {
    Error::not_found(format!("{kind} {id} not found"))
}

/// Sheet-entry service implementing [`SheetEntryCommand`] and
/// [`SheetEntryQuery`].
#[derive(Clone)]
pub struct SheetEntryService<C, S> {
    characters: Arc<C>,
    entries: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<C, S> SheetEntryService<C, S> {
    /// Create a service over the character store and the sheet-entry stores.
    pub fn new(characters: Arc<C>, entries: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            characters,
            entries,
            clock,
        }
    }
}

impl<C, S> SheetEntryService<C, S>
where
    C: CharacterRepository,
    S: SheetEntryRepository,
{
    async fn load_owned(
        &self,
        caller: &UserId,
        kind: SheetEntryKind,
        id: &SheetEntryId,
    ) -> Result<SheetEntry, Error> {
        let entry = self
            .entries
            .find_by_id(kind, id)
            .await
            .map_err(map_entry_error)?
            .ok_or_else(|| entry_not_found(kind, id))?;
        if entry.owner() != caller {
            warn!(kind = %kind, entry_id = %id, caller = %caller, "sheet entry access denied");
            return Err(permission_denied());
        }
        Ok(entry)
    }

    async fn discard(&self, entry: &SheetEntry) {
        if let Err(err) = self.entries.delete(entry.kind(), &entry.id()).await {
            error!(
                kind = %entry.kind(),
                entry_id = %entry.id(),
                error = %err,
                "failed to remove sheet entry after aborted attach"
            );
        }
    }
}

#[async_trait]
impl<C, S> SheetEntryCommand for SheetEntryService<C, S>
where
    C: CharacterRepository,
    S: SheetEntryRepository,
{
    async fn attach(
        &self,
        caller: &UserId,
        character_id: &CharacterId,
        payload: SheetEntryPayload,
    ) -> Result<SheetEntry, Error> {
        let character = self
            .characters
            .find_by_id(character_id)
            .await
            .map_err(map_character_error)?
            .ok_or_else(|| character_not_found(character_id))?;
        if !character.is_owned_by(caller) {
            warn!(character_id = %character_id, caller = %caller, "attach denied");
            return Err(permission_denied());
        }

        let entry = SheetEntry::new(
            SheetEntryId::random(),
            *character_id,
            caller.clone(),
            payload,
            self.clock.utc(),
        );
        self.entries.insert(&entry).await.map_err(map_entry_error)?;

        match self
            .characters
            .append_entry(character_id, entry.kind(), &entry.id())
            .await
        {
            Ok(true) => {
                info!(
                    kind = %entry.kind(),
                    entry_id = %entry.id(),
                    character_id = %character_id,
                    "sheet entry attached"
                );
                Ok(entry)
            }
            Ok(false) => {
                self.discard(&entry).await;
                Err(character_not_found(character_id))
            }
            Err(err) => {
                self.discard(&entry).await;
                Err(map_character_error(err))
            }
        }
    }

    async fn update(
        &self,
        caller: &UserId,
        kind: SheetEntryKind,
        id: &SheetEntryId,
        patch: Value,
    ) -> Result<SheetEntry, Error> {
        let entry = self.load_owned(caller, kind, id).await?;
        let patch = SheetEntryPatch::from_json(kind, patch)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        let payload = entry
            .payload()
            .merged(&patch)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        let updated = entry.with_payload(payload);

        let stored = self
            .entries
            .update_payload(&updated)
            .await
            .map_err(map_entry_error)?;
        if !stored {
            return Err(entry_not_found(kind, id));
        }
        Ok(updated)
    }
}

#[async_trait]
impl<C, S> SheetEntryQuery for SheetEntryService<C, S>
where
    C: CharacterRepository,
    S: SheetEntryRepository,
{
    async fn get(
        &self,
        caller: &UserId,
        kind: SheetEntryKind,
        id: &SheetEntryId,
    ) -> Result<SheetEntry, Error> {
        self.load_owned(caller, kind, id).await
    }
}

#[cfg(test)]
#[path = "sheet_entry_service_tests.rs"]
mod tests;
