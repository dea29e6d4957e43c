//! In-memory repository adapters.
//!
//! Used when no database URL is configured and by the HTTP integration
//! tests. State lives for the lifetime of the process.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::ports::{
    CharacterRepository, CharacterRepositoryError, SheetEntryRepository,
    SheetEntryRepositoryError, UserPersistenceError, UserRepository,
};
use crate::domain::{
    Character, CharacterId, CharacterProfile, SheetEntry, SheetEntryId, SheetEntryKind, User,
    UserId,
};

/// Users keyed by id; usernames are unique.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut users = self.users.write().await;
        if users
            .values()
            .any(|existing| existing.username() == user.username())
        {
            return Err(UserPersistenceError::duplicate(user.username().as_ref()));
        }
        users.insert(user.id().clone(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, UserPersistenceError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|user| user.username().as_ref() == username)
            .cloned())
    }
}

/// Characters in insertion order, which doubles as creation order.
#[derive(Debug, Default)]
pub struct InMemoryCharacterRepository {
    characters: RwLock<Vec<Character>>,
}

impl InMemoryCharacterRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CharacterRepository for InMemoryCharacterRepository {
    async fn insert(&self, character: &Character) -> Result<(), CharacterRepositoryError> {
        let mut characters = self.characters.write().await;
        if characters.iter().any(|existing| existing.id() == character.id()) {
            return Err(CharacterRepositoryError::query(format!(
                "character {} already exists",
                character.id()
            )));
        }
        characters.push(character.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &CharacterId,
    ) -> Result<Option<Character>, CharacterRepositoryError> {
        Ok(self
            .characters
            .read()
            .await
            .iter()
            .find(|character| character.id() == *id)
            .cloned())
    }

    async fn list_by_owner(
        &self,
        owner: &UserId,
    ) -> Result<Vec<Character>, CharacterRepositoryError> {
        Ok(self
            .characters
            .read()
            .await
            .iter()
            .filter(|character| character.is_owned_by(owner))
            .cloned()
            .collect())
    }

    async fn update_profile(
        &self,
        id: &CharacterId,
        profile: &CharacterProfile,
    ) -> Result<bool, CharacterRepositoryError> {
        let mut characters = self.characters.write().await;
        let Some(slot) = characters.iter_mut().find(|character| character.id() == *id) else {
            return Ok(false);
        };
        *slot = slot.with_profile(profile.clone());
        Ok(true)
    }

    async fn append_entry(
        &self,
        id: &CharacterId,
        kind: SheetEntryKind,
        entry: &SheetEntryId,
    ) -> Result<bool, CharacterRepositoryError> {
        let mut characters = self.characters.write().await;
        let Some(slot) = characters.iter_mut().find(|character| character.id() == *id) else {
            return Ok(false);
        };
        slot.entries_mut().push(kind, *entry);
        Ok(true)
    }

    async fn delete(&self, id: &CharacterId) -> Result<bool, CharacterRepositoryError> {
        let mut characters = self.characters.write().await;
        let before = characters.len();
        characters.retain(|character| character.id() != *id);
        Ok(characters.len() != before)
    }
}

/// Sheet entries of every kind, keyed by kind and id.
#[derive(Debug, Default)]
pub struct InMemorySheetEntryRepository {
    entries: RwLock<HashMap<(SheetEntryKind, SheetEntryId), SheetEntry>>,
}

impl InMemorySheetEntryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SheetEntryRepository for InMemorySheetEntryRepository {
    async fn insert(&self, entry: &SheetEntry) -> Result<(), SheetEntryRepositoryError> {
        let mut entries = self.entries.write().await;
        let key = (entry.kind(), entry.id());
        if entries.contains_key(&key) {
            return Err(SheetEntryRepositoryError::query(format!(
                "{} {} already exists",
                entry.kind(),
                entry.id()
            )));
        }
        entries.insert(key, entry.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        kind: SheetEntryKind,
        id: &SheetEntryId,
    ) -> Result<Option<SheetEntry>, SheetEntryRepositoryError> {
        Ok(self.entries.read().await.get(&(kind, *id)).cloned())
    }

    async fn find_by_ids(
        &self,
        kind: SheetEntryKind,
        ids: &[SheetEntryId],
    ) -> Result<Vec<SheetEntry>, SheetEntryRepositoryError> {
        let entries = self.entries.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| entries.get(&(kind, *id)).cloned())
            .collect())
    }

    async fn update_payload(&self, entry: &SheetEntry) -> Result<bool, SheetEntryRepositoryError> {
        let mut entries = self.entries.write().await;
        let Some(slot) = entries.get_mut(&(entry.kind(), entry.id())) else {
            return Ok(false);
        };
        *slot = slot.with_payload(entry.payload().clone());
        Ok(true)
    }

    async fn delete(
        &self,
        kind: SheetEntryKind,
        id: &SheetEntryId,
    ) -> Result<bool, SheetEntryRepositoryError> {
        Ok(self.entries.write().await.remove(&(kind, *id)).is_some())
    }

    async fn delete_by_character(
        &self,
        kind: SheetEntryKind,
        character: &CharacterId,
    ) -> Result<u64, SheetEntryRepositoryError> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|(entry_kind, _), entry| {
            *entry_kind != kind || entry.character_id() != character
        });
        Ok(u64::try_from(before - entries.len()).unwrap_or(u64::MAX))
    }
}
