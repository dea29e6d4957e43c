//! Character aggregate: the character record plus its ordered sheet-entry
//! references.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{SheetEntry, SheetEntryId, SheetEntryKind, UserId};

/// Maximum length of a character name and of the free-text attributes.
pub const CHARACTER_TEXT_MAX: usize = 64;
/// Lowest character level.
pub const LEVEL_MIN: u8 = 1;
/// Highest character level.
pub const LEVEL_MAX: u8 = 20;

/// Validation failures for character attributes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CharacterValidationError {
    #[error("name must not be empty")]
    EmptyName,
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("level must be between {min} and {max}")]
    LevelOutOfRange { min: u8, max: u8 },
    #[error("request body must set at least one of name, race, className, level")]
    EmptyPatch,
}

/// Stable identifier of a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CharacterId(Uuid);

impl CharacterId {
    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap a UUID read from a path or from storage.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn bounded(field: &'static str, raw: &str) -> Result<String, CharacterValidationError> {
    let trimmed = raw.trim();
    if trimmed.chars().count() > CHARACTER_TEXT_MAX {
        return Err(CharacterValidationError::TooLong {
            field,
            max: CHARACTER_TEXT_MAX,
        });
    }
    Ok(trimmed.to_owned())
}

fn optional(field: &'static str, raw: Option<&str>) -> Result<Option<String>, CharacterValidationError> {
    match raw {
        None => Ok(None),
        Some(text) => bounded(field, text).map(|value| (!value.is_empty()).then_some(value)),
    }
}

fn level(raw: Option<u8>) -> Result<Option<u8>, CharacterValidationError> {
    match raw {
        Some(value) if !(LEVEL_MIN..=LEVEL_MAX).contains(&value) => {
            Err(CharacterValidationError::LevelOutOfRange {
                min: LEVEL_MIN,
                max: LEVEL_MAX,
            })
        }
        other => Ok(other),
    }
}

/// Display attributes of a character.
///
/// ## Invariants
/// - `name` is trimmed, non-empty, and at most [`CHARACTER_TEXT_MAX`]
///   characters.
/// - `race` and `class_name`, when present, are trimmed and non-empty.
/// - `level`, when present, lies within [`LEVEL_MIN`]..=[`LEVEL_MAX`].
///
/// # Examples
/// ```
/// use backend::domain::CharacterProfile;
///
/// let profile = CharacterProfile::try_new(" dustinyschild ", None, None, Some(3)).unwrap();
/// assert_eq!(profile.name(), "dustinyschild");
/// assert!(CharacterProfile::try_new("   ", None, None, None).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterProfile {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    race: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    class_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    level: Option<u8>,
}

impl CharacterProfile {
    /// Validate raw attributes.
    pub fn try_new(
        name: &str,
        race: Option<&str>,
        class_name: Option<&str>,
        level_value: Option<u8>,
    ) -> Result<Self, CharacterValidationError> {
        let name = bounded("name", name)?;
        if name.is_empty() {
            return Err(CharacterValidationError::EmptyName);
        }
        Ok(Self {
            name,
            race: optional("race", race)?,
            class_name: optional("className", class_name)?,
            level: level(level_value)?,
        })
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn race(&self) -> Option<&str> {
        self.race.as_deref()
    }

    pub fn class_name(&self) -> Option<&str> {
        self.class_name.as_deref()
    }

    pub fn level(&self) -> Option<u8> {
        self.level
    }

    /// Apply `patch`, returning the validated result.
    pub fn patched(&self, patch: &CharacterPatch) -> Result<Self, CharacterValidationError> {
        Self::try_new(
            patch.name.as_deref().unwrap_or(&self.name),
            patch.race.as_ref().map_or(self.race.as_deref(), Option::as_deref),
            patch
                .class_name
                .as_ref()
                .map_or(self.class_name.as_deref(), Option::as_deref),
            patch.level.unwrap_or(self.level),
        )
    }
}

/// Partial update of a character's display attributes.
///
/// For the optional attributes the outer `Option` says whether the field is
/// being changed and the inner one whether it is being cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharacterPatch {
    pub name: Option<String>,
    pub race: Option<Option<String>>,
    pub class_name: Option<Option<String>>,
    pub level: Option<Option<u8>>,
}

impl CharacterPatch {
    /// Whether the patch sets no field at all.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.race.is_none()
            && self.class_name.is_none()
            && self.level.is_none()
    }
}

/// Ordered sheet-entry ids held by a character, one list per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetEntryRefs {
    pub skills: Vec<SheetEntryId>,
    pub stats: Vec<SheetEntryId>,
    pub saves: Vec<SheetEntryId>,
    pub spells: Vec<SheetEntryId>,
    pub attacks: Vec<SheetEntryId>,
}

impl SheetEntryRefs {
    /// Ids of the given kind, in attachment order.
    pub fn ids(&self, kind: SheetEntryKind) -> &[SheetEntryId] {
        match kind {
            SheetEntryKind::Skill => &self.skills,
            SheetEntryKind::Stat => &self.stats,
            SheetEntryKind::Save => &self.saves,
            SheetEntryKind::Spell => &self.spells,
            SheetEntryKind::Attack => &self.attacks,
        }
    }

    /// Append `id` to the list for `kind`.
    pub fn push(&mut self, kind: SheetEntryKind, id: SheetEntryId) {
        let list = match kind {
            SheetEntryKind::Skill => &mut self.skills,
            SheetEntryKind::Stat => &mut self.stats,
            SheetEntryKind::Save => &mut self.saves,
            SheetEntryKind::Spell => &mut self.spells,
            SheetEntryKind::Attack => &mut self.attacks,
        };
        list.push(id);
    }
}

/// A character record with its entry references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    id: CharacterId,
    #[serde(rename = "userId")]
    owner: UserId,
    #[serde(flatten)]
    profile: CharacterProfile,
    #[serde(flatten)]
    entries: SheetEntryRefs,
    created_at: DateTime<Utc>,
}

impl Character {
    /// Assemble a character from its parts.
    pub fn new(
        id: CharacterId,
        owner: UserId,
        profile: CharacterProfile,
        entries: SheetEntryRefs,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            owner,
            profile,
            entries,
            created_at,
        }
    }

    pub fn id(&self) -> CharacterId {
        self.id
    }

    /// User who created the character; fixed for its lifetime.
    pub fn owner(&self) -> &UserId {
        &self.owner
    }

    pub fn profile(&self) -> &CharacterProfile {
        &self.profile
    }

    pub fn entries(&self) -> &SheetEntryRefs {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> &mut SheetEntryRefs {
        &mut self.entries
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_owned_by(&self, user: &UserId) -> bool {
        &self.owner == user
    }

    /// Copy of this character carrying `profile`.
    #[must_use]
    pub fn with_profile(&self, profile: CharacterProfile) -> Self {
        Self {
            profile,
            ..self.clone()
        }
    }
}

/// Entry objects resolved for each kind, in reference order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SheetEntryGroups {
    pub skills: Vec<SheetEntry>,
    pub stats: Vec<SheetEntry>,
    pub saves: Vec<SheetEntry>,
    pub spells: Vec<SheetEntry>,
    pub attacks: Vec<SheetEntry>,
}

impl SheetEntryGroups {
    /// Store the resolved entries for `kind`.
    pub fn set(&mut self, kind: SheetEntryKind, entries: Vec<SheetEntry>) {
        match kind {
            SheetEntryKind::Skill => self.skills = entries,
            SheetEntryKind::Stat => self.stats = entries,
            SheetEntryKind::Save => self.saves = entries,
            SheetEntryKind::Spell => self.spells = entries,
            SheetEntryKind::Attack => self.attacks = entries,
        }
    }
}

/// Character with every referenced entry resolved to its full object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulatedCharacter {
    id: CharacterId,
    #[serde(rename = "userId")]
    owner: UserId,
    #[serde(flatten)]
    profile: CharacterProfile,
    #[serde(flatten)]
    entries: SheetEntryGroups,
    created_at: DateTime<Utc>,
}

impl PopulatedCharacter {
    /// Combine a character with its resolved entries.
    pub fn new(character: Character, entries: SheetEntryGroups) -> Self {
        Self {
            id: character.id,
            owner: character.owner,
            profile: character.profile,
            entries,
            created_at: character.created_at,
        }
    }

    pub fn id(&self) -> CharacterId {
        self.id
    }

    pub fn profile(&self) -> &CharacterProfile {
        &self.profile
    }

    pub fn entries(&self) -> &SheetEntryGroups {
        &self.entries
    }
}

/// Entry in a user's character list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterSummary {
    pub character_id: CharacterId,
    pub name: String,
}

impl From<&Character> for CharacterSummary {
    fn from(value: &Character) -> Self {
        Self {
            character_id: value.id,
            name: value.profile.name.clone(),
        }
    }
}
