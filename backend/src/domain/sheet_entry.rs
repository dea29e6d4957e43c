//! Sheet entries: the skills, stats, saves, spells, and attacks attached to a
//! character.
//!
//! Each kind lives in its own store but shares the same envelope: an id, the
//! owning character, the owning user, and a kind-specific payload. Payloads
//! arrive as JSON objects and are validated per kind. Identity fields in the
//! incoming object are discarded so callers can never reassign ownership, and
//! keys a kind does not define are dropped rather than stored.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::domain::{CharacterId, UserId};

/// Maximum length of free-text payload fields such as names.
pub const ENTRY_TEXT_MAX: usize = 64;
/// Maximum length of a spell description.
pub const SPELL_DESCRIPTION_MAX: usize = 4096;

/// Keys that identify an entry and its owners; stripped from payload input.
const IDENTITY_KEYS: [&str; 6] = ["id", "_id", "userId", "characterId", "createdAt", "kind"];

/// The five kinds of sheet entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SheetEntryKind {
    Skill,
    Stat,
    Save,
    Spell,
    Attack,
}

impl SheetEntryKind {
    /// Every kind, in the order used for fan-out operations.
    pub const ALL: [Self; 5] = [Self::Skill, Self::Stat, Self::Save, Self::Spell, Self::Attack];

    /// Singular path segment used by the HTTP routes.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Skill => "skill",
            Self::Stat => "stat",
            Self::Save => "save",
            Self::Spell => "spell",
            Self::Attack => "attack",
        }
    }
}

impl fmt::Display for SheetEntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SheetEntryKind {
    type Err = SheetEntryValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| SheetEntryValidationError::UnknownKind {
                kind: s.to_owned(),
            })
    }
}

/// Validation failures for sheet-entry payloads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SheetEntryValidationError {
    #[error("unknown sheet entry kind: {kind}")]
    UnknownKind { kind: String },
    #[error("{kind} payload must be a JSON object")]
    NotAnObject { kind: SheetEntryKind },
    #[error("{kind} payload is invalid: {message}")]
    Malformed { kind: SheetEntryKind, message: String },
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: &'static str, min: i64, max: i64 },
    #[error("patch must set at least one field")]
    EmptyPatch,
}

/// Stable identifier of a sheet entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SheetEntryId(Uuid);

impl SheetEntryId {
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

impl fmt::Display for SheetEntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn required_text(field: &'static str, value: &str) -> Result<String, SheetEntryValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(SheetEntryValidationError::EmptyField { field });
    }
    bounded(field, trimmed, ENTRY_TEXT_MAX)
}

fn optional_text(
    field: &'static str,
    value: Option<&str>,
    max: usize,
) -> Result<Option<String>, SheetEntryValidationError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => bounded(field, text, max).map(Some),
    }
}

fn bounded(field: &'static str, text: &str, max: usize) -> Result<String, SheetEntryValidationError> {
    if text.chars().count() > max {
        return Err(SheetEntryValidationError::TooLong { field, max });
    }
    Ok(text.to_owned())
}

fn in_range(
    field: &'static str,
    value: i64,
    min: i64,
    max: i64,
) -> Result<(), SheetEntryValidationError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(SheetEntryValidationError::OutOfRange { field, min, max })
    }
}

/// Proficiency in a skill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ability: Option<String>,
    #[serde(default)]
    pub bonus: i32,
    #[serde(default)]
    pub proficient: bool,
}

/// Ability score such as strength or wisdom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stat {
    pub name: String,
    pub score: i32,
}

/// Saving throw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Save {
    pub name: String,
    #[serde(default)]
    pub bonus: i32,
    #[serde(default)]
    pub proficient: bool,
}

/// Known or prepared spell. Level 0 denotes a cantrip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spell {
    pub name: String,
    #[serde(default)]
    pub level: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Weapon or spell attack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attack {
    pub name: String,
    #[serde(default)]
    pub attack_bonus: i32,
    pub damage: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage_type: Option<String>,
}

/// Kind-specific content of a sheet entry.
///
/// ## Invariants
/// - Names are trimmed, non-empty, and at most [`ENTRY_TEXT_MAX`] characters.
/// - `Stat::score` is within 1..=30 and `Spell::level` within 0..=9.
///
/// # Examples
/// ```
/// use backend::domain::{SheetEntryKind, SheetEntryPayload};
/// use serde_json::json;
///
/// let payload = SheetEntryPayload::from_json(
///     SheetEntryKind::Stat,
///     json!({ "name": " Strength ", "score": 16 }),
/// )
/// .unwrap();
/// assert_eq!(payload.kind(), SheetEntryKind::Stat);
/// assert_eq!(payload.name(), "Strength");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SheetEntryPayload {
    Skill(Skill),
    Stat(Stat),
    Save(Save),
    Spell(Spell),
    Attack(Attack),
}

fn decode<T: DeserializeOwned>(
    kind: SheetEntryKind,
    object: Map<String, Value>,
) -> Result<T, SheetEntryValidationError> {
    serde_json::from_value(Value::Object(object)).map_err(|err| {
        SheetEntryValidationError::Malformed {
            kind,
            message: err.to_string(),
        }
    })
}

impl SheetEntryPayload {
    /// Parse and validate a payload for `kind` from caller-supplied JSON.
    ///
    /// Identity keys such as `id`, `userId`, and `characterId` are ignored.
    pub fn from_json(kind: SheetEntryKind, value: Value) -> Result<Self, SheetEntryValidationError> {
        let Value::Object(mut object) = value else {
            return Err(SheetEntryValidationError::NotAnObject { kind });
        };
        for key in IDENTITY_KEYS {
            object.remove(key);
        }
        let payload = match kind {
            SheetEntryKind::Skill => Self::Skill(decode(kind, object)?),
            SheetEntryKind::Stat => Self::Stat(decode(kind, object)?),
            SheetEntryKind::Save => Self::Save(decode(kind, object)?),
            SheetEntryKind::Spell => Self::Spell(decode(kind, object)?),
            SheetEntryKind::Attack => Self::Attack(decode(kind, object)?),
        };
        payload.normalised()
    }

    /// Kind of entry this payload describes.
    pub fn kind(&self) -> SheetEntryKind {
        match self {
            Self::Skill(_) => SheetEntryKind::Skill,
            Self::Stat(_) => SheetEntryKind::Stat,
            Self::Save(_) => SheetEntryKind::Save,
            Self::Spell(_) => SheetEntryKind::Spell,
            Self::Attack(_) => SheetEntryKind::Attack,
        }
    }

    /// Display name of the entry.
    pub fn name(&self) -> &str {
        match self {
            Self::Skill(skill) => &skill.name,
            Self::Stat(stat) => &stat.name,
            Self::Save(save) => &save.name,
            Self::Spell(spell) => &spell.name,
            Self::Attack(attack) => &attack.name,
        }
    }

    /// JSON object form, as persisted and as merged by patches.
    pub fn to_json(&self) -> Value {
        // Every variant is a plain struct of strings, integers, and booleans.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Merge `patch` into this payload and re-validate the result.
    pub fn merged(&self, patch: &SheetEntryPatch) -> Result<Self, SheetEntryValidationError> {
        let mut object = match self.to_json() {
            Value::Object(object) => object,
            _ => Map::new(),
        };
        for (key, value) in &patch.0 {
            if value.is_null() {
                object.remove(key);
            } else {
                object.insert(key.clone(), value.clone());
            }
        }
        Self::from_json(self.kind(), Value::Object(object))
    }

    fn normalised(self) -> Result<Self, SheetEntryValidationError> {
        Ok(match self {
            Self::Skill(skill) => Self::Skill(Skill {
                name: required_text("name", &skill.name)?,
                ability: optional_text("ability", skill.ability.as_deref(), ENTRY_TEXT_MAX)?,
                ..skill
            }),
            Self::Stat(stat) => {
                in_range("score", i64::from(stat.score), 1, 30)?;
                Self::Stat(Stat {
                    name: required_text("name", &stat.name)?,
                    ..stat
                })
            }
            Self::Save(save) => Self::Save(Save {
                name: required_text("name", &save.name)?,
                ..save
            }),
            Self::Spell(spell) => {
                in_range("level", i64::from(spell.level), 0, 9)?;
                Self::Spell(Spell {
                    name: required_text("name", &spell.name)?,
                    school: optional_text("school", spell.school.as_deref(), ENTRY_TEXT_MAX)?,
                    description: optional_text(
                        "description",
                        spell.description.as_deref(),
                        SPELL_DESCRIPTION_MAX,
                    )?,
                    ..spell
                })
            }
            Self::Attack(attack) => Self::Attack(Attack {
                name: required_text("name", &attack.name)?,
                damage: required_text("damage", &attack.damage)?,
                damage_type: optional_text(
                    "damageType",
                    attack.damage_type.as_deref(),
                    ENTRY_TEXT_MAX,
                )?,
                ..attack
            }),
        })
    }
}

/// Partial update for a sheet entry, expressed as a JSON merge patch.
///
/// ## Invariants
/// - Contains at least one key after identity keys are stripped.
/// - A `null` value clears an optional field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetEntryPatch(Map<String, Value>);

impl SheetEntryPatch {
    /// Build a patch from caller-supplied JSON.
    pub fn from_json(kind: SheetEntryKind, value: Value) -> Result<Self, SheetEntryValidationError> {
        let Value::Object(mut object) = value else {
            return Err(SheetEntryValidationError::NotAnObject { kind });
        };
        for key in IDENTITY_KEYS {
            object.remove(key);
        }
        if object.is_empty() {
            return Err(SheetEntryValidationError::EmptyPatch);
        }
        Ok(Self(object))
    }
}

/// A persisted sheet entry.
///
/// Serialises as the payload fields flattened alongside `id`, `characterId`,
/// `userId`, and `createdAt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetEntry {
    id: SheetEntryId,
    character_id: CharacterId,
    #[serde(rename = "userId")]
    owner: UserId,
    #[serde(flatten)]
    payload: SheetEntryPayload,
    created_at: DateTime<Utc>,
}

impl SheetEntry {
    /// Assemble an entry from its parts.
    pub fn new(
        id: SheetEntryId,
        character_id: CharacterId,
        owner: UserId,
        payload: SheetEntryPayload,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            character_id,
            owner,
            payload,
            created_at,
        }
    }

    pub fn id(&self) -> SheetEntryId {
        self.id
    }

    pub fn kind(&self) -> SheetEntryKind {
        self.payload.kind()
    }

    pub fn character_id(&self) -> &CharacterId {
        &self.character_id
    }

    /// User that attached the entry; the only user allowed to read or edit it.
    pub fn owner(&self) -> &UserId {
        &self.owner
    }

    pub fn payload(&self) -> &SheetEntryPayload {
        &self.payload
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Copy of this entry with `payload` replacing the current content.
    #[must_use]
    pub fn with_payload(&self, payload: SheetEntryPayload) -> Self {
        Self {
            payload,
            ..self.clone()
        }
    }
}
