//! Internal Diesel row structs.
//!
//! These types never leave the persistence layer; repositories convert them
//! to and from domain types.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{characters, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Insertable struct for creating user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
}

// ---------------------------------------------------------------------------
// Character models
// ---------------------------------------------------------------------------

/// Row struct for reading from the characters table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = characters)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CharacterRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub race: Option<String>,
    pub class_name: Option<String>,
    pub level: Option<i16>,
    pub skill_ids: Vec<Uuid>,
    pub stat_ids: Vec<Uuid>,
    pub save_ids: Vec<Uuid>,
    pub spell_ids: Vec<Uuid>,
    pub attack_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating character records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = characters)]
pub(crate) struct NewCharacterRow<'a> {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: &'a str,
    pub race: Option<&'a str>,
    pub class_name: Option<&'a str>,
    pub level: Option<i16>,
    pub skill_ids: Vec<Uuid>,
    pub stat_ids: Vec<Uuid>,
    pub save_ids: Vec<Uuid>,
    pub spell_ids: Vec<Uuid>,
    pub attack_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Changeset for the display attributes; `None` clears a column.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = characters)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct CharacterProfileUpdate<'a> {
    pub name: &'a str,
    pub race: Option<&'a str>,
    pub class_name: Option<&'a str>,
    pub level: Option<i16>,
}

// ---------------------------------------------------------------------------
// Sheet-entry models
// ---------------------------------------------------------------------------

/// Row read from any of the five sheet-entry tables.
///
/// Not tied to a table: queries select the columns explicitly in this order.
#[derive(Debug, Clone, Queryable)]
pub(crate) struct SheetEntryRow {
    pub id: Uuid,
    pub character_id: Uuid,
    pub owner_id: Uuid,
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
}
