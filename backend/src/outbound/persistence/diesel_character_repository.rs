//! PostgreSQL-backed `CharacterRepository` implementation using Diesel ORM.
//!
//! Entry references live in `uuid[]` columns, one per kind. Appends use
//! `array_append` in a single `UPDATE`, so concurrent attaches never lose ids.
//! Listing follows the `seq` insertion counter rather than timestamps, which
//! can tie.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_types::{Array, Uuid as SqlUuid};
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{CharacterRepository, CharacterRepositoryError};
use crate::domain::{
    Character, CharacterId, CharacterProfile, SheetEntryId, SheetEntryKind, SheetEntryRefs,
    UserId,
};

use super::error_mapping::{is_foreign_key_violation, map_diesel_error, map_pool_error};
use super::models::{CharacterProfileUpdate, CharacterRow, NewCharacterRow};
use super::pool::DbPool;
use super::schema::characters;

diesel::define_sql_function! {
    /// PostgreSQL `array_append(anyarray, anyelement)` specialised to UUIDs.
    fn array_append(array: Array<SqlUuid>, element: SqlUuid) -> Array<SqlUuid>;
}

/// Diesel-backed implementation of the [`CharacterRepository`] port.
#[derive(Clone)]
pub struct DieselCharacterRepository {
    pool: DbPool,
}

impl DieselCharacterRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_error(error: &diesel::result::Error) -> CharacterRepositoryError {
    map_diesel_error(
        error,
        CharacterRepositoryError::query,
        CharacterRepositoryError::connection,
    )
}

fn ids(raw: Vec<Uuid>) -> Vec<SheetEntryId> {
    raw.into_iter().map(SheetEntryId::from_uuid).collect()
}

fn uuids(ids: &[SheetEntryId]) -> Vec<Uuid> {
    ids.iter().map(|id| *id.as_uuid()).collect()
}

fn level_to_db(level: Option<u8>) -> Option<i16> {
    level.map(i16::from)
}

fn row_to_character(row: CharacterRow) -> Result<Character, CharacterRepositoryError> {
    let level = row.level.map(u8::try_from).transpose().map_err(|_| {
        CharacterRepositoryError::query(format!("stored character {} has invalid level", row.id))
    })?;
    let profile = CharacterProfile::try_new(
        &row.name,
        row.race.as_deref(),
        row.class_name.as_deref(),
        level,
    )
    .map_err(|err| {
        CharacterRepositoryError::query(format!("stored character {} is invalid: {err}", row.id))
    })?;
    let entries = SheetEntryRefs {
        skills: ids(row.skill_ids),
        stats: ids(row.stat_ids),
        saves: ids(row.save_ids),
        spells: ids(row.spell_ids),
        attacks: ids(row.attack_ids),
    };
    Ok(Character::new(
        CharacterId::from_uuid(row.id),
        UserId::from_uuid(row.owner_id),
        profile,
        entries,
        row.created_at,
    ))
}

#[async_trait]
impl CharacterRepository for DieselCharacterRepository {
    async fn insert(&self, character: &Character) -> Result<(), CharacterRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, CharacterRepositoryError::connection))?;

        let profile = character.profile();
        let refs = character.entries();
        let row = NewCharacterRow {
            id: *character.id().as_uuid(),
            owner_id: *character.owner().as_uuid(),
            name: profile.name(),
            race: profile.race(),
            class_name: profile.class_name(),
            level: level_to_db(profile.level()),
            skill_ids: uuids(&refs.skills),
            stat_ids: uuids(&refs.stats),
            save_ids: uuids(&refs.saves),
            spell_ids: uuids(&refs.spells),
            attack_ids: uuids(&refs.attacks),
            created_at: character.created_at(),
        };
        diesel::insert_into(characters::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_error(&err))
    }

    async fn find_by_id(
        &self,
        id: &CharacterId,
    ) -> Result<Option<Character>, CharacterRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, CharacterRepositoryError::connection))?;

        let row: Option<CharacterRow> = characters::table
            .find(id.as_uuid())
            .select(CharacterRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_error(&err))?;

        row.map(row_to_character).transpose()
    }

    async fn list_by_owner(
        &self,
        owner: &UserId,
    ) -> Result<Vec<Character>, CharacterRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, CharacterRepositoryError::connection))?;

        let rows: Vec<CharacterRow> = characters::table
            .filter(characters::owner_id.eq(owner.as_uuid()))
            .order(characters::seq.asc())
            .select(CharacterRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_error(&err))?;

        rows.into_iter().map(row_to_character).collect()
    }

    async fn update_profile(
        &self,
        id: &CharacterId,
        profile: &CharacterProfile,
    ) -> Result<bool, CharacterRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, CharacterRepositoryError::connection))?;

        let changes = CharacterProfileUpdate {
            name: profile.name(),
            race: profile.race(),
            class_name: profile.class_name(),
            level: level_to_db(profile.level()),
        };
        let affected = diesel::update(characters::table.find(id.as_uuid()))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(|err| map_error(&err))?;
        Ok(affected > 0)
    }

    async fn append_entry(
        &self,
        id: &CharacterId,
        kind: SheetEntryKind,
        entry: &SheetEntryId,
    ) -> Result<bool, CharacterRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, CharacterRepositoryError::connection))?;

        let target = characters::table.find(id.as_uuid());
        let element = *entry.as_uuid();
        let statement = match kind {
            SheetEntryKind::Skill => diesel::update(target)
                .set(characters::skill_ids.eq(array_append(characters::skill_ids, element)))
                .execute(&mut conn)
                .await,
            SheetEntryKind::Stat => diesel::update(target)
                .set(characters::stat_ids.eq(array_append(characters::stat_ids, element)))
                .execute(&mut conn)
                .await,
            SheetEntryKind::Save => diesel::update(target)
                .set(characters::save_ids.eq(array_append(characters::save_ids, element)))
                .execute(&mut conn)
                .await,
            SheetEntryKind::Spell => diesel::update(target)
                .set(characters::spell_ids.eq(array_append(characters::spell_ids, element)))
                .execute(&mut conn)
                .await,
            SheetEntryKind::Attack => diesel::update(target)
                .set(characters::attack_ids.eq(array_append(characters::attack_ids, element)))
                .execute(&mut conn)
                .await,
        };
        let affected = statement.map_err(|err| map_error(&err))?;
        Ok(affected > 0)
    }

    async fn delete(&self, id: &CharacterId) -> Result<bool, CharacterRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, CharacterRepositoryError::connection))?;

        let affected = diesel::delete(characters::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(|err| {
                if is_foreign_key_violation(&err) {
                    CharacterRepositoryError::referenced(format!("character {id} has entries"))
                } else {
                    map_error(&err)
                }
            })?;
        Ok(affected > 0)
    }
}
