//! PostgreSQL-backed `SheetEntryRepository` implementation using Diesel ORM.
//!
//! The five entry tables share one column layout, so every operation is
//! written once and dispatched to the table for the requested kind by
//! `with_entry_table!`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::pooled_connection::bb8::PooledConnection;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{SheetEntryRepository, SheetEntryRepositoryError};
use crate::domain::{
    CharacterId, SheetEntry, SheetEntryId, SheetEntryKind, SheetEntryPayload, UserId,
};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::SheetEntryRow;
use super::pool::DbPool;

/// Bind `$table` to the schema module for `$kind` and evaluate `$body`.
macro_rules! with_entry_table {
    ($kind:expr, $table:ident => $body:expr) => {
        match $kind {
            SheetEntryKind::Skill => {
                use super::schema::skills as $table;
                $body
            }
            SheetEntryKind::Stat => {
                use super::schema::stats as $table;
                $body
            }
            SheetEntryKind::Save => {
                use super::schema::saves as $table;
                $body
            }
            SheetEntryKind::Spell => {
                use super::schema::spells as $table;
                $body
            }
            SheetEntryKind::Attack => {
                use super::schema::attacks as $table;
                $body
            }
        }
    };
}

/// Diesel-backed implementation of the [`SheetEntryRepository`] port.
#[derive(Clone)]
pub struct DieselSheetEntryRepository {
    pool: DbPool,
}

impl DieselSheetEntryRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn connection(
        &self,
    ) -> Result<PooledConnection<'_, AsyncPgConnection>, SheetEntryRepositoryError> {
        self.pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, SheetEntryRepositoryError::connection))
    }
}

fn map_error(error: &diesel::result::Error) -> SheetEntryRepositoryError {
    map_diesel_error(
        error,
        SheetEntryRepositoryError::query,
        SheetEntryRepositoryError::connection,
    )
}

fn row_to_entry(
    kind: SheetEntryKind,
    row: SheetEntryRow,
) -> Result<SheetEntry, SheetEntryRepositoryError> {
    let payload = SheetEntryPayload::from_json(kind, row.payload).map_err(|err| {
        SheetEntryRepositoryError::query(format!("stored {kind} {} is invalid: {err}", row.id))
    })?;
    Ok(SheetEntry::new(
        SheetEntryId::from_uuid(row.id),
        CharacterId::from_uuid(row.character_id),
        UserId::from_uuid(row.owner_id),
        payload,
        row.created_at,
    ))
}

fn rows_to_entries(
    kind: SheetEntryKind,
    rows: Vec<SheetEntryRow>,
) -> Result<Vec<SheetEntry>, SheetEntryRepositoryError> {
    rows.into_iter().map(|row| row_to_entry(kind, row)).collect()
}

#[async_trait]
impl SheetEntryRepository for DieselSheetEntryRepository {
    async fn insert(&self, entry: &SheetEntry) -> Result<(), SheetEntryRepositoryError> {
        let mut conn = self.connection().await?;
        let id = *entry.id().as_uuid();
        let character_id = *entry.character_id().as_uuid();
        let owner_id = *entry.owner().as_uuid();
        let payload = entry.payload().to_json();
        let created_at = entry.created_at();

        with_entry_table!(entry.kind(), table => {
            diesel::insert_into(table::table)
                .values((
                    table::id.eq(id),
                    table::character_id.eq(character_id),
                    table::owner_id.eq(owner_id),
                    table::payload.eq(&payload),
                    table::created_at.eq(created_at),
                ))
                .execute(&mut conn)
                .await
        })
        .map(|_| ())
        .map_err(|err| map_error(&err))
    }

    async fn find_by_id(
        &self,
        kind: SheetEntryKind,
        id: &SheetEntryId,
    ) -> Result<Option<SheetEntry>, SheetEntryRepositoryError> {
        let mut conn = self.connection().await?;
        let row: Option<SheetEntryRow> = with_entry_table!(kind, table => {
            table::table
                .find(id.as_uuid())
                .select((
                    table::id,
                    table::character_id,
                    table::owner_id,
                    table::payload,
                    table::created_at,
                ))
                .first(&mut conn)
                .await
                .optional()
        })
        .map_err(|err| map_error(&err))?;

        row.map(|row| row_to_entry(kind, row)).transpose()
    }

    async fn find_by_ids(
        &self,
        kind: SheetEntryKind,
        ids: &[SheetEntryId],
    ) -> Result<Vec<SheetEntry>, SheetEntryRepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.connection().await?;
        let wanted: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let rows: Vec<SheetEntryRow> = with_entry_table!(kind, table => {
            table::table
                .filter(table::id.eq_any(&wanted))
                .select((
                    table::id,
                    table::character_id,
                    table::owner_id,
                    table::payload,
                    table::created_at,
                ))
                .load(&mut conn)
                .await
        })
        .map_err(|err| map_error(&err))?;

        rows_to_entries(kind, rows)
    }

    async fn update_payload(&self, entry: &SheetEntry) -> Result<bool, SheetEntryRepositoryError> {
        let mut conn = self.connection().await?;
        let id = *entry.id().as_uuid();
        let payload = entry.payload().to_json();

        let affected = with_entry_table!(entry.kind(), table => {
            diesel::update(table::table.find(id))
                .set(table::payload.eq(&payload))
                .execute(&mut conn)
                .await
        })
        .map_err(|err| map_error(&err))?;
        Ok(affected > 0)
    }

    async fn delete(
        &self,
        kind: SheetEntryKind,
        id: &SheetEntryId,
    ) -> Result<bool, SheetEntryRepositoryError> {
        let mut conn = self.connection().await?;
        let affected = with_entry_table!(kind, table => {
            diesel::delete(table::table.find(id.as_uuid()))
                .execute(&mut conn)
                .await
        })
        .map_err(|err| map_error(&err))?;
        Ok(affected > 0)
    }

    async fn delete_by_character(
        &self,
        kind: SheetEntryKind,
        character: &CharacterId,
    ) -> Result<u64, SheetEntryRepositoryError> {
        let mut conn = self.connection().await?;
        let affected = with_entry_table!(kind, table => {
            diesel::delete(table::table.filter(table::character_id.eq(character.as_uuid())))
                .execute(&mut conn)
                .await
        })
        .map_err(|err| map_error(&err))?;
        Ok(u64::try_from(affected).unwrap_or(u64::MAX))
    }
}
