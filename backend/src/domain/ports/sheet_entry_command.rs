//! Driving port for sheet-entry mutations.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{
    CharacterId, Error, SheetEntry, SheetEntryId, SheetEntryKind, SheetEntryPayload, UserId,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SheetEntryCommand: Send + Sync {
    /// Attach a new entry to a character the caller owns.
    ///
    /// Either both the entry and the reference on the character exist
    /// afterwards, or neither does.
    async fn attach(
        &self,
        caller: &UserId,
        character: &CharacterId,
        payload: SheetEntryPayload,
    ) -> Result<SheetEntry, Error>;

    /// Merge a JSON patch into an entry the caller owns.
    ///
    /// `patch` is the raw request body (`Value::Null` when absent); it is only
    /// validated once ownership has been established.
    async fn update(
        &self,
        caller: &UserId,
        kind: SheetEntryKind,
        id: &SheetEntryId,
        patch: Value,
    ) -> Result<SheetEntry, Error>;
}
