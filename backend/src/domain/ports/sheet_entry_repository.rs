//! Port for the five sheet-entry stores.
//!
//! One trait covers every kind; adapters dispatch on [`SheetEntryKind`] to
//! the matching table or collection.

use async_trait::async_trait;

use crate::domain::{CharacterId, SheetEntry, SheetEntryId, SheetEntryKind};

use super::define_port_error;

define_port_error! {
    /// Errors raised by sheet-entry repository adapters.
    pub enum SheetEntryRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "sheet entry repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "sheet entry repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SheetEntryRepository: Send + Sync {
    /// Persist a new entry in the store for its kind.
    async fn insert(&self, entry: &SheetEntry) -> Result<(), SheetEntryRepositoryError>;

    /// Find one entry by id.
    async fn find_by_id(
        &self,
        kind: SheetEntryKind,
        id: &SheetEntryId,
    ) -> Result<Option<SheetEntry>, SheetEntryRepositoryError>;

    /// Fetch every entry of `kind` whose id is in `ids`, in no particular
    /// order. Unknown ids are skipped.
    async fn find_by_ids(
        &self,
        kind: SheetEntryKind,
        ids: &[SheetEntryId],
    ) -> Result<Vec<SheetEntry>, SheetEntryRepositoryError>;

    /// Replace the payload of an existing entry.
    ///
    /// Returns `false` when the entry no longer exists.
    async fn update_payload(&self, entry: &SheetEntry) -> Result<bool, SheetEntryRepositoryError>;

    /// Remove one entry. Returns `false` when it was already gone.
    async fn delete(
        &self,
        kind: SheetEntryKind,
        id: &SheetEntryId,
    ) -> Result<bool, SheetEntryRepositoryError>;

    /// Remove every entry of `kind` whose owning character is `character`.
    /// Returns the number of removed entries.
    async fn delete_by_character(
        &self,
        kind: SheetEntryKind,
        character: &CharacterId,
    ) -> Result<u64, SheetEntryRepositoryError>;
}
