//! Driving port for sheet-entry reads.

use async_trait::async_trait;

use crate::domain::{Error, SheetEntry, SheetEntryId, SheetEntryKind, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SheetEntryQuery: Send + Sync {
    /// Load an entry the caller owns.
    async fn get(
        &self,
        caller: &UserId,
        kind: SheetEntryKind,
        id: &SheetEntryId,
    ) -> Result<SheetEntry, Error>;
}
