//! Gallery state reconciliation.
//!
//! The remote listing is the source of truth. `refresh` replaces local
//! state wholesale, so it stays correct regardless of what completed out
//! of order during a batch; `remove_local` exists only to keep single-item
//! deletion responsive between refreshes.

use picdrop_core::models::ImageRecord;
use picdrop_core::AppError;
use picdrop_storage::RemoteStore;
use uuid::Uuid;

/// Ordered local cache of uploaded-image records, newest first.
#[derive(Debug, Default)]
pub struct GalleryState {
    records: Vec<ImageRecord>,
}

impl GalleryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[ImageRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.records.iter().any(|r| r.id == id)
    }

    /// Re-fetch the full listing from the store and replace local state.
    ///
    /// Authoritative and idempotent; never appends per-task results, which
    /// avoids ordering races between concurrent task completions and a
    /// manual refresh.
    pub async fn refresh(&mut self, store: &dyn RemoteStore) -> Result<&[ImageRecord], AppError> {
        let records = store.list_records().await?;
        tracing::debug!(count = records.len(), "Gallery refreshed");
        self.records = records;
        Ok(&self.records)
    }

    /// Optimistically drop one record from local state after a confirmed
    /// remote delete. Returns whether the record was present; unknown ids
    /// are a no-op.
    pub fn remove_local(&mut self, id: Uuid) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        before != self.records.len()
    }

    /// Drop all local records. Callers invoke this only after a successful
    /// remote bulk delete.
    pub fn clear_local(&mut self) {
        self.records.clear();
    }
}
