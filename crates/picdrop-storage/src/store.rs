//! Remote store abstraction trait
//!
//! This module defines the RemoteStore trait that all backends must
//! implement: object upload with progress, public URL derivation, and the
//! image-record table operations (insert, list, delete, bulk delete).

use async_trait::async_trait;
use bytes::Bytes;
use picdrop_core::models::{ImageRecord, NewImageRecord};
use thiserror::Error;
use uuid::Uuid;

use crate::progress::ProgressSink;

/// Remote store operation errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Record insert failed: {0}")]
    InsertFailed(String),

    #[error("Record listing failed: {0}")]
    ListFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Backend not configured: {0}")]
    NotConfigured(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for remote store operations
pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for picdrop_core::AppError {
    fn from(err: StoreError) -> Self {
        use picdrop_core::AppError;
        match err {
            StoreError::UploadFailed(_) | StoreError::InvalidKey(_) | StoreError::IoError(_) => {
                AppError::Storage(err.to_string())
            }
            StoreError::InsertFailed(_)
            | StoreError::ListFailed(_)
            | StoreError::DeleteFailed(_) => AppError::Persistence(err.to_string()),
            StoreError::NotFound(msg) => AppError::NotFound(msg),
            StoreError::NotConfigured(msg) => AppError::ConfigurationMissing(msg),
            StoreError::ConfigError(msg) => AppError::ConfigurationMissing(msg),
        }
    }
}

/// Remote store abstraction trait
///
/// The collaborator holding both halves of persistence: stored objects and
/// the image-record table. Callers depend on this contract only, so the
/// core stays testable against a fake backend.
///
/// **Deletion contract:** `delete_record` and `delete_all_records` remove
/// the metadata row(s) *and* the underlying stored object(s). Backends own
/// the pairing explicitly; callers never assume trigger-based cascading.
/// Rows are removed before objects, so a failure between the two steps
/// strands at worst an unreferenced object, never a dangling record.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Whether the backend has the configuration it needs to accept calls.
    /// When false, callers skip all remote operations and notify the user
    /// that connection setup is required.
    fn is_configured(&self) -> bool;

    /// Upload an object and return its stored path.
    ///
    /// Transfer progress is reported through `progress` as `(sent, total)`
    /// byte counts while the body streams out.
    async fn upload(
        &self,
        storage_key: &str,
        content_type: &str,
        data: Bytes,
        progress: ProgressSink,
    ) -> StoreResult<String>;

    /// Publicly resolvable URL for a stored object path. Derived from
    /// configuration; no network call.
    fn public_url(&self, path: &str) -> String;

    /// Insert an image record; the backend assigns id and creation time.
    async fn insert_record(&self, record: NewImageRecord) -> StoreResult<ImageRecord>;

    /// List all image records, newest first.
    async fn list_records(&self) -> StoreResult<Vec<ImageRecord>>;

    /// Delete one record and its stored object. Unknown ids are `NotFound`.
    async fn delete_record(&self, id: Uuid) -> StoreResult<()>;

    /// Delete every record and every stored object.
    async fn delete_all_records(&self) -> StoreResult<()>;
}
