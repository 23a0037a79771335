//! Single-file upload task: validation and the upload lifecycle.

use picdrop_core::constants::IMAGE_MIME_PREFIX;
use picdrop_core::models::{FileInput, ImageRecord, NewImageRecord, UploadStatus};
use picdrop_core::AppError;
use picdrop_storage::{generate_storage_key, ProgressSink, RemoteStore, StoreError};
use thiserror::Error;

/// Why a single file in a batch failed.
///
/// Validation variants are raised before any store call; the transport and
/// persistence variants carry the underlying store error unchanged. No
/// retries happen at this layer.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("{filename} is not an image file")]
    InvalidFileType { filename: String },

    #[error("{filename} exceeds {}MB size limit", .limit / (1024 * 1024))]
    FileTooLarge {
        filename: String,
        size: usize,
        limit: usize,
    },

    #[error("Upload failed: {0}")]
    Transport(StoreError),

    #[error("Record insert failed: {0}")]
    Persistence(StoreError),
}

impl UploadError {
    /// Validation failures are detected before any I/O.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            UploadError::InvalidFileType { .. } | UploadError::FileTooLarge { .. }
        )
    }
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::InvalidFileType { .. } => AppError::InvalidInput(err.to_string()),
            UploadError::FileTooLarge { .. } => AppError::PayloadTooLarge(err.to_string()),
            UploadError::Transport(source) => source.into(),
            UploadError::Persistence(source) => source.into(),
        }
    }
}

/// One file's upload lifecycle.
///
/// The storage key is derived at construction so progress events are
/// keyed by a stable identifier before the transfer begins, and so keys
/// are unique across a concurrent batch.
pub struct UploadTask {
    file: FileInput,
    storage_key: String,
    status: UploadStatus,
}

impl UploadTask {
    pub fn new(file: FileInput) -> Self {
        let storage_key = generate_storage_key(&file.filename);
        UploadTask {
            file,
            storage_key,
            status: UploadStatus::Pending,
        }
    }

    pub fn file(&self) -> &FileInput {
        &self.file
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    pub fn status(&self) -> UploadStatus {
        self.status
    }

    fn validate(&self, max_size_bytes: usize) -> Result<(), UploadError> {
        if !self.file.content_type.starts_with(IMAGE_MIME_PREFIX) {
            return Err(UploadError::InvalidFileType {
                filename: self.file.filename.clone(),
            });
        }

        if self.file.size() > max_size_bytes {
            return Err(UploadError::FileTooLarge {
                filename: self.file.filename.clone(),
                size: self.file.size(),
                limit: max_size_bytes,
            });
        }

        Ok(())
    }

    /// Run the task to a terminal state: validate, upload the object,
    /// derive the public URL, persist the record.
    ///
    /// The three store calls are strictly sequential; progress for the
    /// transfer flows through `progress`.
    pub async fn run(
        &mut self,
        store: &dyn RemoteStore,
        max_size_bytes: usize,
        progress: ProgressSink,
    ) -> Result<ImageRecord, UploadError> {
        if let Err(err) = self.validate(max_size_bytes) {
            self.status = self.status.advance(UploadStatus::Failed);
            return Err(err);
        }

        self.status = self.status.advance(UploadStatus::InProgress);

        let upload_result = store
            .upload(
                &self.storage_key,
                &self.file.content_type,
                self.file.bytes.clone(),
                progress,
            )
            .await;
        let path = match upload_result {
            Ok(path) => path,
            Err(e) => {
                self.status = self.status.advance(UploadStatus::Failed);
                return Err(UploadError::Transport(e));
            }
        };

        let url = store.public_url(&path);

        let insert_result = store
            .insert_record(NewImageRecord {
                url,
                filename: self.file.filename.clone(),
                storage_key: self.storage_key.clone(),
            })
            .await;
        let record = match insert_result {
            Ok(record) => record,
            Err(e) => {
                self.status = self.status.advance(UploadStatus::Failed);
                return Err(UploadError::Persistence(e));
            }
        };

        self.status = self.status.advance(UploadStatus::Succeeded);

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use picdrop_core::constants::MAX_UPLOAD_BYTES;
    use picdrop_storage::MemoryStore;

    fn file(name: &str, content_type: &str, size: usize) -> FileInput {
        FileInput::new(name, content_type, vec![0u8; size])
    }

    #[tokio::test]
    async fn test_valid_file_uploads_and_records() {
        let store = MemoryStore::new();
        let mut task = UploadTask::new(file("cat.jpg", "image/jpeg", 2 * 1024 * 1024));

        let record = task
            .run(&store, MAX_UPLOAD_BYTES, ProgressSink::disabled())
            .await
            .unwrap();

        assert_eq!(record.filename, "cat.jpg");
        assert_eq!(record.storage_key, task.storage_key());
        assert!(record.url.contains(task.storage_key()));
        assert_eq!(task.status(), UploadStatus::Succeeded);
        assert_eq!(store.upload_attempts(), 1);
        assert_eq!(store.record_count().await, 1);
    }

    #[tokio::test]
    async fn test_non_image_never_reaches_store() {
        let store = MemoryStore::new();
        let mut task = UploadTask::new(file("notes.txt", "text/plain", 10));

        let err = task
            .run(&store, MAX_UPLOAD_BYTES, ProgressSink::disabled())
            .await
            .unwrap_err();

        assert!(matches!(err, UploadError::InvalidFileType { .. }));
        assert!(err.to_string().contains("notes.txt"));
        assert_eq!(task.status(), UploadStatus::Failed);
        assert_eq!(store.upload_attempts(), 0);
    }

    #[tokio::test]
    async fn test_oversized_file_never_reaches_store() {
        let store = MemoryStore::new();
        let mut task = UploadTask::new(file("huge.png", "image/png", 8 * 1024 * 1024));

        let err = task
            .run(&store, MAX_UPLOAD_BYTES, ProgressSink::disabled())
            .await
            .unwrap_err();

        assert!(matches!(err, UploadError::FileTooLarge { .. }));
        assert!(err.to_string().contains("5MB"));
        assert_eq!(store.upload_attempts(), 0);
    }

    #[tokio::test]
    async fn test_exact_limit_is_accepted() {
        let store = MemoryStore::new();
        let mut task = UploadTask::new(file("edge.png", "image/png", MAX_UPLOAD_BYTES));

        let result = task
            .run(&store, MAX_UPLOAD_BYTES, ProgressSink::disabled())
            .await;

        assert!(result.is_ok());
        assert_eq!(store.upload_attempts(), 1);
    }

    #[test]
    fn test_validation_error_classification() {
        let err = UploadError::InvalidFileType {
            filename: "a.txt".to_string(),
        };
        assert!(err.is_validation());
        assert!(matches!(AppError::from(err), AppError::InvalidInput(_)));

        let err = UploadError::FileTooLarge {
            filename: "a.png".to_string(),
            size: 10,
            limit: 5,
        };
        assert!(err.is_validation());
        assert!(matches!(AppError::from(err), AppError::PayloadTooLarge(_)));

        let err = UploadError::Transport(StoreError::UploadFailed("reset".to_string()));
        assert!(!err.is_validation());
    }

    #[test]
    fn test_tasks_for_same_filename_get_distinct_keys() {
        let a = UploadTask::new(file("same.png", "image/png", 1));
        let b = UploadTask::new(file("same.png", "image/png", 1));
        assert_ne!(a.storage_key(), b.storage_key());
    }
}
