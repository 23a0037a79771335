//! Local filesystem store implementation.
//!
//! Objects live under `{base_path}/objects/`; image records live in a JSON
//! sidecar at `{base_path}/records.json`. Intended for development and
//! self-hosted single-node setups.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use picdrop_core::models::{ImageRecord, NewImageRecord};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::progress::ProgressSink;
use crate::store::{RemoteStore, StoreError, StoreResult};
use crate::UPLOAD_CHUNK_BYTES;

const RECORDS_FILE: &str = "records.json";
const OBJECTS_DIR: &str = "objects";

/// Local filesystem store implementation
pub struct LocalStore {
    base_path: PathBuf,
    base_url: String,
    records: Mutex<Vec<ImageRecord>>,
}

impl LocalStore {
    /// Create a new LocalStore rooted at `base_path`.
    ///
    /// # Arguments
    /// * `base_path` - Root directory for objects and the record file
    /// * `base_url` - Base URL objects are served under (e.g., "http://localhost:3000/images")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StoreResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(base_path.join(OBJECTS_DIR))
            .await
            .map_err(|e| {
                StoreError::ConfigError(format!(
                    "Failed to create storage directory {}: {}",
                    base_path.display(),
                    e
                ))
            })?;

        let records = Self::load_records(&base_path.join(RECORDS_FILE)).await?;

        Ok(LocalStore {
            base_path,
            base_url,
            records: Mutex::new(records),
        })
    }

    async fn load_records(path: &Path) -> StoreResult<Vec<ImageRecord>> {
        if !fs::try_exists(path).await.unwrap_or(false) {
            return Ok(Vec::new());
        }
        let data = fs::read(path).await?;
        serde_json::from_slice(&data).map_err(|e| {
            StoreError::ConfigError(format!(
                "Corrupt record file {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Persist the record list. Caller holds the records lock.
    async fn persist_records(&self, records: &[ImageRecord]) -> StoreResult<()> {
        let data = serde_json::to_vec_pretty(records)
            .map_err(|e| StoreError::InsertFailed(format!("Failed to encode records: {}", e)))?;
        fs::write(self.base_path.join(RECORDS_FILE), data).await?;
        Ok(())
    }

    /// Convert a storage key to a filesystem path, rejecting traversal.
    ///
    /// Generated keys are single safe segments, but keys also arrive from
    /// persisted records, so the guard stays on every path conversion.
    fn key_to_path(&self, storage_key: &str) -> StoreResult<PathBuf> {
        if storage_key.contains("..") || storage_key.starts_with('/') {
            return Err(StoreError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }
        Ok(self.base_path.join(OBJECTS_DIR).join(storage_key))
    }

    async fn remove_object(&self, storage_key: &str) -> StoreResult<()> {
        let path = self.key_to_path(storage_key)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(());
        }

        fs::remove_file(&path).await.map_err(|e| {
            StoreError::DeleteFailed(format!("Failed to delete file {}: {}", path.display(), e))
        })
    }
}

#[async_trait]
impl RemoteStore for LocalStore {
    fn is_configured(&self) -> bool {
        true
    }

    async fn upload(
        &self,
        storage_key: &str,
        _content_type: &str,
        data: Bytes,
        progress: ProgressSink,
    ) -> StoreResult<String> {
        let path = self.key_to_path(storage_key)?;
        let total = data.len() as u64;
        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StoreError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        let mut sent: u64 = 0;
        for chunk in data.chunks(UPLOAD_CHUNK_BYTES) {
            file.write_all(chunk).await.map_err(|e| {
                StoreError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
            })?;
            sent += chunk.len() as u64;
            progress.report(sent, total);
        }
        if total == 0 {
            progress.report(0, 0);
        }

        file.sync_all().await.map_err(|e| {
            StoreError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            key = %storage_key,
            size_bytes = total,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local store upload successful"
        );

        Ok(storage_key.to_string())
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn insert_record(&self, record: NewImageRecord) -> StoreResult<ImageRecord> {
        let mut records = self.records.lock().await;

        let inserted = ImageRecord {
            id: Uuid::new_v4(),
            url: record.url,
            filename: record.filename,
            storage_key: record.storage_key,
            created_at: Utc::now(),
        };
        records.push(inserted.clone());
        self.persist_records(&records).await?;

        tracing::info!(id = %inserted.id, filename = %inserted.filename, "Image record inserted");

        Ok(inserted)
    }

    async fn list_records(&self) -> StoreResult<Vec<ImageRecord>> {
        let records = self.records.lock().await;
        let mut out = records.clone();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    async fn delete_record(&self, id: Uuid) -> StoreResult<()> {
        let mut records = self.records.lock().await;

        let index = records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("Image record {}", id)))?;

        let removed = records.remove(index);
        self.persist_records(&records).await?;
        drop(records);

        self.remove_object(&removed.storage_key).await?;

        tracing::info!(id = %id, key = %removed.storage_key, "Image record and object deleted");

        Ok(())
    }

    async fn delete_all_records(&self) -> StoreResult<()> {
        let mut records = self.records.lock().await;

        let removed: Vec<ImageRecord> = std::mem::take(&mut *records);
        self.persist_records(&records).await?;
        drop(records);

        let count = removed.len();
        for record in removed {
            self.remove_object(&record.storage_key).await?;
        }

        tracing::info!(count, "All image records and objects deleted");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn test_store(dir: &tempfile::TempDir) -> LocalStore {
        LocalStore::new(dir.path(), "http://localhost:3000/images".to_string())
            .await
            .unwrap()
    }

    async fn upload_and_record(store: &LocalStore, key: &str, filename: &str) -> ImageRecord {
        let path = store
            .upload(key, "image/png", Bytes::from_static(b"png bytes"), ProgressSink::disabled())
            .await
            .unwrap();
        store
            .insert_record(NewImageRecord {
                url: store.public_url(&path),
                filename: filename.to_string(),
                storage_key: key.to_string(),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_upload_writes_object_and_derives_url() {
        let dir = tempdir().unwrap();
        let store = test_store(&dir).await;

        let path = store
            .upload("1-0-cat.png", "image/png", Bytes::from_static(b"data"), ProgressSink::disabled())
            .await
            .unwrap();

        assert_eq!(path, "1-0-cat.png");
        assert_eq!(
            store.public_url(&path),
            "http://localhost:3000/images/1-0-cat.png"
        );
        assert!(dir.path().join("objects/1-0-cat.png").exists());
    }

    #[tokio::test]
    async fn test_records_listed_newest_first() {
        let dir = tempdir().unwrap();
        let store = test_store(&dir).await;

        let first = upload_and_record(&store, "1-0-a.png", "a.png").await;
        let second = upload_and_record(&store, "1-1-b.png", "b.png").await;

        let listed = store.list_records().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed[0].created_at >= listed[1].created_at);
        assert_eq!(listed.iter().filter(|r| r.id == first.id).count(), 1);
        assert_eq!(listed.iter().filter(|r| r.id == second.id).count(), 1);
    }

    #[tokio::test]
    async fn test_delete_record_removes_row_and_object() {
        let dir = tempdir().unwrap();
        let store = test_store(&dir).await;

        let record = upload_and_record(&store, "1-0-gone.png", "gone.png").await;
        assert!(dir.path().join("objects/1-0-gone.png").exists());

        store.delete_record(record.id).await.unwrap();

        assert!(store.list_records().await.unwrap().is_empty());
        assert!(!dir.path().join("objects/1-0-gone.png").exists());
    }

    #[tokio::test]
    async fn test_delete_unknown_record_is_not_found() {
        let dir = tempdir().unwrap();
        let store = test_store(&dir).await;

        let result = store.delete_record(Uuid::new_v4()).await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_all_removes_rows_and_objects() {
        let dir = tempdir().unwrap();
        let store = test_store(&dir).await;

        upload_and_record(&store, "1-0-a.png", "a.png").await;
        upload_and_record(&store, "1-1-b.png", "b.png").await;

        store.delete_all_records().await.unwrap();

        assert!(store.list_records().await.unwrap().is_empty());
        assert!(!dir.path().join("objects/1-0-a.png").exists());
        assert!(!dir.path().join("objects/1-1-b.png").exists());
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let store = test_store(&dir).await;

        let result = store
            .upload("../../etc/passwd", "image/png", Bytes::new(), ProgressSink::disabled())
            .await;
        assert!(matches!(result, Err(StoreError::InvalidKey(_))));

        let result = store
            .upload("/etc/passwd", "image/png", Bytes::new(), ProgressSink::disabled())
            .await;
        assert!(matches!(result, Err(StoreError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_records_survive_reopen() {
        let dir = tempdir().unwrap();
        let record = {
            let store = test_store(&dir).await;
            upload_and_record(&store, "1-0-keep.png", "keep.png").await
        };

        let reopened = test_store(&dir).await;
        let listed = reopened.list_records().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, record.id);
    }

    #[tokio::test]
    async fn test_upload_reports_progress_in_chunks() {
        let dir = tempdir().unwrap();
        let store = test_store(&dir).await;

        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let sink = ProgressSink::new("1-0-big.png", tx);
        let data = Bytes::from(vec![0u8; UPLOAD_CHUNK_BYTES * 2 + 1]);

        store.upload("1-0-big.png", "image/png", data, sink).await.unwrap();

        let mut percents = Vec::new();
        while let Ok(event) = rx.try_recv() {
            percents.push(event.percent);
        }
        assert_eq!(percents.last(), Some(&100));
        assert!(percents.len() >= 3);
        assert!(percents.windows(2).all(|w| w[0] <= w[1]));
    }
}
