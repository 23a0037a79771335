//! In-memory store implementation.
//!
//! Backend used by tests and wiring checks: objects in a map, records in a
//! vector, plus an upload-attempt counter so tests can assert that rejected
//! files never reach the store.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use picdrop_core::models::{ImageRecord, NewImageRecord};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::progress::ProgressSink;
use crate::store::{RemoteStore, StoreError, StoreResult};
use crate::UPLOAD_CHUNK_BYTES;

#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<HashMap<String, Bytes>>,
    records: Mutex<Vec<ImageRecord>>,
    upload_attempts: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of upload calls received, including failed ones.
    pub fn upload_attempts(&self) -> usize {
        self.upload_attempts.load(Ordering::Relaxed)
    }

    pub async fn object_count(&self) -> usize {
        self.objects.lock().await.len()
    }

    pub async fn contains_object(&self, storage_key: &str) -> bool {
        self.objects.lock().await.contains_key(storage_key)
    }

    pub async fn record_count(&self) -> usize {
        self.records.lock().await.len()
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
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
        self.upload_attempts.fetch_add(1, Ordering::Relaxed);

        let total = data.len() as u64;
        let mut sent: u64 = 0;
        for chunk in data.chunks(UPLOAD_CHUNK_BYTES) {
            sent += chunk.len() as u64;
            progress.report(sent, total);
        }
        if total == 0 {
            progress.report(0, 0);
        }

        self.objects
            .lock()
            .await
            .insert(storage_key.to_string(), data);

        Ok(storage_key.to_string())
    }

    fn public_url(&self, path: &str) -> String {
        format!("memory://images/{}", path)
    }

    async fn insert_record(&self, record: NewImageRecord) -> StoreResult<ImageRecord> {
        let inserted = ImageRecord {
            id: Uuid::new_v4(),
            url: record.url,
            filename: record.filename,
            storage_key: record.storage_key,
            created_at: Utc::now(),
        };
        self.records.lock().await.push(inserted.clone());
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
        drop(records);

        self.objects.lock().await.remove(&removed.storage_key);
        Ok(())
    }

    async fn delete_all_records(&self) -> StoreResult<()> {
        let removed: Vec<ImageRecord> = std::mem::take(&mut *self.records.lock().await);
        let mut objects = self.objects.lock().await;
        for record in &removed {
            objects.remove(&record.storage_key);
        }
        Ok(())
    }
}
