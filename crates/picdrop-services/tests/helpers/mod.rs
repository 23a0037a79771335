//! Shared test helpers: file fixtures, a failure-injecting store wrapper,
//! and a notifier that records what the user would have seen.

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use picdrop_core::models::{FileInput, ImageRecord, NewImageRecord};
use picdrop_services::Notify;
use picdrop_storage::{MemoryStore, ProgressSink, RemoteStore, StoreError, StoreResult};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

pub fn jpeg_file(name: &str, size: usize) -> FileInput {
    FileInput::new(name, "image/jpeg", vec![0u8; size])
}

pub fn png_file(name: &str, size: usize) -> FileInput {
    FileInput::new(name, "image/png", vec![0u8; size])
}

pub fn text_file(name: &str, size: usize) -> FileInput {
    FileInput::new(name, "text/plain", vec![0u8; size])
}

pub async fn seed_records(store: &dyn RemoteStore, names: &[&str]) -> Vec<ImageRecord> {
    let mut records = Vec::with_capacity(names.len());
    for name in names {
        let record = store
            .insert_record(NewImageRecord {
                url: store.public_url(name),
                filename: name.to_string(),
                storage_key: name.to_string(),
            })
            .await
            .unwrap();
        records.push(record);
    }
    records
}

/// Memory-backed store with injectable failures, for exercising the
/// partial-failure and guarded-clear paths.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    fail_uploads_matching: Option<String>,
    fail_bulk_delete: bool,
    unconfigured: bool,
    upload_attempts: AtomicUsize,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail uploads whose storage key contains `pattern` with a transport error.
    pub fn failing_uploads_matching(pattern: &str) -> Self {
        FlakyStore {
            fail_uploads_matching: Some(pattern.to_string()),
            ..Self::default()
        }
    }

    /// Fail `delete_all_records` with a permission error.
    pub fn failing_bulk_delete() -> Self {
        FlakyStore {
            fail_bulk_delete: true,
            ..Self::default()
        }
    }

    /// Report `is_configured() == false`.
    pub fn unconfigured() -> Self {
        FlakyStore {
            unconfigured: true,
            ..Self::default()
        }
    }

    /// Upload calls received, including injected failures.
    pub fn upload_attempts(&self) -> usize {
        self.upload_attempts.load(Ordering::Relaxed)
    }

    pub async fn record_count(&self) -> usize {
        self.inner.record_count().await
    }
}

#[async_trait]
impl RemoteStore for FlakyStore {
    fn is_configured(&self) -> bool {
        !self.unconfigured
    }

    async fn upload(
        &self,
        storage_key: &str,
        content_type: &str,
        data: Bytes,
        progress: ProgressSink,
    ) -> StoreResult<String> {
        self.upload_attempts.fetch_add(1, Ordering::Relaxed);

        if let Some(pattern) = &self.fail_uploads_matching {
            if storage_key.contains(pattern) {
                return Err(StoreError::UploadFailed(
                    "injected transport failure".to_string(),
                ));
            }
        }

        self.inner.upload(storage_key, content_type, data, progress).await
    }

    fn public_url(&self, path: &str) -> String {
        self.inner.public_url(path)
    }

    async fn insert_record(&self, record: NewImageRecord) -> StoreResult<ImageRecord> {
        self.inner.insert_record(record).await
    }

    async fn list_records(&self) -> StoreResult<Vec<ImageRecord>> {
        self.inner.list_records().await
    }

    async fn delete_record(&self, id: Uuid) -> StoreResult<()> {
        self.inner.delete_record(id).await
    }

    async fn delete_all_records(&self) -> StoreResult<()> {
        if self.fail_bulk_delete {
            return Err(StoreError::DeleteFailed(
                "permission denied for table images".to_string(),
            ));
        }
        self.inner.delete_all_records().await
    }
}

/// Notifier that records every notice, in order, as "level: message".
#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .map(|m| m.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    pub fn errors(&self) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter(|m| m.starts_with("error: "))
            .collect()
    }

    fn push(&self, level: &str, message: &str) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(format!("{}: {}", level, message));
        }
    }
}

impl Notify for RecordingNotifier {
    fn success(&self, message: &str) {
        self.push("success", message);
    }

    fn error(&self, message: &str) {
        self.push("error", message);
    }

    fn info(&self, message: &str) {
        self.push("info", message);
    }
}
