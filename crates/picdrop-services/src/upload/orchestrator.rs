//! Batch upload orchestration.
//!
//! Every file in a batch starts transferring immediately; the batch joins
//! with settle-all semantics, so one task's failure never cancels or blocks
//! the others. Progress events from all tasks drain into a shared map keyed
//! by storage key, which stays valid because keys are unique per task.

use futures::future::join_all;
use picdrop_core::models::{BatchOutcome, FileInput, ImageRecord};
use picdrop_storage::{ProgressSink, RemoteStore};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

use crate::upload::task::{UploadError, UploadTask};

type ProgressMap = Arc<Mutex<HashMap<String, u8>>>;

pub struct UploadOrchestrator {
    store: Arc<dyn RemoteStore>,
    max_file_size_bytes: usize,
    progress: ProgressMap,
}

impl UploadOrchestrator {
    pub fn new(store: Arc<dyn RemoteStore>, max_file_size_bytes: usize) -> Self {
        UploadOrchestrator {
            store,
            max_file_size_bytes,
            progress: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Current per-file progress, keyed by storage key. Reset at the start
    /// of each batch.
    pub fn progress_snapshot(&self) -> HashMap<String, u8> {
        self.progress
            .lock()
            .map(|map| map.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Run one batch of files to completion.
    ///
    /// All tasks are polled concurrently from the start; the method returns
    /// only when every task has reached a terminal state. Per-task failures
    /// are logged here and reflected in the counts, never itemized in the
    /// outcome. An empty batch is a no-op: no store calls, no progress.
    pub async fn run_batch(&self, files: Vec<FileInput>) -> BatchOutcome {
        if files.is_empty() {
            return BatchOutcome::default();
        }

        if let Ok(mut map) = self.progress.lock() {
            map.clear();
        }

        let (tx, mut rx) = mpsc::unbounded_channel();

        let mut tasks: Vec<UploadTask> = files.into_iter().map(UploadTask::new).collect();

        let task_futures: Vec<_> = tasks
            .iter_mut()
            .map(|task| {
                let sink = ProgressSink::new(task.storage_key().to_string(), tx.clone());
                let store = Arc::clone(&self.store);
                let max_size = self.max_file_size_bytes;
                async move {
                    let result = task.run(store.as_ref(), max_size, sink).await;
                    if let Err(err) = &result {
                        tracing::warn!(
                            filename = %task.file().filename,
                            key = %task.storage_key(),
                            error = %err,
                            "Upload task failed"
                        );
                    }
                    result
                }
            })
            .collect();

        // Only the per-task sinks keep the channel open; dropping this clone
        // lets the drain finish once every task is terminal.
        drop(tx);

        let progress = Arc::clone(&self.progress);
        let drain = async move {
            while let Some(event) = rx.recv().await {
                if let Ok(mut map) = progress.lock() {
                    map.insert(event.storage_key, event.percent);
                }
            }
        };

        let (results, ()) = tokio::join!(join_all(task_futures), drain);

        let outcome = Self::aggregate(&results);

        tracing::info!(
            success = outcome.success_count,
            failed = outcome.failure_count,
            "Upload batch settled"
        );

        outcome
    }

    fn aggregate(results: &[Result<ImageRecord, UploadError>]) -> BatchOutcome {
        let success_count = results.iter().filter(|r| r.is_ok()).count();
        BatchOutcome {
            success_count,
            failure_count: results.len() - success_count,
        }
    }
}
