//! Upload-and-share facade.
//!
//! Ties the orchestrator, gallery, and notifications together into the
//! operations a frontend calls: batch upload, refresh, single delete, and
//! bulk delete. Every failure path pairs an error return with a
//! user-visible notice, and no operation can corrupt unrelated in-flight
//! state.

use picdrop_core::models::{BatchOutcome, FileInput};
use picdrop_core::AppError;
use picdrop_storage::RemoteStore;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::gallery::GalleryState;
use crate::notify::Notify;
use crate::upload::UploadOrchestrator;

const CONNECT_NOTICE: &str = "Please connect your storage backend first";

pub struct ShareService {
    store: Arc<dyn RemoteStore>,
    orchestrator: UploadOrchestrator,
    gallery: GalleryState,
    notifier: Arc<dyn Notify>,
}

impl ShareService {
    pub fn new(
        store: Arc<dyn RemoteStore>,
        notifier: Arc<dyn Notify>,
        max_file_size_bytes: usize,
    ) -> Self {
        let orchestrator = UploadOrchestrator::new(Arc::clone(&store), max_file_size_bytes);
        ShareService {
            store,
            orchestrator,
            gallery: GalleryState::new(),
            notifier,
        }
    }

    pub fn gallery(&self) -> &GalleryState {
        &self.gallery
    }

    pub fn progress_snapshot(&self) -> HashMap<String, u8> {
        self.orchestrator.progress_snapshot()
    }

    /// Upload a batch of files and reconcile the gallery.
    ///
    /// The gallery refresh runs whether the batch fully succeeded, partly
    /// failed, or fully failed: some files may have landed either way. A
    /// refresh failure is notified but does not fail the batch.
    pub async fn upload_batch(&mut self, files: Vec<FileInput>) -> Result<BatchOutcome, AppError> {
        if !self.store.is_configured() {
            self.notifier.error(CONNECT_NOTICE);
            return Err(AppError::ConfigurationMissing(CONNECT_NOTICE.to_string()));
        }

        if files.is_empty() {
            return Ok(BatchOutcome::default());
        }

        let count = files.len();
        self.notifier.info(&format!(
            "Uploading {} {}...",
            count,
            if count == 1 { "image" } else { "images" }
        ));

        let outcome = self.orchestrator.run_batch(files).await;

        if outcome.all_succeeded() {
            self.notifier.success(&outcome.summary());
        } else {
            self.notifier.error(&outcome.summary());
        }

        if let Err(err) = self.gallery.refresh(self.store.as_ref()).await {
            tracing::error!(error = %err, "Gallery refresh after batch failed");
            self.notifier.error("Failed to load images");
        }

        Ok(outcome)
    }

    /// Re-fetch the gallery listing. Quiet no-op when unconfigured, so a
    /// frontend can call this on startup before connection setup.
    pub async fn refresh_gallery(&mut self) -> Result<(), AppError> {
        if !self.store.is_configured() {
            return Ok(());
        }

        match self.gallery.refresh(self.store.as_ref()).await {
            Ok(_) => Ok(()),
            Err(err) => {
                tracing::error!(error = %err, "Failed to fetch image records");
                self.notifier.error("Failed to load images");
                Err(err)
            }
        }
    }

    /// Delete one image remotely, then drop it from local state.
    ///
    /// Local removal is optimistic (no full re-fetch) to keep single-item
    /// deletion responsive; the next refresh is authoritative either way.
    pub async fn delete_image(&mut self, id: Uuid) -> Result<(), AppError> {
        match self.store.delete_record(id).await {
            Ok(()) => {
                self.gallery.remove_local(id);
                self.notifier.success("Image deleted successfully");
                Ok(())
            }
            Err(err) => {
                tracing::error!(error = %err, id = %id, "Failed to delete image");
                self.notifier.error("Failed to delete image");
                Err(err.into())
            }
        }
    }

    /// Delete every image. Local state is cleared only after the remote
    /// bulk delete reports success; on failure it is left untouched.
    pub async fn delete_all(&mut self) -> Result<(), AppError> {
        match self.store.delete_all_records().await {
            Ok(()) => {
                self.gallery.clear_local();
                self.notifier.success("All images deleted successfully");
                Ok(())
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to delete all images");
                self.notifier.error("Failed to delete all images");
                Err(err.into())
            }
        }
    }
}
