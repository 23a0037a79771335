//! Picdrop Services Library
//!
//! Upload orchestration and gallery state on top of a [`RemoteStore`]:
//! per-file upload tasks, the settle-all batch orchestrator with progress
//! tracking, gallery reconciliation, and the `ShareService` facade that
//! ties them together behind user-facing notifications.
//!
//! [`RemoteStore`]: picdrop_storage::RemoteStore

pub mod gallery;
pub mod notify;
pub mod service;
pub mod upload;

// Re-export commonly used types
pub use gallery::GalleryState;
pub use notify::{Notify, TracingNotifier};
pub use service::ShareService;
pub use upload::{UploadError, UploadOrchestrator, UploadTask};
