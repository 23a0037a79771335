//! Multi-file upload pipeline
//!
//! One [`UploadTask`] per submitted file handles validation and the
//! upload-then-record sequence; the [`UploadOrchestrator`] runs a whole
//! batch concurrently with settle-all semantics and aggregates the result.

pub mod orchestrator;
pub mod task;

pub use orchestrator::UploadOrchestrator;
pub use task::{UploadError, UploadTask};
