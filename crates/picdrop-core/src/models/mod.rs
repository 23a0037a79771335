//! Domain models

pub mod record;
pub mod upload;

pub use record::{ImageRecord, NewImageRecord};
pub use upload::{BatchOutcome, FileInput, UploadStatus};
