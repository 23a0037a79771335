use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A persisted row describing one uploaded image.
///
/// Immutable once created; destroyed only via explicit delete. The backend
/// assigns `id` and `created_at` on insert. `storage_key` references the
/// stored object so record deletion can pair with object deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub id: Uuid,
    pub url: String,
    pub filename: String,
    pub storage_key: String,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a new image record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewImageRecord {
    pub url: String,
    pub filename: String,
    pub storage_key: String,
}
