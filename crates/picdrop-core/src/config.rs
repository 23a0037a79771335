//! Configuration module
//!
//! Environment-driven configuration for backend selection and upload limits.
//! The CLI loads `.env` via dotenvy before calling [`Config::from_env`];
//! library consumers may construct [`Config`] directly.

use std::env;

use crate::constants::MAX_UPLOAD_BYTES;

/// Which remote store backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Supabase-style HTTP backend (object storage + table API).
    Supabase,
    /// Local filesystem backend, for development.
    Local,
    /// In-memory backend, for tests and wiring checks.
    Memory,
}

impl StoreBackend {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "supabase" => Some(StoreBackend::Supabase),
            "local" => Some(StoreBackend::Local),
            "memory" => Some(StoreBackend::Memory),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub store_backend: StoreBackend,
    // Supabase backend
    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,
    pub supabase_bucket: String,
    pub supabase_table: String,
    // Local backend
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    // Upload limits
    pub max_file_size_bytes: usize,
}

impl Config {
    /// Build configuration from environment variables.
    ///
    /// `PICDROP_STORE_BACKEND` selects the backend (`supabase`, `local`,
    /// `memory`; default `supabase`). Unset backend credentials are not an
    /// error here; they surface later through `RemoteStore::is_configured`.
    pub fn from_env() -> Self {
        let store_backend = env::var("PICDROP_STORE_BACKEND")
            .ok()
            .and_then(|v| StoreBackend::parse(&v))
            .unwrap_or(StoreBackend::Supabase);

        let max_file_size_bytes = env::var("PICDROP_MAX_FILE_SIZE_MB")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .map(|mb| mb * 1024 * 1024)
            .unwrap_or(MAX_UPLOAD_BYTES);

        Config {
            store_backend,
            supabase_url: env::var("SUPABASE_URL").ok().filter(|v| !v.is_empty()),
            supabase_anon_key: env::var("SUPABASE_ANON_KEY").ok().filter(|v| !v.is_empty()),
            supabase_bucket: env::var("PICDROP_BUCKET").unwrap_or_else(|_| "images".to_string()),
            supabase_table: env::var("PICDROP_TABLE").unwrap_or_else(|_| "images".to_string()),
            local_storage_path: env::var("PICDROP_LOCAL_STORAGE_PATH").ok(),
            local_storage_base_url: env::var("PICDROP_LOCAL_STORAGE_BASE_URL").ok(),
            max_file_size_bytes,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            store_backend: StoreBackend::Memory,
            supabase_url: None,
            supabase_anon_key: None,
            supabase_bucket: "images".to_string(),
            supabase_table: "images".to_string(),
            local_storage_path: None,
            local_storage_base_url: None,
            max_file_size_bytes: MAX_UPLOAD_BYTES,
        }
    }
}
