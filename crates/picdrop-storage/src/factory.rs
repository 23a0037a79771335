//! Store construction from configuration.

use picdrop_core::{Config, StoreBackend};
use std::sync::Arc;

use crate::{LocalStore, MemoryStore, RemoteStore, StoreError, StoreResult, SupabaseStore};

/// Create a remote store based on configuration.
///
/// Missing Supabase credentials are not an error here: the store constructs
/// and reports `is_configured() == false`, so callers can show their
/// connection-required notice instead of failing at startup. The local
/// backend needs its directory and base URL up front.
pub async fn create_store(config: &Config) -> StoreResult<Arc<dyn RemoteStore>> {
    match config.store_backend {
        StoreBackend::Supabase => {
            let store = SupabaseStore::new(
                config.supabase_url.clone().unwrap_or_default(),
                config.supabase_anon_key.clone().unwrap_or_default(),
                config.supabase_bucket.clone(),
                config.supabase_table.clone(),
            )?;
            Ok(Arc::new(store))
        }

        StoreBackend::Local => {
            let base_path = config.local_storage_path.clone().ok_or_else(|| {
                StoreError::ConfigError("PICDROP_LOCAL_STORAGE_PATH not configured".to_string())
            })?;
            let base_url = config.local_storage_base_url.clone().ok_or_else(|| {
                StoreError::ConfigError("PICDROP_LOCAL_STORAGE_BASE_URL not configured".to_string())
            })?;

            let store = LocalStore::new(base_path, base_url).await?;
            Ok(Arc::new(store))
        }

        StoreBackend::Memory => Ok(Arc::new(MemoryStore::new())),
    }
}
