//! Picdrop Storage Library
//!
//! This crate provides the `RemoteStore` abstraction and its implementations.
//! A remote store is the single external collaborator of the system: an
//! object store paired with an image-record table.
//!
//! # Storage key format
//!
//! Keys are `{unix_millis}-{sequence}-{sanitized_filename}`. The sequence is
//! a per-process monotonic counter, so keys generated inside one concurrent
//! batch never collide even within the same millisecond. Keys must not
//! contain `..` or a leading `/`. Key generation is centralized in the
//! `keys` module so all backends stay consistent.

pub mod factory;
pub mod keys;
pub mod local;
pub mod memory;
pub mod progress;
pub mod store;
pub mod supabase;

// Re-export commonly used types
pub use factory::create_store;
pub use keys::generate_storage_key;
pub use local::LocalStore;
pub use memory::MemoryStore;
pub use progress::{ProgressEvent, ProgressSink};
pub use store::{RemoteStore, StoreError, StoreResult};
pub use supabase::SupabaseStore;

/// Chunk size for progress-reporting transfers.
pub(crate) const UPLOAD_CHUNK_BYTES: usize = 64 * 1024;
