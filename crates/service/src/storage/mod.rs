//! Key/value storage.
//!
//! [`KvStore`] is the synchronous string-to-string backend (in memory or a
//! JSON file); [`Storage`] layers JSON values, prefix listing, credentials
//! and one-shot messages on top of it.

pub mod file_store;
pub mod helper;
pub mod memory;

pub use file_store::FileStore;
pub use helper::Storage;
pub use memory::MemoryStore;

use crate::errors::StorageError;

/// Synchronous string key/value backend.
pub trait KvStore: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
    /// All keys; order is unspecified.
    fn keys(&self) -> Vec<String>;
}
