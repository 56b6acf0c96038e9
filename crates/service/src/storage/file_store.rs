use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use tracing::warn;

use super::KvStore;
use crate::errors::StorageError;

/// JSON file-backed key/value backend.
///
/// Keeps the whole map in memory and rewrites the file after every change.
/// A change only becomes visible once the file write succeeded.
/// Intended for the handful of small entries a client keeps between runs.
#[derive(Debug)]
pub struct FileStore {
    inner: RwLock<HashMap<String, String>>,
    file_path: PathBuf,
}

impl FileStore {
    /// Open the store at `path`. Creates the file with an empty map if
    /// missing; a file that does not hold a JSON map is loaded as empty.
    pub fn open<P: Into<PathBuf>>(path: P) -> Result<Self, StorageError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).ok();
        }

        let map: HashMap<String, String> = match fs::read(&file_path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                warn!(path = %file_path.display(), error = %e, "storage file unreadable; starting empty");
                HashMap::new()
            }),
            Err(_) => {
                let empty: HashMap<String, String> = HashMap::new();
                fs::write(&file_path, serde_json::to_vec(&empty).map_err(StorageError::Serialize)?)?;
                empty
            }
        };

        Ok(Self { inner: RwLock::new(map), file_path })
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    fn save(&self, map: &HashMap<String, String>) -> Result<(), StorageError> {
        let data = serde_json::to_vec(map).map_err(StorageError::Serialize)?;
        fs::write(&self.file_path, data)?;
        Ok(())
    }
}

impl KvStore for FileStore {
    fn get_item(&self, key: &str) -> Option<String> {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        map.get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = map.clone();
        next.insert(key.to_string(), value.to_string());
        self.save(&next)?;
        *map = next;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if !map.contains_key(key) {
            return Ok(());
        }
        let mut next = map.clone();
        next.remove(key);
        self.save(&next)?;
        *map = next;
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        map.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path() -> PathBuf {
        std::env::temp_dir().join(format!("file_store_{}.json", uuid::Uuid::new_v4()))
    }

    #[test]
    fn file_store_crud_persists() -> Result<(), anyhow::Error> {
        let tmp = temp_path();
        let store = FileStore::open(&tmp)?;

        // initially empty
        assert!(store.keys().is_empty());

        store.set_item("a", "1")?;
        store.set_item("b", "2")?;
        assert_eq!(store.get_item("a").as_deref(), Some("1"));

        // overwrite, remove, reload from disk
        store.set_item("a", "10")?;
        store.remove_item("b")?;
        let reloaded = FileStore::open(&tmp)?;
        assert_eq!(reloaded.keys(), vec!["a".to_string()]);
        assert_eq!(reloaded.get_item("a").as_deref(), Some("10"));

        let _ = fs::remove_file(&tmp);
        Ok(())
    }

    #[test]
    fn corrupt_file_loads_empty() -> Result<(), anyhow::Error> {
        let tmp = temp_path();
        fs::write(&tmp, b"{not json")?;
        let store = FileStore::open(&tmp)?;
        assert!(store.keys().is_empty());

        store.set_item("k", "v")?;
        assert_eq!(FileStore::open(&tmp)?.get_item("k").as_deref(), Some("v"));

        let _ = fs::remove_file(&tmp);
        Ok(())
    }

    #[test]
    fn failed_write_leaves_map_unchanged() -> Result<(), anyhow::Error> {
        let dir = std::env::temp_dir().join(format!("file_store_dir_{}", uuid::Uuid::new_v4()));
        let store = FileStore::open(dir.join("storage.json"))?;
        store.set_item("kept", "1")?;

        fs::remove_dir_all(&dir)?;
        assert!(matches!(store.set_item("k", "v"), Err(StorageError::Io(_))));
        assert_eq!(store.get_item("k"), None);
        assert!(store.remove_item("kept").is_err());
        assert_eq!(store.get_item("kept").as_deref(), Some("1"));
        assert_eq!(store.keys(), vec!["kept".to_string()]);
        Ok(())
    }
}
