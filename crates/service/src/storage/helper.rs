use std::collections::BTreeSet;

use common::{LogLevel, Logger};
use serde::{de::DeserializeOwned, Serialize};

use super::{KvStore, MemoryStore};
use crate::errors::StorageError;

pub const USER_KEY: &str = "user";
pub const SECRET_KEY: &str = "secret";
pub const SNACK_KEY: &str = "snack";

/// Storage helper over a [`KvStore`] backend.
///
/// Failures of the JSON helpers are reported through the `warn` logger handed
/// in at construction (label `main` by default).
pub struct Storage<S: KvStore = MemoryStore> {
    backend: S,
    warn: Logger,
}

impl<S: KvStore> Storage<S> {
    pub fn new(backend: S) -> Self {
        Self::with_logger(backend, Logger::new(LogLevel::Warn, "main"))
    }

    pub fn with_logger(backend: S, warn: Logger) -> Self {
        Self { backend, warn }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.backend.get_item(key)
    }

    pub fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.backend.set_item(key, value)
    }

    pub fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.backend.remove_item(key)
    }

    /// Parse the stored value. `Ok(None)` when the key is absent.
    pub fn try_get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let Some(raw) = self.backend.get_item(key) else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StorageError::Deserialize { key: key.to_string(), source })
    }

    /// Parsed value, or `None` when the key is absent or its value corrupt.
    /// Corrupt values are logged.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.try_get_json(key) {
            Ok(value) => value,
            Err(e) => {
                self.warn.log(format_args!("Getting \"{key}\" from storage failed: {e}"));
                None
            }
        }
    }

    /// Serialize and store `value`. Nothing is written when serialization
    /// fails; the failure is logged and returned.
    pub fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let result = serde_json::to_string(value)
            .map_err(StorageError::Serialize)
            .and_then(|raw| self.backend.set_item(key, &raw));
        if let Err(e) = &result {
            self.warn.log(format_args!("Saving \"{key}\" to storage failed: {e}"));
        }
        result
    }

    pub fn delete_json(&self, key: &str) -> Result<(), StorageError> {
        self.delete(key)
    }

    /// Keys starting with `prefix`, in backend order.
    pub fn list_keys(&self, prefix: &str) -> Vec<String> {
        self.list_keys_with(prefix, str::to_string)
    }

    pub fn list_keys_with<T, F>(&self, prefix: &str, convert: F) -> Vec<T>
    where
        F: Fn(&str) -> T,
    {
        self.backend
            .keys()
            .iter()
            .filter(|key| key.starts_with(prefix))
            .map(|key| convert(key.as_str()))
            .collect()
    }

    /// Distinct ids (second `_` segment) of the keys starting with `prefix`.
    /// Keys without a second segment are skipped.
    pub fn list_ids(&self, prefix: &str) -> BTreeSet<String> {
        self.list_keys_with(prefix, |key| key.split('_').nth(1).map(str::to_string))
            .into_iter()
            .flatten()
            .collect()
    }

    pub fn set_credential(&self, user: &str, secret: &str) -> Result<(), StorageError> {
        self.set(USER_KEY, user)?;
        self.set(SECRET_KEY, secret)
    }

    pub fn get_credential(&self) -> Option<String> {
        self.get(SECRET_KEY)
    }

    /// Removes the secret only; the stored user name stays.
    pub fn delete_credential(&self) -> Result<(), StorageError> {
        self.delete(SECRET_KEY)
    }

    pub fn add_snack(&self, message: &str) -> Result<(), StorageError> {
        self.set(SNACK_KEY, message)
    }

    /// Take the pending snack message, removing it from storage.
    pub fn pop_snack(&self) -> Option<String> {
        let message = self.get(SNACK_KEY)?;
        if let Err(e) = self.delete(SNACK_KEY) {
            self.warn.log(format_args!("Removing \"{SNACK_KEY}\" from storage failed: {e}"));
        }
        Some(message)
    }
}
