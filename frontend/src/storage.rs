use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use tracing::{debug, warn};

use crate::error::StorageError;

/// String key-value storage that survives the session, e.g. `localStorage`.
///
/// Methods take `&self`: browser storage is a shared handle, and the
/// preference store only ever runs on one thread.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Rc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// In-memory store with an optional byte quota, counted over keys and values
/// the way browsers count `localStorage` usage. While offline every access
/// fails, as storage does when the browser blocks it.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
    quota: Option<usize>,
    offline: Cell<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: usize) -> Self {
        MemoryStore {
            entries: RefCell::new(HashMap::new()),
            quota: Some(quota),
            offline: Cell::new(false),
        }
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.set(offline);
    }

    fn check_online(&self) -> Result<(), StorageError> {
        if self.offline.get() {
            Err(StorageError::Unavailable("storage offline".to_string()))
        } else {
            Ok(())
        }
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.borrow().contains_key(key)
    }

    fn used_bytes_without(&self, key: &str) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check_online()?;
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_online()?;
        if let Some(quota) = self.quota {
            if self.used_bytes_without(key) + key.len() + value.len() > quota {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                });
            }
        }
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.check_online()?;
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// Reads `key` and parses it, falling back to `default` when the entry is
/// missing, unreadable or rejected by `parse`. Never fails.
pub fn resolve_or_default<S, T, F>(store: &S, key: &str, default: T, parse: F) -> T
where
    S: KeyValueStore + ?Sized,
    F: FnOnce(&str) -> Option<T>,
{
    match store.get(key) {
        Ok(Some(raw)) => match parse(&raw) {
            Some(value) => value,
            None => {
                debug!(key, raw = %raw, "malformed persisted value, using default");
                default
            }
        },
        Ok(None) => default,
        Err(err) => {
            warn!(key, error = %err, "could not read persisted value, using default");
            default
        }
    }
}
