//! Session Storage
//!
//! Tab-scoped key-value storage, injected so tests and headless front ends
//! can use memory instead of the browser's `sessionStorage`.

use std::cell::RefCell;
use std::collections::HashMap;

/// Storage error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Quota exceeded writing {key}")]
    QuotaExceeded { key: String },
}

/// Session-scoped string store
pub trait SessionStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-memory session store
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RefCell<HashMap<String, String>>,
    /// Maximum total bytes of keys and values, if limited
    quota: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that refuses writes beyond `bytes` of keys plus values
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            items: RefCell::default(),
            quota: Some(bytes),
        }
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    /// Drop everything (the tab closed)
    pub fn clear(&self) {
        self.items.borrow_mut().clear();
    }

    fn used_without(&self, key: &str) -> usize {
        self.items
            .borrow()
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if let Some(quota) = self.quota {
            if self.used_without(key) + key.len() + value.len() > quota {
                return Err(StoreError::QuotaExceeded { key: key.to_string() });
            }
        }
        self.items.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }
}
