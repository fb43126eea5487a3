//! In-process key-value store for unit and integration tests
//!
//! [`MemoryStore`] implements the full [`KeyValueStore`] trait over a plain
//! hash map, so tests can drive the history store without touching disk.
//! Write failures can be injected with [`MemoryStore::fail_writes`] to
//! exercise the error paths a real platform store produces when it runs out
//! of space or loses access to its directory.
//!
//! # Example
//!
//! ```
//! use coachlog::storage::{KeyValueStore, MemoryStore, WriteFailure};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let store = MemoryStore::new();
//! store.set("k", "v").await.unwrap();
//! assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
//!
//! store.fail_writes(Some(WriteFailure::Full));
//! assert!(store.set("k", "v2").await.is_err());
//! # }
//! ```

use crate::error::{CoachlogError, Result};
use crate::storage::KeyValueStore;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// Kind of write failure to inject into a [`MemoryStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteFailure {
    /// Writes fail as if the platform store were out of space.
    Full,
    /// Writes fail as if access to the store had been revoked.
    Denied,
}

/// In-memory [`KeyValueStore`] with injectable write failures.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    fail_writes: Mutex<Option<WriteFailure>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write (set and remove) fail with the given
    /// failure kind; pass `None` to restore normal operation.
    pub fn fail_writes(&self, failure: Option<WriteFailure>) {
        *self.fail_writes.lock().expect("poisoned lock") = failure;
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.lock().expect("poisoned lock").len()
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn injected_failure(&self, key: &str) -> Option<CoachlogError> {
        match *self.fail_writes.lock().expect("poisoned lock") {
            Some(WriteFailure::Full) => Some(CoachlogError::StorageFull(format!(
                "injected write failure for {}",
                key
            ))),
            Some(WriteFailure::Denied) => Some(CoachlogError::PermissionDenied(format!(
                "injected write failure for {}",
                key
            ))),
            None => None,
        }
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().expect("poisoned lock").get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        if let Some(err) = self.injected_failure(key) {
            return Err(err.into());
        }
        self.entries
            .lock()
            .expect("poisoned lock")
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        if let Some(err) = self.injected_failure(key) {
            return Err(err.into());
        }
        self.entries.lock().expect("poisoned lock").remove(key);
        Ok(())
    }
}
