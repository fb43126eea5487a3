//! Key-value persistence for chat history
//!
//! Everything the application persists (session records, the recency
//! index, the active-session marker, the config blob, the response cache)
//! goes through the [`KeyValueStore`] trait as string-keyed JSON values.
//! [`SledStore`] is the durable implementation backed by an embedded `sled`
//! database; [`MemoryStore`] is an in-process implementation for tests and
//! ephemeral sessions.

use crate::error::{CoachlogError, Result};
use async_trait::async_trait;
use directories::ProjectDirs;
use sled::Db;
use std::path::PathBuf;

pub mod memory;
pub use memory::{MemoryStore, WriteFailure};

/// Key under which the recency-ordered index of session ids is stored.
pub const CHAT_INDEX_KEY: &str = "chat_index";

/// Key tracking the active session across restarts (scalar string value).
pub const CURRENT_CHAT_KEY: &str = "current_chat_id";

/// Key holding the serialized [`ChatConfig`](crate::config::ChatConfig) blob.
pub const CHAT_CONFIG_KEY: &str = "chat_config";

/// Key holding the serialized response-cache map.
pub const RESPONSE_CACHE_KEY: &str = "response_cache";

/// Storage key for a single session record.
///
/// # Examples
///
/// ```
/// use coachlog::storage::session_key;
///
/// assert_eq!(session_key("abc"), "chat_sessions_abc");
/// ```
pub fn session_key(id: &str) -> String {
    format!("chat_sessions_{}", id)
}

/// Generic durable key-value store
///
/// The contract is small: string keys, string (JSON) values, and no
/// transactionality across keys. Callers that write multiple keys must
/// order their writes so a partial failure leaves the store recoverable.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, or `None` if absent.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Durably write `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`CoachlogError::StorageFull`] when the platform rejects the
    /// write.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key` if present. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}

/// Durable key-value store backed by an embedded `sled` database
///
/// # Examples
///
/// ```no_run
/// use coachlog::storage::SledStore;
///
/// # fn main() -> coachlog::error::Result<()> {
/// let store = SledStore::new_with_path("/tmp/coachlog/history.db")?;
/// # Ok(())
/// # }
/// ```
pub struct SledStore {
    db: Db,
}

impl SledStore {
    /// Open the store in the user's platform data directory.
    ///
    /// The directory can be overridden with the `COACHLOG_DATA_DIR`
    /// environment variable, which makes it easy to point the binary at a
    /// test directory without changing the application data dir.
    pub fn new() -> Result<Self> {
        if let Ok(override_dir) = std::env::var("COACHLOG_DATA_DIR") {
            return Self::new_in_dir(PathBuf::from(override_dir));
        }

        let proj_dirs = ProjectDirs::from("com", "coachlog", "coachlog").ok_or_else(|| {
            CoachlogError::Storage("Could not determine data directory".to_string())
        })?;

        Self::new_in_dir(proj_dirs.data_dir().to_path_buf())
    }

    /// Open the store inside `dir`, creating the directory if needed.
    pub fn new_in_dir<P: Into<PathBuf>>(dir: P) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| dir_error(&dir, e))?;
        Self::new_with_path(dir.join("history.db"))
    }

    /// Open the store at the exact database path.
    ///
    /// This is primarily useful for tests where the default application
    /// data directory is not desirable (for example, a temporary directory).
    pub fn new_with_path<P: Into<PathBuf>>(path: P) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| dir_error(parent, e))?;
        }

        let db = sled::open(&path).map_err(|e| open_error(&path, e))?;
        Ok(Self { db })
    }
}

fn dir_error(path: &std::path::Path, e: std::io::Error) -> CoachlogError {
    if e.kind() == std::io::ErrorKind::PermissionDenied {
        CoachlogError::PermissionDenied(format!("{}: {}", path.display(), e))
    } else {
        CoachlogError::Storage(format!("Failed to create {}: {}", path.display(), e))
    }
}

fn open_error(path: &std::path::Path, e: sled::Error) -> CoachlogError {
    match &e {
        sled::Error::Io(io) if io.kind() == std::io::ErrorKind::PermissionDenied => {
            CoachlogError::PermissionDenied(format!("{}: {}", path.display(), e))
        }
        _ => CoachlogError::Storage(format!("Failed to open database at {}: {}", path.display(), e)),
    }
}

#[async_trait]
impl KeyValueStore for SledStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        match self
            .db
            .get(key.as_bytes())
            .map_err(|e| CoachlogError::Storage(format!("Get failed for {}: {}", key, e)))?
        {
            Some(bytes) => {
                let value = String::from_utf8(bytes.to_vec()).map_err(|e| {
                    CoachlogError::CorruptedData(format!("Non-UTF8 value under {}: {}", key, e))
                })?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.db
            .insert(key.as_bytes(), value.as_bytes())
            .map_err(|e| CoachlogError::StorageFull(format!("Write rejected for {}: {}", key, e)))?;

        self.db
            .flush_async()
            .await
            .map_err(|e| CoachlogError::StorageFull(format!("Flush failed for {}: {}", key, e)))?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.db
            .remove(key.as_bytes())
            .map_err(|e| CoachlogError::Storage(format!("Remove failed for {}: {}", key, e)))?;

        self.db
            .flush_async()
            .await
            .map_err(|e| CoachlogError::Storage(format!("Flush failed for {}: {}", key, e)))?;

        Ok(())
    }
}
