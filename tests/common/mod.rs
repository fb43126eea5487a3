//! Shared helpers for integration tests

#![allow(dead_code)]

use coachlog::storage::{KeyValueStore, SledStore};
use coachlog::{ChatHistoryStore, ConfigManager};
use std::sync::Arc;
use tempfile::TempDir;

/// Service graph over a sled store in a temporary directory.
///
/// The tempdir is kept alive for the lifetime of the struct so the
/// database files are not removed under the test.
pub struct TestServices {
    pub kv: Arc<dyn KeyValueStore>,
    pub history: Arc<ChatHistoryStore>,
    pub config: Arc<ConfigManager>,
    _dir: TempDir,
}

/// Builds an initialized service graph backed by a fresh sled database.
pub async fn sled_services() -> TestServices {
    let dir = TempDir::new().expect("failed to create temp dir");
    let kv: Arc<dyn KeyValueStore> = Arc::new(
        SledStore::new_with_path(dir.path().join("history.db")).expect("failed to open store"),
    );
    let config = Arc::new(ConfigManager::new(kv.clone()));
    let history = Arc::new(ChatHistoryStore::new(kv.clone(), config.clone()));
    history.initialize().await.expect("initialize failed");

    TestServices {
        kv,
        history,
        config,
        _dir: dir,
    }
}
