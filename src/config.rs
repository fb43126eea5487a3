//! Chat configuration management
//!
//! This module holds the tunable limits of the history store and search
//! index. The configuration is persisted as a single JSON blob through the
//! key-value store and loaded lazily: a missing or unreadable blob never
//! fails the caller, it just falls back to defaults so the application can
//! always start.

use crate::error::{CoachlogError, Result};
use crate::storage::{KeyValueStore, CHAT_CONFIG_KEY};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Tunable limits for chat history and search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Maximum sessions shown in the drawer listing
    #[serde(default = "default_max_chats_in_drawer")]
    pub max_chats_in_drawer: usize,

    /// Hard cap on retained sessions; older sessions are evicted
    #[serde(default = "default_max_chat_history")]
    pub max_chat_history: usize,

    /// Debounce applied to search-as-you-type input (milliseconds)
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,

    /// Delay between the last edit and the automatic save (milliseconds)
    #[serde(default = "default_auto_save_interval_ms")]
    pub auto_save_interval_ms: u64,

    /// Whether the fuzzy search index is built at all
    #[serde(default = "default_enable_search_indexing")]
    pub enable_search_indexing: bool,
}

fn default_max_chats_in_drawer() -> usize {
    20
}

fn default_max_chat_history() -> usize {
    100
}

fn default_search_debounce_ms() -> u64 {
    300
}

fn default_auto_save_interval_ms() -> u64 {
    5000
}

fn default_enable_search_indexing() -> bool {
    true
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_chats_in_drawer: default_max_chats_in_drawer(),
            max_chat_history: default_max_chat_history(),
            search_debounce_ms: default_search_debounce_ms(),
            auto_save_interval_ms: default_auto_save_interval_ms(),
            enable_search_indexing: default_enable_search_indexing(),
        }
    }
}

/// Partial update for [`ChatConfig`]
///
/// Unset fields leave the current value untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatConfigPatch {
    pub max_chats_in_drawer: Option<usize>,
    pub max_chat_history: Option<usize>,
    pub search_debounce_ms: Option<u64>,
    pub auto_save_interval_ms: Option<u64>,
    pub enable_search_indexing: Option<bool>,
}

impl ChatConfigPatch {
    /// Merges the set fields of this patch into `config`.
    pub fn apply(&self, config: &mut ChatConfig) {
        if let Some(v) = self.max_chats_in_drawer {
            config.max_chats_in_drawer = v;
        }
        if let Some(v) = self.max_chat_history {
            config.max_chat_history = v;
        }
        if let Some(v) = self.search_debounce_ms {
            config.search_debounce_ms = v;
        }
        if let Some(v) = self.auto_save_interval_ms {
            config.auto_save_interval_ms = v;
        }
        if let Some(v) = self.enable_search_indexing {
            config.enable_search_indexing = v;
        }
    }

    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.max_chats_in_drawer.is_none()
            && self.max_chat_history.is_none()
            && self.search_debounce_ms.is_none()
            && self.auto_save_interval_ms.is_none()
            && self.enable_search_indexing.is_none()
    }
}

/// Configuration provider backed by the key-value store
///
/// Constructed once at process start and shared by reference; the loaded
/// config is cached in memory after the first read. Updates are written
/// through immediately, but the in-memory value is updated even when the
/// write fails, so callers must not assume memory and disk stay atomic.
pub struct ConfigManager {
    store: Arc<dyn KeyValueStore>,
    current: RwLock<Option<ChatConfig>>,
}

impl ConfigManager {
    /// Creates a manager over the given store. Nothing is read until
    /// [`initialize`](Self::initialize) or the first [`get`](Self::get).
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            current: RwLock::new(None),
        }
    }

    /// Loads the persisted config on first call; later calls are no-ops.
    ///
    /// Never fails: a read or parse error logs a warning and leaves the
    /// defaults in place, so configuration can never block startup.
    pub async fn initialize(&self) {
        let mut current = self.current.write().await;
        if current.is_some() {
            return;
        }

        let loaded = match self.store.get(CHAT_CONFIG_KEY).await {
            Ok(Some(raw)) => match serde_json::from_str::<ChatConfig>(&raw) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Unreadable chat config, using defaults: {}", e);
                    ChatConfig::default()
                }
            },
            Ok(None) => ChatConfig::default(),
            Err(e) => {
                tracing::warn!("Failed to load chat config, using defaults: {}", e);
                ChatConfig::default()
            }
        };

        *current = Some(loaded);
    }

    /// Returns an owned copy of the current config, loading it first if
    /// needed.
    pub async fn get(&self) -> ChatConfig {
        if let Some(config) = self.current.read().await.as_ref() {
            return config.clone();
        }
        self.initialize().await;
        self.current
            .read()
            .await
            .clone()
            .unwrap_or_default()
    }

    /// Merges `patch` into the current config and persists the result.
    ///
    /// # Errors
    ///
    /// Returns [`CoachlogError::Config`] when the persist fails. The
    /// in-memory config has already been updated at that point.
    pub async fn update(&self, patch: &ChatConfigPatch) -> Result<()> {
        self.initialize().await;

        let snapshot = {
            let mut guard = self.current.write().await;
            let config = guard.get_or_insert_with(ChatConfig::default);
            patch.apply(config);
            config.clone()
        };

        self.persist(&snapshot).await
    }

    /// Restores the defaults and persists them.
    pub async fn reset(&self) -> Result<()> {
        let defaults = ChatConfig::default();
        *self.current.write().await = Some(defaults.clone());
        self.persist(&defaults).await
    }

    async fn persist(&self, config: &ChatConfig) -> Result<()> {
        let raw = serde_json::to_string(config)?;
        if let Err(e) = self.store.set(CHAT_CONFIG_KEY, &raw).await {
            return Err(
                CoachlogError::Config(format!("Failed to persist chat config: {}", e)).into(),
            );
        }
        Ok(())
    }
}
