/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes three top-level command modules:

- `history` — List, show, delete, and clear stored conversations
- `search`  — Fuzzy or substring search over conversations
- `config`  — Show and update the chat configuration

The handlers are intentionally small and use the library components: the
key-value store, the history store, the search index, and the config
manager, constructed once here and passed by reference.
*/

pub mod config;
pub mod history;
pub mod search;

use crate::config::ConfigManager;
use crate::error::Result;
use crate::history::ChatHistoryStore;
use crate::storage::{KeyValueStore, SledStore};
use std::path::Path;
use std::sync::Arc;

/// Shared services for command handlers, constructed once per invocation.
pub struct Services {
    /// Chat history store over the durable key-value database
    pub history: Arc<ChatHistoryStore>,
    /// Configuration provider backed by the same database
    pub config: Arc<ConfigManager>,
}

/// Opens the durable store and wires up the service graph.
pub async fn build_services(data_dir: Option<&Path>) -> Result<Services> {
    let store: Arc<dyn KeyValueStore> = match data_dir {
        Some(dir) => Arc::new(SledStore::new_in_dir(dir)?),
        None => Arc::new(SledStore::new()?),
    };

    let config = Arc::new(ConfigManager::new(store.clone()));
    let history = Arc::new(ChatHistoryStore::new(store, config.clone()));
    history.initialize().await?;

    Ok(Services { history, config })
}
