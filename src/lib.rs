//! Coachlog - local conversation history for an AI fitness coach
//!
//! This library provides the chat-history core of the fitness-coach
//! client: durable session storage with a recency index, fuzzy search,
//! configuration, title generation, and debounced autosave.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `storage`: Key-value persistence (sled-backed and in-memory adapters)
//! - `history`: Session types, the durable store, titles, and autosave
//! - `search`: In-memory fuzzy index over stored sessions
//! - `config`: Chat configuration provider
//! - `cache`: Best-effort response cache
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use coachlog::{ChatHistoryStore, ChatMessage, ConfigManager};
//! use coachlog::storage::{KeyValueStore, MemoryStore};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let kv = Arc::new(MemoryStore::new()) as Arc<dyn KeyValueStore>;
//! let config = Arc::new(ConfigManager::new(kv.clone()));
//! let store = ChatHistoryStore::new(kv, config);
//! store.initialize().await?;
//!
//! let mut session = store.create_session(None);
//! session.push_message(ChatMessage::user("Plan my next week workouts"));
//! store.save_session(&mut session).await?;
//!
//! assert_eq!(store.sessions(Some(1)).await?.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod history;
pub mod metrics;
pub mod search;
pub mod storage;

// Re-export commonly used types
pub use cache::ResponseCache;
pub use config::{ChatConfig, ChatConfigPatch, ConfigManager};
pub use error::{CoachlogError, Result};
pub use history::{
    generate_title, AutosaveTimer, ChatHistoryStore, ChatMessage, ChatRole, ChatSession,
    SessionController, SessionLoad,
};
pub use search::SearchIndex;
pub use storage::{KeyValueStore, MemoryStore, SledStore};
