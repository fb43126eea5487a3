//! Durable chat session store
//!
//! Sessions are persisted as individual JSON records; a separate
//! recency-ordered index of session ids is the sole ordering authority.
//! Saving writes the record before the index so a partial failure can only
//! leave an orphaned record, never an index entry pointing at nothing.
//! Reads self-heal: a record that cannot be deserialized is deleted from
//! both storage and the index instead of surfacing an error, so a single
//! corrupt chat never blocks the rest of the history.

use crate::config::ConfigManager;
use crate::error::Result;
use crate::history::types::{ChatSession, SessionLoad, DEFAULT_SESSION_TITLE};
use crate::storage::{session_key, KeyValueStore, CHAT_INDEX_KEY, CURRENT_CHAT_KEY};
use chrono::Utc;
use metrics::{counter, increment_counter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Ownership authority for session identity and recency
///
/// Constructed once at process start and shared by `Arc`; all methods take
/// `&self` and are safe to call from a single cooperative task at a time,
/// which is how the UI layer drives them.
pub struct ChatHistoryStore {
    store: Arc<dyn KeyValueStore>,
    config: Arc<ConfigManager>,
    initialized: AtomicBool,
}

impl ChatHistoryStore {
    /// Creates a store over the given persistence adapter and config.
    pub fn new(store: Arc<dyn KeyValueStore>, config: Arc<ConfigManager>) -> Self {
        Self {
            store,
            config,
            initialized: AtomicBool::new(false),
        }
    }

    /// The configuration provider this store was built with.
    pub fn config(&self) -> &Arc<ConfigManager> {
        &self.config
    }

    /// Prepares the store for use. Idempotent; later calls are no-ops.
    pub async fn initialize(&self) -> Result<()> {
        if self.initialized.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.config.initialize().await;
        let index = self.load_index().await?;
        tracing::debug!(sessions = index.len(), "chat history store initialized");
        Ok(())
    }

    /// Allocates a fresh session without persisting it.
    ///
    /// The index is untouched until the session is saved for the first
    /// time.
    pub fn create_session(&self, title: Option<&str>) -> ChatSession {
        ChatSession::new(title.unwrap_or(DEFAULT_SESSION_TITLE))
    }

    /// Saves `session`, refreshing its derived metadata and `updated_at`,
    /// and moves it to the front of the recency index.
    ///
    /// When the index grows past `max_chat_history`, the trailing ids are
    /// evicted: their records are deleted, then the shortened index is
    /// persisted. The index write always comes last.
    ///
    /// # Errors
    ///
    /// Propagates write failures (typically
    /// [`StorageFull`](crate::error::CoachlogError::StorageFull)) so the
    /// caller can surface them; the caller may retry.
    pub async fn save_session(&self, session: &mut ChatSession) -> Result<()> {
        session.refresh_metadata();
        session.updated_at = Utc::now();

        let raw = serde_json::to_string(&*session)?;
        self.store.set(&session_key(&session.id), &raw).await?;

        let mut index = self.load_index().await?;
        if let Some(pos) = index.iter().position(|id| id == &session.id) {
            index.remove(pos);
        }
        index.insert(0, session.id.clone());

        let cap = self.config.get().await.max_chat_history;
        let evicted = if index.len() > cap {
            index.split_off(cap)
        } else {
            Vec::new()
        };
        for id in &evicted {
            if let Err(e) = self.store.remove(&session_key(id)).await {
                tracing::warn!("Failed to delete evicted session {}: {}", id, e);
            }
        }
        if !evicted.is_empty() {
            tracing::debug!(count = evicted.len(), "evicted sessions beyond history cap");
            counter!("chat_sessions_evicted_total", evicted.len() as u64);
        }

        self.persist_index(&index).await?;
        increment_counter!("chat_sessions_saved_total");
        Ok(())
    }

    /// Loads one session, reporting which branch fired.
    ///
    /// A record that fails to deserialize is treated as corrupted: it is
    /// deleted from storage and the index (best effort) and reported as
    /// [`SessionLoad::Repaired`]. A missing record with a stale index entry
    /// has the entry pruned, so the index never keeps referencing a record
    /// that cannot be loaded.
    pub async fn load_session(&self, id: &str) -> Result<SessionLoad> {
        let key = session_key(id);
        let raw = match self.store.get(&key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                self.prune_index_entry(id).await;
                return Ok(SessionLoad::Missing);
            }
            Err(e) => {
                tracing::warn!("Failed to read session {}: {}", id, e);
                return Ok(SessionLoad::Missing);
            }
        };

        match serde_json::from_str::<ChatSession>(&raw) {
            Ok(session) => Ok(SessionLoad::Loaded(session)),
            Err(e) => {
                let reason = format!("undecodable session record: {}", e);
                tracing::warn!("Removing corrupt session {}: {}", id, reason);
                if let Err(e) = self.store.remove(&key).await {
                    tracing::warn!("Failed to delete corrupt session {}: {}", id, e);
                }
                self.prune_index_entry(id).await;
                increment_counter!("chat_sessions_repaired_total");
                Ok(SessionLoad::Repaired {
                    id: id.to_string(),
                    reason,
                })
            }
        }
    }

    /// Loads one session, or `None` when it is absent or was repaired away.
    pub async fn session(&self, id: &str) -> Result<Option<ChatSession>> {
        Ok(match self.load_session(id).await? {
            SessionLoad::Loaded(session) => Some(session),
            SessionLoad::Repaired { .. } | SessionLoad::Missing => None,
        })
    }

    /// Returns up to `limit` sessions, most recently saved first.
    ///
    /// Defaults to the configured `max_chats_in_drawer`. Records that fail
    /// to load are skipped (and repaired) rather than aborting the list.
    pub async fn sessions(&self, limit: Option<usize>) -> Result<Vec<ChatSession>> {
        let limit = match limit {
            Some(limit) => limit,
            None => self.config.get().await.max_chats_in_drawer,
        };

        let index = self.load_index().await?;
        let mut sessions = Vec::new();
        for id in index.into_iter().take(limit) {
            match self.load_session(&id).await? {
                SessionLoad::Loaded(session) => sessions.push(session),
                SessionLoad::Repaired { id, reason } => {
                    tracing::debug!("Skipping repaired session {}: {}", id, reason);
                }
                SessionLoad::Missing => {
                    tracing::debug!("Skipping missing session {}", id);
                }
            }
        }
        Ok(sessions)
    }

    /// Deletes a session record and its index entry.
    ///
    /// Succeeds even when the record was already absent.
    pub async fn delete_session(&self, id: &str) -> Result<()> {
        self.store.remove(&session_key(id)).await?;
        let mut index = self.load_index().await?;
        if let Some(pos) = index.iter().position(|entry| entry == id) {
            index.remove(pos);
            self.persist_index(&index).await?;
        }
        Ok(())
    }

    /// Case-insensitive substring search over titles and message bodies.
    ///
    /// This is the canonical matching semantics; the fuzzy
    /// [`SearchIndex`](crate::search::SearchIndex) layers ranked matching
    /// on top of it. Scans up to `max_chat_history` most-recent sessions.
    /// An empty or whitespace query matches nothing.
    pub async fn search_sessions(&self, query: &str) -> Result<Vec<ChatSession>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        let cap = self.config.get().await.max_chat_history;
        let index = self.load_index().await?;
        let mut matches = Vec::new();
        for id in index.into_iter().take(cap) {
            if let SessionLoad::Loaded(session) = self.load_session(&id).await? {
                if session_matches(&session, &needle) {
                    matches.push(session);
                }
            }
        }
        Ok(matches)
    }

    /// Deletes every indexed session record and resets the index.
    pub async fn clear_all(&self) -> Result<()> {
        let index = self.load_index().await?;
        for id in &index {
            self.store.remove(&session_key(id)).await?;
        }
        self.persist_index(&[]).await?;
        self.set_current_session_id(None).await?;
        tracing::info!(count = index.len(), "cleared all chat sessions");
        Ok(())
    }

    /// Id of the session that was active when the app last ran, if any.
    pub async fn current_session_id(&self) -> Result<Option<String>> {
        self.store.get(CURRENT_CHAT_KEY).await
    }

    /// Records (or clears) the active session id.
    pub async fn set_current_session_id(&self, id: Option<&str>) -> Result<()> {
        match id {
            Some(id) => self.store.set(CURRENT_CHAT_KEY, id).await,
            None => self.store.remove(CURRENT_CHAT_KEY).await,
        }
    }

    /// Ids currently in the recency index, most recent first.
    pub async fn index_ids(&self) -> Result<Vec<String>> {
        self.load_index().await
    }

    async fn load_index(&self) -> Result<Vec<String>> {
        let raw = match self.store.get(CHAT_INDEX_KEY).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Failed to read chat index, treating as empty: {}", e);
                return Ok(Vec::new());
            }
        };

        match raw {
            Some(raw) => match serde_json::from_str::<Vec<String>>(&raw) {
                Ok(ids) => Ok(ids),
                Err(e) => {
                    tracing::warn!("Corrupt chat index, resetting: {}", e);
                    self.persist_index(&[]).await?;
                    Ok(Vec::new())
                }
            },
            None => Ok(Vec::new()),
        }
    }

    async fn persist_index(&self, ids: &[String]) -> Result<()> {
        let raw = serde_json::to_string(ids)?;
        self.store.set(CHAT_INDEX_KEY, &raw).await
    }

    /// Removes `id` from the index if present. Best effort: failures are
    /// logged, not raised, because this runs inside read paths.
    async fn prune_index_entry(&self, id: &str) {
        let mut index = match self.load_index().await {
            Ok(index) => index,
            Err(e) => {
                tracing::warn!("Failed to load index while pruning {}: {}", id, e);
                return;
            }
        };
        if let Some(pos) = index.iter().position(|entry| entry == id) {
            index.remove(pos);
            if let Err(e) = self.persist_index(&index).await {
                tracing::warn!("Failed to persist index after pruning {}: {}", id, e);
            }
        }
    }
}

fn session_matches(session: &ChatSession, needle_lower: &str) -> bool {
    session.title.to_lowercase().contains(needle_lower)
        || session
            .messages
            .iter()
            .any(|m| m.text.to_lowercase().contains(needle_lower))
}
