//! UI-facing session controller
//!
//! Owns the active [`ChatSession`], appends messages as the conversation
//! progresses, derives a title from the first user message, and keeps the
//! session saved through a debounced [`AutosaveTimer`]: every edit re-arms
//! the timer, so there is at most one pending save and it fires only once
//! the conversation goes quiet. `flush` saves immediately and disarms the
//! timer.

use crate::error::Result;
use crate::history::autosave::AutosaveTimer;
use crate::history::store::ChatHistoryStore;
use crate::history::titles::generate_title;
use crate::history::types::{ChatMessage, ChatSession, DEFAULT_SESSION_TITLE};
use std::sync::Arc;
use std::time::Duration;

/// Drives one conversation against the history store
pub struct SessionController {
    store: Arc<ChatHistoryStore>,
    autosave: AutosaveTimer,
    session: ChatSession,
}

impl SessionController {
    /// Starts a fresh session opened with the welcome message and marks it
    /// as the active session.
    pub async fn start(store: Arc<ChatHistoryStore>) -> Result<Self> {
        let mut session = store.create_session(None);
        session.push_message(ChatMessage::welcome());
        store.set_current_session_id(Some(&session.id)).await?;

        let delay = Duration::from_millis(store_autosave_delay(&store).await);
        Ok(Self {
            store,
            autosave: AutosaveTimer::new(delay),
            session,
        })
    }

    /// Resumes a stored session, or returns `None` when it does not exist.
    pub async fn resume(store: Arc<ChatHistoryStore>, id: &str) -> Result<Option<Self>> {
        let Some(session) = store.session(id).await? else {
            return Ok(None);
        };
        store.set_current_session_id(Some(&session.id)).await?;

        let delay = Duration::from_millis(store_autosave_delay(&store).await);
        Ok(Some(Self {
            store,
            autosave: AutosaveTimer::new(delay),
            session,
        }))
    }

    /// The active session.
    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    /// Whether a debounced save is pending.
    pub fn autosave_pending(&self) -> bool {
        self.autosave.is_armed()
    }

    /// Appends a user message, deriving the session title from it when the
    /// session still carries the default title, and re-arms the autosave.
    pub fn append_user_message(&mut self, text: impl Into<String>) {
        self.session.push_message(ChatMessage::user(text));
        if self.session.title == DEFAULT_SESSION_TITLE {
            self.session.title = generate_title(&self.session.messages);
        }
        self.schedule_autosave();
    }

    /// Appends an assistant message and re-arms the autosave.
    pub fn append_assistant_message(&mut self, text: impl Into<String>) {
        self.session.push_message(ChatMessage::assistant(text));
        self.schedule_autosave();
    }

    /// Saves the session immediately and disarms any pending autosave.
    pub async fn flush(&mut self) -> Result<()> {
        self.autosave.cancel();
        self.store.save_session(&mut self.session).await
    }

    fn schedule_autosave(&mut self) {
        let store = Arc::clone(&self.store);
        let mut snapshot = self.session.clone();
        self.autosave.schedule(async move {
            if let Err(e) = store.save_session(&mut snapshot).await {
                tracing::warn!("Autosave failed for session {}: {}", snapshot.id, e);
            }
        });
    }
}

async fn store_autosave_delay(store: &ChatHistoryStore) -> u64 {
    store.config().get().await.auto_save_interval_ms
}
