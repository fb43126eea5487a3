//! Core data types for chat history
//!
//! A [`ChatSession`] owns an ordered, append-only sequence of
//! [`ChatMessage`]s plus derived metadata (message count, preview of the
//! last message, tags). Sessions are identified by UUIDs; messages carry
//! sortable ULIDs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use ulid::Ulid;
use uuid::Uuid;

/// Title given to sessions before one is derived from the conversation.
pub const DEFAULT_SESSION_TITLE: &str = "New Chat";

/// Opening assistant message for a fresh coaching session.
pub const WELCOME_TEXT: &str =
    "Welcome to your AI fitness coach! Ask me about workouts, exercises, or recovery.";

/// Maximum number of characters kept in `last_message_preview`.
pub const PREVIEW_MAX_CHARS: usize = 100;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// The person chatting with the coach
    User,
    /// The coach itself
    Assistant,
}

/// Optional per-message generation details.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageMetadata {
    /// Tokens consumed producing this message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens: Option<u32>,
    /// Model that produced this message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// A single message inside a session
///
/// Messages are immutable once created and owned exclusively by their
/// parent [`ChatSession`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique message identifier (ULID, sortable by creation time)
    pub id: String,
    /// Author of the message
    pub role: ChatRole,
    /// Message body
    pub text: String,
    /// When the message was created
    pub timestamp: DateTime<Utc>,
    /// Optional generation details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MessageMetadata>,
}

impl ChatMessage {
    /// Creates a message with a fresh id and the current timestamp.
    pub fn new(role: ChatRole, text: impl Into<String>) -> Self {
        Self {
            id: Ulid::new().to_string(),
            role,
            text: text.into(),
            timestamp: Utc::now(),
            metadata: None,
        }
    }

    /// Creates a new user message
    ///
    /// # Examples
    ///
    /// ```
    /// use coachlog::history::{ChatMessage, ChatRole};
    ///
    /// let msg = ChatMessage::user("How many rest days do I need?");
    /// assert_eq!(msg.role, ChatRole::User);
    /// ```
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(ChatRole::User, text)
    }

    /// Creates a new assistant message
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, text)
    }

    /// Creates the canonical welcome message that opens a new session.
    pub fn welcome() -> Self {
        Self::assistant(WELCOME_TEXT)
    }
}

/// Derived metadata for a stored session
///
/// `message_count` and `last_message_preview` are recomputed from the
/// message list on every save; `tags` are caller-managed labels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionMetadata {
    /// Number of messages in the session
    pub message_count: usize,
    /// First 100 characters of the last message, empty when no messages
    pub last_message_preview: String,
    /// Free-form labels attached to the session
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

/// A stored conversation with the coach
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSession {
    /// Unique session identifier (UUID), immutable for the record's lifetime
    pub id: String,
    /// User-friendly title (or summary)
    pub title: String,
    /// When the session was created
    pub created_at: DateTime<Utc>,
    /// When the session was last saved
    pub updated_at: DateTime<Utc>,
    /// Ordered message sequence, append-only during a conversation
    pub messages: Vec<ChatMessage>,
    /// Derived metadata, recomputed on save
    pub metadata: SessionMetadata,
}

impl ChatSession {
    /// Allocates a fresh, empty session.
    ///
    /// Pure allocation: nothing is persisted and the recency index is not
    /// touched until the session is saved.
    ///
    /// # Examples
    ///
    /// ```
    /// use coachlog::history::ChatSession;
    ///
    /// let session = ChatSession::new("New Chat");
    /// assert!(session.messages.is_empty());
    /// assert_eq!(session.metadata.message_count, 0);
    /// ```
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            created_at: now,
            updated_at: now,
            messages: Vec::new(),
            metadata: SessionMetadata::default(),
        }
    }

    /// Appends a message to the session.
    pub fn push_message(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Recomputes `message_count` and `last_message_preview` from the
    /// current message list. Tags are left untouched.
    pub(crate) fn refresh_metadata(&mut self) {
        self.metadata.message_count = self.messages.len();
        self.metadata.last_message_preview = self
            .messages
            .last()
            .map(|m| m.text.chars().take(PREVIEW_MAX_CHARS).collect())
            .unwrap_or_default();
    }
}

/// Outcome of loading one session record from storage
///
/// Distinguishes a clean load from the self-healing path so callers (and
/// tests) can tell which branch fired, rather than collapsing both into
/// "absent".
#[derive(Debug)]
pub enum SessionLoad {
    /// The record existed and deserialized cleanly.
    Loaded(ChatSession),
    /// The record was corrupt; it has been deleted from storage and the
    /// index as a side effect of this load.
    Repaired {
        /// Id of the removed record
        id: String,
        /// Human-readable cause of the repair
        reason: String,
    },
    /// No record exists under this id.
    Missing,
}
