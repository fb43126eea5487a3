//! Chat history: types, durable store, titles, and autosave
//!
//! The [`ChatHistoryStore`] owns persisted session records and the
//! recency-ordered index; [`generate_title`] derives display titles;
//! [`SessionController`] is the UI-facing wrapper that drives one active
//! conversation with debounced autosave.

pub mod autosave;
pub mod controller;
pub mod store;
pub mod titles;
pub mod types;

pub use autosave::AutosaveTimer;
pub use controller::SessionController;
pub use store::ChatHistoryStore;
pub use titles::generate_title;
pub use types::{
    ChatMessage, ChatRole, ChatSession, MessageMetadata, SessionLoad, SessionMetadata,
    DEFAULT_SESSION_TITLE, PREVIEW_MAX_CHARS, WELCOME_TEXT,
};
