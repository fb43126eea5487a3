//! Session title derivation
//!
//! Titles are derived from the first user message: conversational filler is
//! stripped, the result is capitalized and trimmed, and over-long titles are
//! cut at a word boundary. Degenerate inputs fall back to a synthetic title
//! so the function always returns something displayable.

use crate::history::types::{ChatMessage, ChatRole, DEFAULT_SESSION_TITLE};
use chrono::Utc;

/// Longest title produced before truncation kicks in.
const MAX_TITLE_CHARS: usize = 50;

/// Titles shorter than this are considered degenerate.
const MIN_TITLE_CHARS: usize = 10;

/// Conversational lead-ins removed from the first user message.
/// Compound forms come before their sub-prefixes; at most one is removed.
const CONVERSATIONAL_PREFIXES: &[&str] = &[
    "can you please",
    "could you please",
    "would you please",
    "can you",
    "could you",
    "would you",
    "will you",
    "please",
    "how do i",
    "how do you",
    "how can i",
    "what is the",
    "what is",
    "what are",
    "tell me about",
    "tell me",
    "help me with",
    "help me",
    "i need to",
    "i need",
    "i want to",
    "i want",
];

/// Derives a human-readable session title from the message list.
///
/// Never fails and always returns a non-empty string.
///
/// # Examples
///
/// ```
/// use coachlog::history::{generate_title, ChatMessage};
///
/// let messages = vec![ChatMessage::user("Plan my next week workouts.")];
/// assert_eq!(generate_title(&messages), "Plan my next week workouts");
/// ```
pub fn generate_title(messages: &[ChatMessage]) -> String {
    let first_user = messages.iter().find(|m| m.role == ChatRole::User);
    let Some(first_user) = first_user else {
        return DEFAULT_SESSION_TITLE.to_string();
    };

    let cleaned = clean_title(&first_user.text);
    if cleaned.chars().count() >= MIN_TITLE_CHARS {
        return truncate_at_word_boundary(&cleaned);
    }

    fallback_title(messages)
}

fn clean_title(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let stripped = strip_conversational_prefix(&collapsed);
    let trimmed = stripped.trim_end_matches(['.', '!', '?']).trim_end();
    capitalize_first(trimmed)
}

fn strip_conversational_prefix(text: &str) -> &str {
    for prefix in CONVERSATIONAL_PREFIXES {
        if let Some(head) = text.get(..prefix.len()) {
            if head.eq_ignore_ascii_case(prefix) {
                let rest = &text[prefix.len()..];
                if rest.is_empty() || rest.starts_with(' ') {
                    return rest.trim_start();
                }
            }
        }
    }
    text
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn truncate_at_word_boundary(title: &str) -> String {
    if title.chars().count() <= MAX_TITLE_CHARS {
        return title.to_string();
    }

    let truncated: String = title.chars().take(MAX_TITLE_CHARS).collect();
    let cut = match truncated.rfind(' ') {
        Some(pos) if truncated[..pos].chars().count() > MIN_TITLE_CHARS => &truncated[..pos],
        _ => truncated.as_str(),
    };
    format!("{}...", cut.trim_end())
}

fn fallback_title(messages: &[ChatMessage]) -> String {
    let count = messages.len();
    if count <= 1 {
        let at = messages
            .last()
            .map(|m| m.timestamp)
            .unwrap_or_else(Utc::now);
        format!("Chat at {}", at.format("%H:%M"))
    } else if count <= 5 {
        format!("Quick Chat ({} messages)", count)
    } else {
        format!("Chat Session ({} messages)", count)
    }
}
