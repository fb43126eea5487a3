//! Fuzzy search index over stored chat sessions
//!
//! [`SearchIndex`] keeps an in-memory snapshot of session titles, message
//! bodies, and previews, and ranks them with a nucleo matcher so search
//! stays fast on every keystroke. The index is rebuilt wholesale by
//! [`SearchIndex::refresh_index`] rather than maintained incrementally:
//! `max_chat_history` bounds the corpus to a small fixed size, so a full
//! O(n) rebuild is cheap and avoids stale-entry and partial-update bugs.
//! Callers must refresh after any mutation they want reflected in results.

use crate::config::ConfigManager;
use crate::history::{ChatHistoryStore, ChatSession};
use metrics::{histogram, increment_counter};
use nucleo_matcher::pattern::{CaseMatching, Normalization, Pattern};
use nucleo_matcher::{Config, Matcher};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

/// Relative weight of a title match.
const TITLE_WEIGHT: f32 = 0.4;
/// Relative weight of a message-body match.
const BODY_WEIGHT: f32 = 0.3;
/// Relative weight of a last-message-preview match.
const PREVIEW_WEIGHT: f32 = 0.3;

struct IndexEntry {
    session_id: String,
    title: String,
    body: String,
    preview: String,
}

#[derive(Clone)]
struct FieldCandidate<'a> {
    idx: usize,
    text: &'a str,
}

impl<'a> AsRef<str> for FieldCandidate<'a> {
    fn as_ref(&self) -> &str {
        self.text
    }
}

/// In-memory fuzzy index over the history store
///
/// `None` entries means the index has not been initialized yet; after
/// [`initialize`](Self::initialize) it is always `Some`, possibly empty
/// (when indexing is disabled or the store is empty).
pub struct SearchIndex {
    store: Arc<ChatHistoryStore>,
    config: Arc<ConfigManager>,
    entries: RwLock<Option<Vec<IndexEntry>>>,
}

impl SearchIndex {
    /// Creates an unbuilt index over the given store.
    pub fn new(store: Arc<ChatHistoryStore>, config: Arc<ConfigManager>) -> Self {
        Self {
            store,
            config,
            entries: RwLock::new(None),
        }
    }

    /// Builds the index on first call; later calls are no-ops.
    ///
    /// When `enable_search_indexing` is off, the index is left unbuilt and
    /// [`search`](Self::search) always returns empty.
    pub async fn initialize(&self) {
        if self.entries.read().await.is_some() {
            return;
        }
        let entries = self.build_entries().await;
        let mut guard = self.entries.write().await;
        if guard.is_none() {
            *guard = Some(entries);
        }
    }

    /// Unconditionally rebuilds the index from the store's current state.
    ///
    /// The index is not kept live in sync with store writes; staleness is
    /// bounded only by calls to this method.
    pub async fn refresh_index(&self) {
        let entries = self.build_entries().await;
        *self.entries.write().await = Some(entries);
    }

    /// Whether the index has been built (possibly empty when indexing is
    /// disabled).
    pub async fn is_initialized(&self) -> bool {
        self.entries.read().await.is_some()
    }

    /// Number of sessions currently indexed.
    pub async fn index_size(&self) -> usize {
        self.entries
            .read()
            .await
            .as_ref()
            .map(|entries| entries.len())
            .unwrap_or(0)
    }

    /// Ranked fuzzy search over indexed sessions.
    ///
    /// Returns matching sessions in descending relevance, deduplicated by
    /// id. An empty or whitespace query matches nothing. Never fails:
    /// internal errors degrade to an empty result set with a logged
    /// warning, since search is an enhancement over the authoritative
    /// store.
    pub async fn search(&self, query: &str) -> Vec<ChatSession> {
        if query.trim().is_empty() {
            return Vec::new();
        }
        self.initialize().await;
        increment_counter!("chat_search_queries_total");
        let started = Instant::now();

        let ranked_ids: Vec<String> = {
            let guard = self.entries.read().await;
            let entries = match guard.as_ref() {
                Some(entries) if !entries.is_empty() => entries,
                _ => return Vec::new(),
            };
            rank_entries(entries, query)
                .into_iter()
                .map(|idx| entries[idx].session_id.clone())
                .collect()
        };

        let mut seen = HashSet::new();
        let mut results = Vec::new();
        for id in ranked_ids {
            if !seen.insert(id.clone()) {
                continue;
            }
            match self.store.session(&id).await {
                Ok(Some(session)) => results.push(session),
                Ok(None) => {
                    tracing::debug!("Indexed session {} no longer loadable", id);
                }
                Err(e) => {
                    tracing::warn!("Failed to load session {} for search result: {}", id, e);
                }
            }
        }

        histogram!("chat_search_duration_seconds", started.elapsed().as_secs_f64());
        results
    }

    async fn build_entries(&self) -> Vec<IndexEntry> {
        let config = self.config.get().await;
        if !config.enable_search_indexing {
            tracing::debug!("Search indexing disabled; leaving index empty");
            return Vec::new();
        }

        let sessions = match self.store.sessions(Some(config.max_chat_history)).await {
            Ok(sessions) => sessions,
            Err(e) => {
                tracing::warn!("Failed to load sessions for search index: {}", e);
                return Vec::new();
            }
        };

        sessions
            .into_iter()
            .map(|session| IndexEntry {
                body: session
                    .messages
                    .iter()
                    .map(|m| m.text.as_str())
                    .collect::<Vec<_>>()
                    .join("\n"),
                preview: session.metadata.last_message_preview.clone(),
                title: session.title,
                session_id: session.id,
            })
            .collect()
    }
}

/// Scores every entry against `query` and returns entry indices in
/// descending weighted relevance. Entries with no matching field are
/// dropped.
fn rank_entries(entries: &[IndexEntry], query: &str) -> Vec<usize> {
    let mut matcher = Matcher::new(Config::DEFAULT);
    let pattern = Pattern::parse(query, CaseMatching::Ignore, Normalization::Smart);

    let fields: [(f32, fn(&IndexEntry) -> &str); 3] = [
        (TITLE_WEIGHT, |e| e.title.as_str()),
        (BODY_WEIGHT, |e| e.body.as_str()),
        (PREVIEW_WEIGHT, |e| e.preview.as_str()),
    ];

    let mut scores = vec![0.0f32; entries.len()];
    for (weight, field) in fields {
        let candidates: Vec<FieldCandidate<'_>> = entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| FieldCandidate {
                idx,
                text: field(entry),
            })
            .collect();

        for (candidate, score) in pattern.match_list(candidates, &mut matcher) {
            scores[candidate.idx] += weight * score as f32;
        }
    }

    let mut ranked: Vec<(usize, f32)> = scores
        .into_iter()
        .enumerate()
        .filter(|(_, score)| *score > 0.0)
        .collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    ranked.into_iter().map(|(idx, _)| idx).collect()
}
