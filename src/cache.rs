//! Best-effort response cache for coach replies
//!
//! Repeated questions get answered from a local cache instead of a round
//! trip to the agent. Entries are keyed by a SHA-256 digest of the
//! normalized (trimmed, lowercased) query and persisted as a single JSON
//! map through the key-value store. The cache is strictly an optimization:
//! load and save failures are logged and otherwise ignored, and a cold or
//! broken cache simply behaves as empty.

use crate::storage::{KeyValueStore, RESPONSE_CACHE_KEY};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Cache of coach responses keyed by normalized query
pub struct ResponseCache {
    store: Arc<dyn KeyValueStore>,
    entries: RwLock<Option<HashMap<String, String>>>,
}

impl ResponseCache {
    /// Creates a cache over the given store. Nothing is read until first
    /// use.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            entries: RwLock::new(None),
        }
    }

    /// Returns the cached response for `query`, if any.
    pub async fn get(&self, query: &str) -> Option<String> {
        self.ensure_loaded().await;
        let key = cache_key(query);
        self.entries
            .read()
            .await
            .as_ref()
            .and_then(|entries| entries.get(&key).cloned())
    }

    /// Caches `response` for `query` and persists the map, best effort.
    pub async fn put(&self, query: &str, response: &str) {
        self.ensure_loaded().await;
        let snapshot = {
            let mut guard = self.entries.write().await;
            let entries = guard.get_or_insert_with(HashMap::new);
            entries.insert(cache_key(query), response.to_string());
            entries.clone()
        };
        self.persist(&snapshot).await;
    }

    /// Drops every cached response and persists the empty map, best effort.
    pub async fn clear(&self) {
        *self.entries.write().await = Some(HashMap::new());
        self.persist(&HashMap::new()).await;
    }

    /// Number of cached responses.
    pub async fn len(&self) -> usize {
        self.ensure_loaded().await;
        self.entries
            .read()
            .await
            .as_ref()
            .map(|entries| entries.len())
            .unwrap_or(0)
    }

    /// Whether the cache holds no responses.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn ensure_loaded(&self) {
        if self.entries.read().await.is_some() {
            return;
        }

        let loaded = match self.store.get(RESPONSE_CACHE_KEY).await {
            Ok(Some(raw)) => match serde_json::from_str::<HashMap<String, String>>(&raw) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!("Unreadable response cache, starting empty: {}", e);
                    HashMap::new()
                }
            },
            Ok(None) => HashMap::new(),
            Err(e) => {
                tracing::warn!("Failed to load response cache, starting empty: {}", e);
                HashMap::new()
            }
        };

        let mut guard = self.entries.write().await;
        if guard.is_none() {
            *guard = Some(loaded);
        }
    }

    async fn persist(&self, entries: &HashMap<String, String>) {
        let raw = match serde_json::to_string(entries) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Failed to serialize response cache: {}", e);
                return;
            }
        };
        if let Err(e) = self.store.set(RESPONSE_CACHE_KEY, &raw).await {
            tracing::warn!("Failed to persist response cache: {}", e);
        }
    }
}

/// SHA-256 digest of the trimmed, lowercased query.
fn cache_key(query: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(query.trim().to_lowercase().as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|byte| format!("{:02x}", byte))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, WriteFailure};

    fn build_cache() -> (Arc<MemoryStore>, ResponseCache) {
        let store = Arc::new(MemoryStore::new());
        let cache = ResponseCache::new(store.clone() as Arc<dyn KeyValueStore>);
        (store, cache)
    }

    #[tokio::test]
    async fn test_get_miss_returns_none() {
        let (_store, cache) = build_cache();
        assert!(cache.get("how much protein").await.is_none());
    }

    #[tokio::test]
    async fn test_put_then_get_round_trips() {
        let (_store, cache) = build_cache();
        cache.put("how much protein", "about 1.6g per kg").await;

        assert_eq!(
            cache.get("how much protein").await.as_deref(),
            Some("about 1.6g per kg")
        );
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_queries_normalized_before_hashing() {
        let (_store, cache) = build_cache();
        cache.put("How Much Protein?", "answer").await;

        assert_eq!(
            cache.get("  how much protein?  ").await.as_deref(),
            Some("answer")
        );
    }

    #[tokio::test]
    async fn test_cache_persists_across_instances() {
        let (store, cache) = build_cache();
        cache.put("rest days", "two per week").await;

        let fresh = ResponseCache::new(store as Arc<dyn KeyValueStore>);
        assert_eq!(fresh.get("rest days").await.as_deref(), Some("two per week"));
    }

    #[tokio::test]
    async fn test_clear_empties_cache() {
        let (_store, cache) = build_cache();
        cache.put("a", "1").await;
        cache.put("b", "2").await;
        cache.clear().await;

        assert!(cache.is_empty().await);
        assert!(cache.get("a").await.is_none());
    }

    #[tokio::test]
    async fn test_corrupt_blob_starts_empty() {
        let (store, cache) = build_cache();
        store
            .set(RESPONSE_CACHE_KEY, "][ not json")
            .await
            .expect("seed failed");

        assert!(cache.get("anything").await.is_none());
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn test_put_swallows_write_failures() {
        let (store, cache) = build_cache();
        store.fail_writes(Some(WriteFailure::Full));

        // Does not panic or error; the entry still lands in memory.
        cache.put("failed write", "kept in memory").await;
        assert_eq!(
            cache.get("failed write").await.as_deref(),
            Some("kept in memory")
        );
    }

    #[test]
    fn test_cache_key_is_hex_sha256() {
        let key = cache_key("hello");
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(cache_key("HELLO  "), key);
    }
}
