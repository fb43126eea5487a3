//! Integration tests for the fuzzy search index
//!
//! Covers agreement between the ranked fuzzy path and the canonical
//! substring scan, the explicit-refresh staleness contract, and the
//! indexing kill switch.

mod common;

use coachlog::{ChatConfigPatch, ChatMessage, ChatSession, KeyValueStore, SearchIndex};
use common::{sled_services, TestServices};

async fn save_with(services: &TestServices, title: &str, body: &str) -> ChatSession {
    let mut session = services.history.create_session(Some(title));
    session.push_message(ChatMessage::user(body));
    services
        .history
        .save_session(&mut session)
        .await
        .expect("save failed");
    session
}

fn search_index(services: &TestServices) -> SearchIndex {
    SearchIndex::new(services.history.clone(), services.config.clone())
}

#[tokio::test]
async fn test_fuzzy_and_scan_agree_on_single_match() {
    let services = sled_services().await;

    save_with(&services, "Meal prep", "chicken and rice for the week").await;
    let target = save_with(&services, "Recovery", "my sleep has been rough").await;
    save_with(&services, "Mobility", "hip openers before squats").await;

    let index = search_index(&services);
    index.initialize().await;

    let fuzzy = index.search("sleep").await;
    let scan = services
        .history
        .search_sessions("sleep")
        .await
        .expect("scan failed");

    assert_eq!(fuzzy.len(), 1);
    assert_eq!(scan.len(), 1);
    assert_eq!(fuzzy[0].id, target.id);
    assert_eq!(scan[0].id, target.id);
}

#[tokio::test]
async fn test_search_results_ranked_with_title_match_first() {
    let services = sled_services().await;

    save_with(&services, "Weekly check-in", "we also covered deadlift cues").await;
    let titled = save_with(&services, "Deadlift programming", "five by five").await;

    let index = search_index(&services);
    let results = index.search("deadlift").await;

    assert!(results.len() >= 2);
    assert_eq!(results[0].id, titled.id);
}

#[tokio::test]
async fn test_index_stale_until_refresh_after_mutation() {
    let services = sled_services().await;
    let index = search_index(&services);
    index.initialize().await;
    assert_eq!(index.index_size().await, 0);

    // Mutations after initialize are invisible to search...
    let session = save_with(&services, "Cardio", "zone two base building").await;
    assert!(index.search("cardio").await.is_empty());

    // ...until the consumer refreshes explicitly.
    index.refresh_index().await;
    let results = index.search("cardio").await;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, session.id);

    // Deletions behave the same way.
    services
        .history
        .delete_session(&session.id)
        .await
        .expect("delete failed");
    assert_eq!(index.search("cardio").await.len(), 1);
    index.refresh_index().await;
    assert!(index.search("cardio").await.is_empty());
}

#[tokio::test]
async fn test_empty_query_returns_empty_not_everything() {
    let services = sled_services().await;
    save_with(&services, "A", "alpha").await;
    save_with(&services, "B", "beta").await;

    let index = search_index(&services);
    index.initialize().await;

    assert!(index.search("").await.is_empty());
    assert!(index.search("  \t ").await.is_empty());
    assert!(services
        .history
        .search_sessions("")
        .await
        .expect("scan failed")
        .is_empty());
}

#[tokio::test]
async fn test_disabled_indexing_returns_empty_while_scan_still_works() {
    let services = sled_services().await;
    services
        .config
        .update(&ChatConfigPatch {
            enable_search_indexing: Some(false),
            ..Default::default()
        })
        .await
        .expect("config update failed");

    save_with(&services, "Hidden", "only the scan can see this").await;

    let index = search_index(&services);
    index.initialize().await;

    assert!(index.is_initialized().await);
    assert!(index.search("scan").await.is_empty());

    let scan = services
        .history
        .search_sessions("scan")
        .await
        .expect("scan failed");
    assert_eq!(scan.len(), 1);
}

#[tokio::test]
async fn test_initialize_twice_keeps_index_stable() {
    let services = sled_services().await;
    save_with(&services, "One", "first session").await;

    let index = search_index(&services);
    index.initialize().await;
    let size_after_first = index.index_size().await;

    index.initialize().await;
    assert_eq!(index.index_size().await, size_after_first);
    assert!(index.is_initialized().await);
}

#[tokio::test]
async fn test_index_bounded_by_history_cap() {
    let services = sled_services().await;
    services
        .config
        .update(&ChatConfigPatch {
            max_chat_history: Some(4),
            ..Default::default()
        })
        .await
        .expect("config update failed");

    for i in 0..6 {
        save_with(&services, &format!("Chat {}", i), "filler body").await;
    }

    let index = search_index(&services);
    index.initialize().await;
    assert_eq!(index.index_size().await, 4);
}

#[tokio::test]
async fn test_search_skips_sessions_repaired_after_indexing() {
    let services = sled_services().await;
    let session = save_with(&services, "Fragile", "searchable body text").await;

    let index = search_index(&services);
    index.initialize().await;

    // Corrupt the record after the index snapshot was taken: the search
    // falls back to skipping the session instead of surfacing an error.
    services
        .kv
        .set(&coachlog::storage::session_key(&session.id), "broken")
        .await
        .expect("corrupt failed");

    assert!(index.search("searchable").await.is_empty());
}
