//! Integration tests for the durable chat history store
//!
//! Exercises the full save/list/delete/search lifecycle against a real
//! sled database, including recency ordering, eviction at the history cap,
//! and self-healing of corrupt records.

mod common;

use coachlog::storage::{session_key, SledStore};
use coachlog::{
    ChatConfigPatch, ChatHistoryStore, ChatMessage, ChatSession, ConfigManager, KeyValueStore,
    SessionLoad,
};
use common::sled_services;
use std::sync::Arc;
use tempfile::TempDir;

async fn save_with_message(services: &common::TestServices, text: &str) -> ChatSession {
    let mut session = services.history.create_session(None);
    session.push_message(ChatMessage::user(text));
    services
        .history
        .save_session(&mut session)
        .await
        .expect("save failed");
    session
}

#[tokio::test]
async fn test_save_and_reload_round_trip() {
    let services = sled_services().await;

    let mut session = services.history.create_session(Some("Push day"));
    session.push_message(ChatMessage::welcome());
    session.push_message(ChatMessage::user("How many sets for chest?"));
    services
        .history
        .save_session(&mut session)
        .await
        .expect("save failed");

    let loaded = services
        .history
        .session(&session.id)
        .await
        .expect("load failed")
        .expect("session missing");

    assert_eq!(loaded.id, session.id);
    assert_eq!(loaded.title, "Push day");
    assert_eq!(loaded.messages.len(), 2);
    assert_eq!(loaded.metadata.message_count, 2);
    assert_eq!(
        loaded.metadata.last_message_preview,
        "How many sets for chest?"
    );
    assert_eq!(loaded.created_at, session.created_at);
    assert_eq!(loaded.updated_at, session.updated_at);
}

#[tokio::test]
async fn test_resaving_moves_session_to_front() {
    let services = sled_services().await;

    let mut a = save_with_message(&services, "session a").await;
    let b = save_with_message(&services, "session b").await;

    // Saving A again moves it back to the front without duplicating it.
    a.push_message(ChatMessage::assistant("more about a"));
    services
        .history
        .save_session(&mut a)
        .await
        .expect("resave failed");

    let listed = services.history.sessions(None).await.expect("list failed");
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, a.id);
    assert_eq!(listed[1].id, b.id);
}

#[tokio::test]
async fn test_eviction_at_history_cap() {
    let services = sled_services().await;
    services
        .config
        .update(&ChatConfigPatch {
            max_chat_history: Some(5),
            ..Default::default()
        })
        .await
        .expect("config update failed");

    let mut saved = Vec::new();
    for i in 0..6 {
        saved.push(save_with_message(&services, &format!("chat {}", i)).await);
    }

    let ids = services.history.index_ids().await.expect("index failed");
    assert_eq!(ids.len(), 5);

    // The least-recently-saved session is the one that got evicted.
    assert!(!ids.contains(&saved[0].id));
    assert!(services
        .history
        .session(&saved[0].id)
        .await
        .expect("load failed")
        .is_none());

    // The rest are all still retrievable.
    for session in &saved[1..] {
        assert!(services
            .history
            .session(&session.id)
            .await
            .expect("load failed")
            .is_some());
    }
}

#[tokio::test]
async fn test_history_survives_reopen() {
    let dir = TempDir::new().expect("failed to create temp dir");
    let path = dir.path().join("history.db");
    let id;

    {
        let kv = Arc::new(SledStore::new_with_path(&path).expect("open failed"))
            as Arc<dyn coachlog::KeyValueStore>;
        let config = Arc::new(ConfigManager::new(kv.clone()));
        let history = ChatHistoryStore::new(kv, config);

        let mut session = history.create_session(None);
        session.push_message(ChatMessage::user("remember me"));
        history.save_session(&mut session).await.expect("save failed");
        history
            .set_current_session_id(Some(&session.id))
            .await
            .expect("set current failed");
        id = session.id;
    }

    let kv = Arc::new(SledStore::new_with_path(&path).expect("reopen failed"))
        as Arc<dyn coachlog::KeyValueStore>;
    let config = Arc::new(ConfigManager::new(kv.clone()));
    let history = ChatHistoryStore::new(kv, config);
    history.initialize().await.expect("initialize failed");

    let loaded = history
        .session(&id)
        .await
        .expect("load failed")
        .expect("session missing after reopen");
    assert_eq!(loaded.messages.len(), 1);
    assert_eq!(
        history
            .current_session_id()
            .await
            .expect("current failed")
            .as_deref(),
        Some(id.as_str())
    );
}

#[tokio::test]
async fn test_new_chat_scenario_titles_from_first_user_message() {
    let services = sled_services().await;

    let mut session = services.history.create_session(None);
    session.push_message(ChatMessage::welcome());
    session.push_message(ChatMessage::user("Plan my next week workouts."));
    session.title = coachlog::generate_title(&session.messages);
    services
        .history
        .save_session(&mut session)
        .await
        .expect("save failed");

    let listed = services
        .history
        .sessions(Some(1))
        .await
        .expect("list failed");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].title, "Plan my next week workouts");
    assert_eq!(listed[0].metadata.message_count, 2);
}

#[tokio::test]
async fn test_corrupt_record_removed_from_storage_and_index() {
    let services = sled_services().await;
    let keep = save_with_message(&services, "healthy session").await;
    let doomed = save_with_message(&services, "doomed session").await;

    // Corrupt the record behind the store's back.
    services
        .kv
        .set(&session_key(&doomed.id), "{\"id\": 12}")
        .await
        .expect("corrupt failed");

    // getChat returns absent and repairs.
    assert!(services
        .history
        .session(&doomed.id)
        .await
        .expect("load failed")
        .is_none());

    // A subsequent list no longer references the corrupt id.
    let listed = services.history.sessions(None).await.expect("list failed");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, keep.id);
    assert!(!services
        .history
        .index_ids()
        .await
        .expect("index failed")
        .contains(&doomed.id));
}

#[tokio::test]
async fn test_load_session_reports_repaired_branch() {
    let services = sled_services().await;
    let session = save_with_message(&services, "soon corrupt").await;

    services
        .kv
        .set(&session_key(&session.id), "not json")
        .await
        .expect("corrupt failed");

    match services
        .history
        .load_session(&session.id)
        .await
        .expect("load failed")
    {
        SessionLoad::Repaired { id, reason } => {
            assert_eq!(id, session.id);
            assert!(!reason.is_empty());
        }
        other => panic!("expected Repaired, got {:?}", other),
    }

    // The repair is sticky: the id is now simply missing.
    assert!(matches!(
        services
            .history
            .load_session(&session.id)
            .await
            .expect("load failed"),
        SessionLoad::Missing
    ));
}

#[tokio::test]
async fn test_delete_of_unknown_id_is_noop() {
    let services = sled_services().await;
    let keep = save_with_message(&services, "keep me").await;

    services
        .history
        .delete_session("ffffffff-0000-0000-0000-000000000000")
        .await
        .expect("delete should succeed");

    let listed = services.history.sessions(None).await.expect("list failed");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, keep.id);
}

#[tokio::test]
async fn test_substring_search_finds_only_matching_session() {
    let services = sled_services().await;

    save_with_message(&services, "meal prep for the week").await;
    let target = save_with_message(&services, "my sleep has been terrible lately").await;
    save_with_message(&services, "shoulder mobility drills").await;

    let matches = services
        .history
        .search_sessions("sleep")
        .await
        .expect("search failed");
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].id, target.id);
}

#[tokio::test]
async fn test_clear_all_then_list_is_empty() {
    let services = sled_services().await;
    for i in 0..3 {
        save_with_message(&services, &format!("chat {}", i)).await;
    }

    services.history.clear_all().await.expect("clear failed");

    assert!(services
        .history
        .sessions(None)
        .await
        .expect("list failed")
        .is_empty());
    assert!(services
        .history
        .index_ids()
        .await
        .expect("index failed")
        .is_empty());
}

#[tokio::test]
async fn test_initialize_twice_has_no_observable_effect() {
    let services = sled_services().await;
    let session = save_with_message(&services, "stable").await;

    services.history.initialize().await.expect("reinit failed");

    let listed = services.history.sessions(None).await.expect("list failed");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, session.id);
}
