use tempfile::TempDir;

use classpulse::config::EvictionPolicy;
use classpulse::feedback::{FeedbackItem, FeedbackKind};
use classpulse::store::HistoryStore;

#[tokio::test]
async fn history_survives_restart_with_fields_intact() {
    let tmp = TempDir::new().unwrap();
    let db_path = tmp.path().join("history.db");

    let original = FeedbackItem::new(
        FeedbackKind::Question,
        "what does the second term mean?",
        Some("classpulse/0.1.0".into()),
    )
    .unwrap();

    {
        let store = HistoryStore::open(&db_path, 50, EvictionPolicy::Oldest)
            .await
            .unwrap();
        store.append(&original).await.unwrap();
    }

    // Fresh pool over the same file simulates a process restart.
    let store = HistoryStore::open(&db_path, 50, EvictionPolicy::Oldest)
        .await
        .unwrap();
    let history = store.read_all().await.unwrap();

    assert_eq!(history.len(), 1);
    let loaded = &history[0];
    assert_eq!(loaded.id, original.id);
    assert_eq!(loaded.kind, original.kind);
    assert_eq!(loaded.emoji, original.emoji);
    assert_eq!(loaded.text, original.text);
    assert_eq!(loaded.timestamp, original.timestamp);
    assert_eq!(loaded.user_agent, original.user_agent);
    // Restart must not implicitly mutate delivery state.
    assert!(loaded.pending);
}

#[tokio::test]
async fn ordering_and_capacity_survive_restart() {
    let tmp = TempDir::new().unwrap();
    let db_path = tmp.path().join("history.db");

    {
        let store = HistoryStore::open(&db_path, 5, EvictionPolicy::Oldest)
            .await
            .unwrap();
        for i in 0..8 {
            store
                .append(&FeedbackItem::new(FeedbackKind::Understand, &format!("n{i}"), None).unwrap())
                .await
                .unwrap();
        }
    }

    let store = HistoryStore::open(&db_path, 5, EvictionPolicy::Oldest)
        .await
        .unwrap();
    let history = store.read_all().await.unwrap();

    let texts: Vec<_> = history.iter().map(|i| i.text.as_str()).collect();
    assert_eq!(texts, ["n7", "n6", "n5", "n4", "n3"]);
}

#[tokio::test]
async fn removal_is_durable_across_restart() {
    let tmp = TempDir::new().unwrap();
    let db_path = tmp.path().join("history.db");

    let delivered = FeedbackItem::new(FeedbackKind::Repeat, "sent", None).unwrap();
    let kept = FeedbackItem::new(FeedbackKind::Confused, "kept", None).unwrap();

    {
        let store = HistoryStore::open(&db_path, 50, EvictionPolicy::Oldest)
            .await
            .unwrap();
        store.append(&delivered).await.unwrap();
        store.append(&kept).await.unwrap();
        assert!(store.remove(&delivered.id).await.unwrap());
    }

    let store = HistoryStore::open(&db_path, 50, EvictionPolicy::Oldest)
        .await
        .unwrap();
    let history = store.read_all().await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, kept.id);
}
