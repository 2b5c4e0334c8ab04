use crate::utils::document_store::{
    Direction, Document, DocumentStore, FileDocumentStore, MemoryDocumentStore, Query,
};
use serde_json::json;
use std::fs;
use uuid::Uuid;

fn doc(value: serde_json::Value) -> Document {
    value.as_object().cloned().expect("object literal")
}

async fn seed(store: &dyn DocumentStore) {
    store
        .create("scouts", "a", doc(json!({"eventId": "E1", "match": 3, "tags": ["fast"]})))
        .await
        .unwrap();
    store
        .create("scouts", "b", doc(json!({"eventId": "E1", "match": 1, "tags": []})))
        .await
        .unwrap();
    store
        .create("scouts", "c", doc(json!({"eventId": "E2", "match": 2, "tags": ["fast"]})))
        .await
        .unwrap();
    store
        .create("scouts", "d", doc(json!({"eventId": "E1"})))
        .await
        .unwrap();
}

async fn check_queries(store: &dyn DocumentStore) {
    let ids = |docs: Vec<crate::utils::document_store::StoredDocument>| {
        docs.into_iter().map(|d| d.id).collect::<Vec<_>>()
    };

    let ordered = store
        .list(
            "scouts",
            &Query::new()
                .filter_eq("eventId", "E1")
                .order_by("match", Direction::Ascending),
        )
        .await
        .unwrap();
    // Missing sort fields go last
    assert_eq!(ids(ordered), vec!["b", "a", "d"]);

    let fast = store
        .list("scouts", &Query::new().array_contains("tags", "fast"))
        .await
        .unwrap();
    assert_eq!(ids(fast), vec!["a", "c"]);

    let top = store
        .list(
            "scouts",
            &Query::new().order_by("match", Direction::Descending).limit(2),
        )
        .await
        .unwrap();
    assert_eq!(ids(top), vec!["d", "a"]);

    assert!(store.list("missing", &Query::new()).await.unwrap().is_empty());
}

async fn check_writes(store: &dyn DocumentStore) {
    assert!(store.create("scouts", "a", Document::new()).await.is_err());

    let merged = store
        .update("scouts", "a", doc(json!({"match": 4, "notes": "ok"})))
        .await
        .unwrap();
    assert_eq!(merged.fields.get("eventId"), Some(&json!("E1")));
    assert_eq!(merged.fields.get("match"), Some(&json!(4)));
    assert_eq!(
        store.get("scouts", "a").await.unwrap().unwrap().fields,
        merged.fields
    );

    assert!(store.update("scouts", "zzz", Document::new()).await.is_err());
    store.delete("scouts", "a").await.unwrap();
    assert!(store.get("scouts", "a").await.unwrap().is_none());
    assert!(store.delete("scouts", "a").await.is_err());
}

#[actix_rt::test]
async fn memory_store_answers_queries() {
    let store = MemoryDocumentStore::new();
    seed(&store).await;
    check_queries(&store).await;
    check_writes(&store).await;
}

#[actix_rt::test]
async fn memory_store_failure_injection() {
    let store = MemoryDocumentStore::new();
    seed(&store).await;

    store.set_fail_writes(true);
    assert!(store.update("scouts", "a", Document::new()).await.is_err());
    assert!(store.get("scouts", "a").await.unwrap().is_some());

    store.set_fail_writes(false);
    store.set_fail_reads(true);
    assert!(store.get("scouts", "a").await.is_err());
    assert!(store.list("scouts", &Query::new()).await.is_err());
}

#[actix_rt::test]
async fn file_store_matches_memory_store() {
    let root = std::env::temp_dir().join(format!("scoutshare-test-{}", Uuid::new_v4()));
    let store = FileDocumentStore::new(&root).unwrap();

    seed(&store).await;
    check_queries(&store).await;
    check_writes(&store).await;

    assert!(root.join("scouts").join("b.json").exists());
    assert!(store.get("scouts", "../escape").await.is_err());
    assert!(store.create("..", "x", Document::new()).await.is_err());

    // Clean up
    fs::remove_dir_all(&root).unwrap();
}
