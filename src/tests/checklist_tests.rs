use super::{event_data, identity};
use crate::models::{
    ChecklistItem, ChecklistScope, Role, ServiceError, ShareEventRequest, CHECKLISTS_COLLECTION,
};
use crate::services::access_service;
use crate::services::checklist_sync::{
    self, add_item, clear_items, delete_item, toggle_item, ChecklistMutation, ChecklistSession,
    SyncOutcome, SyncState,
};
use crate::utils::blob_store::MemoryBlobStore;
use crate::utils::document_store::{DocumentStore, MemoryDocumentStore, Query};
use chrono::Utc;

fn item(id: &str, text: &str, completed: bool) -> ChecklistItem {
    ChecklistItem {
        id: id.to_string(),
        text: text.to_string(),
        completed,
        completed_by: completed.then(|| "U1".to_string()),
        completed_by_name: completed.then(|| "Alice".to_string()),
        completed_at: completed.then(Utc::now),
    }
}

async fn event_with_driver(store: &MemoryDocumentStore) -> String {
    let owner = identity("U1");
    let event = access_service::create_event(store, &owner, &event_data("Regional"))
        .await
        .unwrap();
    let request = ShareEventRequest {
        user_id: "driver".to_string(),
        user_name: "Dana".to_string(),
        role: Some(Role::Driver),
    };
    access_service::share(store, &event.id, &owner, &request).await.unwrap();
    event.id
}

#[test]
fn clear_keeps_items_and_resets_completion() {
    let items = vec![
        item("a", "Charge battery", true),
        item("b", "Check wheels", false),
        item("c", "Zip ties", true),
    ];

    let cleared = clear_items(&items);

    assert_eq!(cleared.len(), items.len());
    let texts: Vec<&str> = cleared.iter().map(|i| i.text.as_str()).collect();
    assert_eq!(texts, vec!["Charge battery", "Check wheels", "Zip ties"]);
    for cleared_item in &cleared {
        assert!(!cleared_item.completed);
        assert_eq!(cleared_item.completed_by, None);
        assert_eq!(cleared_item.completed_by_name, None);
        assert_eq!(cleared_item.completed_at, None);
    }
    // Input untouched
    assert!(items[0].completed);
}

#[test]
fn toggle_records_and_clears_completion() {
    let editor = identity("driver");
    let now = Utc::now();
    let items = vec![item("a", "Charge battery", false)];

    let done = toggle_item(&items, "a", &editor, now).unwrap();
    assert!(done[0].completed);
    assert_eq!(done[0].completed_by.as_deref(), Some("driver"));
    assert_eq!(done[0].completed_at, Some(now));

    let undone = toggle_item(&done, "a", &editor, now).unwrap();
    assert_eq!(undone, items);

    assert!(matches!(
        toggle_item(&items, "zzz", &editor, now),
        Err(ServiceError::NotFound(_))
    ));
}

#[test]
fn add_and_delete_validate_input() {
    let items = vec![item("a", "Charge battery", false)];

    assert!(matches!(add_item(&items, "b", "  "), Err(ServiceError::Validation(_))));
    assert!(matches!(add_item(&items, "a", "Again"), Err(ServiceError::Validation(_))));

    let added = add_item(&items, "b", " Bumpers ").unwrap();
    assert_eq!(added.len(), 2);
    assert_eq!(added[1].text, "Bumpers");

    assert!(matches!(delete_item(&items, "b"), Err(ServiceError::NotFound(_))));
    assert_eq!(delete_item(&added, "a").unwrap().len(), 1);
}

#[actix_rt::test]
async fn checklist_is_created_once_per_event_and_role() {
    let store = MemoryDocumentStore::new();
    let event_id = event_with_driver(&store).await;
    let driver = identity("driver");

    let first = checklist_sync::get_or_create(&store, &event_id, &driver, ChecklistScope::Driver)
        .await
        .unwrap();
    let second = checklist_sync::get_or_create(&store, &event_id, &driver, ChecklistScope::Driver)
        .await
        .unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(first.revision, 0);

    assert_eq!(
        checklist_sync::get_or_create(&store, &event_id, &driver, ChecklistScope::Engineer).await,
        Err(ServiceError::Forbidden)
    );
}

#[actix_rt::test]
async fn optimistic_change_is_visible_before_persisting() {
    let store = MemoryDocumentStore::new();
    let event_id = event_with_driver(&store).await;
    let mut session =
        ChecklistSession::open(&store, &event_id, identity("driver"), ChecklistScope::Driver)
            .await
            .unwrap();

    session.stage(&ChecklistMutation::add("Charge battery")).unwrap();
    assert_eq!(session.state(), SyncState::Local);
    assert_eq!(session.items().len(), 1);

    let stored = checklist_sync::load_checklist(&store, &event_id, ChecklistScope::Driver)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.items.is_empty());

    assert_eq!(session.persist(&store).await, SyncOutcome::Reconciled { revision: 1 });
    assert_eq!(session.state(), SyncState::Reconciled);
}

#[actix_rt::test]
async fn failed_save_reverts_to_last_persisted_list() {
    let store = MemoryDocumentStore::new();
    let event_id = event_with_driver(&store).await;
    let mut session =
        ChecklistSession::open(&store, &event_id, identity("driver"), ChecklistScope::Driver)
            .await
            .unwrap();

    session
        .apply(&store, ChecklistMutation::add("Charge battery"))
        .await
        .unwrap();
    let persisted = session.items().to_vec();
    let item_id = persisted[0].id.clone();

    store.set_fail_writes(true);
    let outcome = session
        .apply(&store, ChecklistMutation::Toggle { item_id })
        .await
        .unwrap();

    assert!(matches!(outcome, SyncOutcome::Reverted { .. }));
    assert_eq!(session.items(), persisted.as_slice());
    assert!(!session.items()[0].completed);
    assert_eq!(session.state(), SyncState::Reconciled);
    assert_eq!(session.notices().len(), 1);
}

#[actix_rt::test]
async fn failed_reload_falls_back_to_last_persisted_list() {
    let store = MemoryDocumentStore::new();
    let event_id = event_with_driver(&store).await;
    let mut session =
        ChecklistSession::open(&store, &event_id, identity("driver"), ChecklistScope::Driver)
            .await
            .unwrap();
    session
        .apply(&store, ChecklistMutation::add("Charge battery"))
        .await
        .unwrap();
    let persisted = session.items().to_vec();

    store.set_fail_writes(true);
    store.set_fail_reads(true);
    let outcome = session.apply(&store, ChecklistMutation::Clear).await.unwrap();
    session.stage(&ChecklistMutation::add("Spare motor")).unwrap();
    let second = session.persist(&store).await;

    assert!(matches!(outcome, SyncOutcome::Reverted { .. }));
    assert!(matches!(second, SyncOutcome::Reverted { .. }));
    assert_eq!(session.items(), persisted.as_slice());
    assert_eq!(session.take_notices().len(), 2);
    assert!(session.notices().is_empty());
}

#[actix_rt::test]
async fn stale_session_is_reverted_to_the_other_editors_list() {
    let store = MemoryDocumentStore::new();
    let event_id = event_with_driver(&store).await;

    let mut owner_session =
        ChecklistSession::open(&store, &event_id, identity("U1"), ChecklistScope::Driver)
            .await
            .unwrap();
    let mut driver_session =
        ChecklistSession::open(&store, &event_id, identity("driver"), ChecklistScope::Driver)
            .await
            .unwrap();

    owner_session
        .apply(&store, ChecklistMutation::add("Owner item"))
        .await
        .unwrap();
    let outcome = driver_session
        .apply(&store, ChecklistMutation::add("Driver item"))
        .await
        .unwrap();

    assert!(matches!(outcome, SyncOutcome::Reverted { .. }));
    let texts: Vec<&str> = driver_session.items().iter().map(|i| i.text.as_str()).collect();
    assert_eq!(texts, vec!["Owner item"]);
    assert_eq!(driver_session.revision(), 1);

    // Retrying on top of the fresh revision succeeds
    let retry = driver_session
        .apply(&store, ChecklistMutation::add("Driver item"))
        .await
        .unwrap();
    assert_eq!(retry, SyncOutcome::Reconciled { revision: 2 });
}

#[actix_rt::test]
async fn removed_collaborator_cannot_save() {
    let store = MemoryDocumentStore::new();
    let event_id = event_with_driver(&store).await;
    let mut session =
        ChecklistSession::open(&store, &event_id, identity("driver"), ChecklistScope::Driver)
            .await
            .unwrap();

    access_service::unshare(&store, &event_id, &identity("U1"), "driver")
        .await
        .unwrap();

    let outcome = session
        .apply(&store, ChecklistMutation::add("Sneaky"))
        .await
        .unwrap();
    assert!(matches!(outcome, SyncOutcome::Reverted { .. }));
    // The stored list is no longer theirs to see
    assert!(session.items().is_empty());

    let stored = checklist_sync::load_checklist(&store, &event_id, ChecklistScope::Driver)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.items.is_empty());
}

#[actix_rt::test]
async fn save_after_event_delete_leaves_no_checklist_behind() {
    let store = MemoryDocumentStore::new();
    let blobs = MemoryBlobStore::new("http://localhost:9090");
    let event_id = event_with_driver(&store).await;
    let mut session =
        ChecklistSession::open(&store, &event_id, identity("driver"), ChecklistScope::Driver)
            .await
            .unwrap();
    session
        .apply(&store, ChecklistMutation::add("Charge battery"))
        .await
        .unwrap();

    access_service::delete_event(&store, &blobs, &event_id, &identity("U1"))
        .await
        .unwrap();

    let outcome = session
        .apply(&store, ChecklistMutation::add("Spare motor"))
        .await
        .unwrap();

    assert!(matches!(outcome, SyncOutcome::Reverted { .. }));
    assert!(session.items().is_empty());
    assert_eq!(session.state(), SyncState::Reconciled);
    let remaining = store.list(CHECKLISTS_COLLECTION, &Query::new()).await.unwrap();
    assert!(remaining.is_empty());
    assert!(matches!(
        session.reload(&store).await,
        Err(ServiceError::NotFound(_))
    ));
}

#[actix_rt::test]
async fn invalid_mutation_leaves_view_alone() {
    let store = MemoryDocumentStore::new();
    let event_id = event_with_driver(&store).await;
    let mut session =
        ChecklistSession::open(&store, &event_id, identity("driver"), ChecklistScope::Driver)
            .await
            .unwrap();

    let result = session
        .apply(
            &store,
            ChecklistMutation::Delete {
                item_id: "missing".to_string(),
            },
        )
        .await;

    assert!(matches!(result, Err(ServiceError::NotFound(_))));
    assert_eq!(session.state(), SyncState::Reconciled);
    assert!(session.items().is_empty());
}

#[actix_rt::test]
async fn clear_checklist_resets_stored_items() {
    let store = MemoryDocumentStore::new();
    let event_id = event_with_driver(&store).await;
    let driver = identity("driver");
    let mut session = ChecklistSession::open(&store, &event_id, driver.clone(), ChecklistScope::Driver)
        .await
        .unwrap();
    session
        .apply(&store, ChecklistMutation::add("Charge battery"))
        .await
        .unwrap();
    let item_id = session.items()[0].id.clone();
    session
        .apply(&store, ChecklistMutation::Toggle { item_id })
        .await
        .unwrap();

    let cleared = checklist_sync::clear_checklist(&store, &event_id, &driver, ChecklistScope::Driver)
        .await
        .unwrap();

    assert_eq!(cleared.items.len(), 1);
    assert!(!cleared.items[0].completed);
    assert_eq!(cleared.revision, 3);
    assert_eq!(cleared.last_edited_by.as_deref(), Some("driver"));
}
