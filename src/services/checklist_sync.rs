// scoutshare-service/src/services/checklist_sync.rs
//! Role-scoped checklists and the optimistic editing session used against
//! them.
//!
//! A checklist is saved as a whole item list. Every save carries the
//! revision the editor started from; a save against a newer stored revision
//! is refused with `Conflict` instead of silently overwriting the other
//! editor's work. The store offers no compare-and-swap, so the check is a
//! read followed by a write and two saves landing between those steps can
//! still both succeed.

use crate::models::{
    Checklist, ChecklistItem, ChecklistScope, Identity, ServiceError, CHECKLISTS_COLLECTION,
};
use crate::services::{access_service, permissions};
use crate::utils::document_store::DocumentStore;
use crate::utils::documents::{from_document, to_document};
use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map};
use std::collections::HashSet;
use uuid::Uuid;

// Pure list transforms. None of these mutate their input.

pub fn toggle_item(
    items: &[ChecklistItem],
    item_id: &str,
    editor: &Identity,
    now: DateTime<Utc>,
) -> Result<Vec<ChecklistItem>, ServiceError> {
    if !items.iter().any(|item| item.id == item_id) {
        return Err(ServiceError::NotFound(format!("Checklist item {}", item_id)));
    }

    Ok(items
        .iter()
        .map(|item| {
            if item.id != item_id {
                return item.clone();
            }
            if item.completed {
                ChecklistItem {
                    completed: false,
                    completed_by: None,
                    completed_by_name: None,
                    completed_at: None,
                    ..item.clone()
                }
            } else {
                ChecklistItem {
                    completed: true,
                    completed_by: Some(editor.user_id.clone()),
                    completed_by_name: Some(editor.user_name.clone()),
                    completed_at: Some(now),
                    ..item.clone()
                }
            }
        })
        .collect())
}

pub fn add_item(
    items: &[ChecklistItem],
    item_id: &str,
    text: &str,
) -> Result<Vec<ChecklistItem>, ServiceError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ServiceError::Validation(
            "Checklist item text must not be empty".to_string(),
        ));
    }
    if items.iter().any(|item| item.id == item_id) {
        return Err(ServiceError::Validation(format!(
            "Checklist item {} already exists",
            item_id
        )));
    }

    let mut next = items.to_vec();
    next.push(ChecklistItem {
        id: item_id.to_string(),
        text: text.to_string(),
        completed: false,
        completed_by: None,
        completed_by_name: None,
        completed_at: None,
    });
    Ok(next)
}

pub fn delete_item(
    items: &[ChecklistItem],
    item_id: &str,
) -> Result<Vec<ChecklistItem>, ServiceError> {
    if !items.iter().any(|item| item.id == item_id) {
        return Err(ServiceError::NotFound(format!("Checklist item {}", item_id)));
    }
    Ok(items.iter().filter(|item| item.id != item_id).cloned().collect())
}

/// Resets every item to not completed, keeping the items and their order.
pub fn clear_items(items: &[ChecklistItem]) -> Vec<ChecklistItem> {
    items
        .iter()
        .map(|item| ChecklistItem {
            completed: false,
            completed_by: None,
            completed_by_name: None,
            completed_at: None,
            ..item.clone()
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChecklistMutation {
    Toggle { item_id: String },
    Add { item_id: String, text: String },
    Delete { item_id: String },
    Clear,
}

impl ChecklistMutation {
    pub fn add(text: impl Into<String>) -> Self {
        ChecklistMutation::Add {
            item_id: Uuid::new_v4().to_string(),
            text: text.into(),
        }
    }

    pub fn apply(
        &self,
        items: &[ChecklistItem],
        editor: &Identity,
        now: DateTime<Utc>,
    ) -> Result<Vec<ChecklistItem>, ServiceError> {
        match self {
            ChecklistMutation::Toggle { item_id } => toggle_item(items, item_id, editor, now),
            ChecklistMutation::Add { item_id, text } => add_item(items, item_id, text),
            ChecklistMutation::Delete { item_id } => delete_item(items, item_id),
            ChecklistMutation::Clear => Ok(clear_items(items)),
        }
    }
}

fn validate_items(items: &[ChecklistItem]) -> Result<(), ServiceError> {
    let mut ids = HashSet::new();
    for item in items {
        if item.id.trim().is_empty() {
            return Err(ServiceError::Validation(
                "Checklist item id must not be empty".to_string(),
            ));
        }
        if item.text.trim().is_empty() {
            return Err(ServiceError::Validation(format!(
                "Checklist item {} has no text",
                item.id
            )));
        }
        if !ids.insert(item.id.as_str()) {
            return Err(ServiceError::Validation(format!(
                "Duplicate checklist item {}",
                item.id
            )));
        }
    }
    Ok(())
}

async fn check_checklist_access(
    store: &dyn DocumentStore,
    event_id: &str,
    actor: &Identity,
    scope: ChecklistScope,
) -> Result<(), ServiceError> {
    let event = access_service::load_visible_event(store, event_id, actor).await?;
    if !permissions::can_edit_checklist(&event, &actor.user_id, scope) {
        error!(
            "❌ User: {} can't use the {} checklist of event: {}",
            actor.user_id, scope, event_id
        );
        return Err(ServiceError::Forbidden);
    }
    Ok(())
}

pub async fn load_checklist(
    store: &dyn DocumentStore,
    event_id: &str,
    scope: ChecklistScope,
) -> Result<Option<Checklist>, ServiceError> {
    let id = Checklist::id_for(event_id, scope);
    match store.get(CHECKLISTS_COLLECTION, &id).await? {
        Some(doc) => Ok(Some(from_document(doc)?)),
        None => Ok(None),
    }
}

// Checklist ids are derived from (event, scope), so a second create for the
// same pair fails in the store and we read back the winner.
async fn ensure_checklist(
    store: &dyn DocumentStore,
    event_id: &str,
    scope: ChecklistScope,
) -> Result<Checklist, ServiceError> {
    if let Some(existing) = load_checklist(store, event_id, scope).await? {
        return Ok(existing);
    }

    let checklist = Checklist::empty(event_id, scope);
    match store
        .create(CHECKLISTS_COLLECTION, &checklist.id, to_document(&checklist)?)
        .await
    {
        Ok(_) => {
            info!("✅ Created {} checklist for event {}", scope, event_id);
            Ok(checklist)
        }
        Err(create_err) => match load_checklist(store, event_id, scope).await? {
            Some(existing) => Ok(existing),
            None => Err(create_err.into()),
        },
    }
}

// Like get_or_create, but a missing checklist is NotFound
async fn load_existing(
    store: &dyn DocumentStore,
    event_id: &str,
    actor: &Identity,
    scope: ChecklistScope,
) -> Result<Checklist, ServiceError> {
    check_checklist_access(store, event_id, actor, scope).await?;
    load_checklist(store, event_id, scope).await?.ok_or_else(|| {
        ServiceError::NotFound(format!("Checklist {}", Checklist::id_for(event_id, scope)))
    })
}

/// Returns the checklist for (event, scope), creating an empty one on first
/// access.
pub async fn get_or_create(
    store: &dyn DocumentStore,
    event_id: &str,
    actor: &Identity,
    scope: ChecklistScope,
) -> Result<Checklist, ServiceError> {
    check_checklist_access(store, event_id, actor, scope).await?;
    ensure_checklist(store, event_id, scope).await
}

/// Overwrites the item list if the stored revision still matches
/// `expected_revision`.
pub async fn save_items(
    store: &dyn DocumentStore,
    event_id: &str,
    actor: &Identity,
    scope: ChecklistScope,
    items: Vec<ChecklistItem>,
    expected_revision: u64,
) -> Result<Checklist, ServiceError> {
    // Re-reads the event so a collaborator removed mid-session can't write
    check_checklist_access(store, event_id, actor, scope).await?;
    validate_items(&items)?;

    let current = ensure_checklist(store, event_id, scope).await?;
    if current.revision != expected_revision {
        warn!(
            "Stale checklist save on {}: expected revision {}, stored {}",
            current.id, expected_revision, current.revision
        );
        return Err(ServiceError::Conflict(format!(
            "Checklist {} was changed by someone else (revision {})",
            current.id, current.revision
        )));
    }

    let now = Utc::now();
    let revision = current.revision + 1;
    let mut fields = Map::new();
    fields.insert("items".to_string(), json!(items));
    fields.insert("revision".to_string(), json!(revision));
    fields.insert("lastEditedBy".to_string(), json!(actor.user_id));
    fields.insert("lastEditedByName".to_string(), json!(actor.user_name));
    fields.insert("lastEditedAt".to_string(), json!(now));

    let stored = store.update(CHECKLISTS_COLLECTION, &current.id, fields).await?;
    debug!("Saved checklist {} at revision {}", current.id, revision);
    from_document(stored)
}

pub async fn clear_checklist(
    store: &dyn DocumentStore,
    event_id: &str,
    actor: &Identity,
    scope: ChecklistScope,
) -> Result<Checklist, ServiceError> {
    let current = get_or_create(store, event_id, actor, scope).await?;
    let cleared = clear_items(&current.items);
    save_items(store, event_id, actor, scope, cleared, current.revision).await
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncState {
    // The view holds changes not yet confirmed by the store
    Local,
    Reconciled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncNotice {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    Reconciled { revision: u64 },
    Reverted { notice: SyncNotice },
}

/// One editor's view of a checklist.
///
/// Mutations are applied to the view immediately (`stage`) and written in
/// the background (`persist`). A failed write never leaves the view ahead of
/// the store: the session reloads the stored checklist, or falls back to the
/// last list it saw persisted, and records a notice for the user.
pub struct ChecklistSession {
    event_id: String,
    scope: ChecklistScope,
    editor: Identity,
    view: Vec<ChecklistItem>,
    persisted: Checklist,
    state: SyncState,
    notices: Vec<SyncNotice>,
}

impl ChecklistSession {
    pub async fn open(
        store: &dyn DocumentStore,
        event_id: &str,
        editor: Identity,
        scope: ChecklistScope,
    ) -> Result<Self, ServiceError> {
        let persisted = get_or_create(store, event_id, &editor, scope).await?;
        Ok(Self {
            event_id: event_id.to_string(),
            scope,
            editor,
            view: persisted.items.clone(),
            persisted,
            state: SyncState::Reconciled,
            notices: Vec::new(),
        })
    }

    pub fn items(&self) -> &[ChecklistItem] {
        &self.view
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn revision(&self) -> u64 {
        self.persisted.revision
    }

    pub fn scope(&self) -> ChecklistScope {
        self.scope
    }

    pub fn notices(&self) -> &[SyncNotice] {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<SyncNotice> {
        std::mem::take(&mut self.notices)
    }

    /// Applies a mutation to the view only.
    pub fn stage(&mut self, mutation: &ChecklistMutation) -> Result<(), ServiceError> {
        self.view = mutation.apply(&self.view, &self.editor, Utc::now())?;
        self.state = SyncState::Local;
        Ok(())
    }

    pub async fn persist(&mut self, store: &dyn DocumentStore) -> SyncOutcome {
        if self.state == SyncState::Reconciled {
            return SyncOutcome::Reconciled {
                revision: self.persisted.revision,
            };
        }

        let result = save_items(
            store,
            &self.event_id,
            &self.editor,
            self.scope,
            self.view.clone(),
            self.persisted.revision,
        )
        .await;

        match result {
            Ok(saved) => {
                self.view = saved.items.clone();
                self.persisted = saved;
                self.state = SyncState::Reconciled;
                SyncOutcome::Reconciled {
                    revision: self.persisted.revision,
                }
            }
            Err(e) => {
                warn!("Reverting checklist {} after failed save: {}", self.persisted.id, e);
                let message = match e {
                    ServiceError::Conflict(_) => {
                        "Someone else changed this checklist. Showing the latest version.".to_string()
                    }
                    other => format!("Couldn't save checklist, your change was undone ({})", other),
                };
                let notice = SyncNotice { message };
                self.notices.push(notice.clone());
                self.revert(store).await;
                SyncOutcome::Reverted { notice }
            }
        }
    }

    /// Stages and persists one mutation. Invalid mutations are refused before
    /// touching the view; store failures are recovered by reverting.
    pub async fn apply(
        &mut self,
        store: &dyn DocumentStore,
        mutation: ChecklistMutation,
    ) -> Result<SyncOutcome, ServiceError> {
        self.stage(&mutation)?;
        Ok(self.persist(store).await)
    }

    /// Replaces the view with the stored checklist, dropping local changes.
    ///
    /// Never creates a checklist. If the event is gone or the editor lost
    /// access, the view is emptied and the error returned.
    pub async fn reload(&mut self, store: &dyn DocumentStore) -> Result<(), ServiceError> {
        let latest = load_existing(store, &self.event_id, &self.editor, self.scope).await;

        match latest {
            Ok(latest) => {
                self.view = latest.items.clone();
                self.persisted = latest;
                self.state = SyncState::Reconciled;
                Ok(())
            }
            Err(e @ (ServiceError::NotFound(_) | ServiceError::Forbidden)) => {
                info!("Checklist {} is no longer available: {}", self.persisted.id, e);
                self.view.clear();
                self.persisted.items.clear();
                self.state = SyncState::Reconciled;
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    async fn revert(&mut self, store: &dyn DocumentStore) {
        match self.reload(store).await {
            Ok(()) | Err(ServiceError::NotFound(_)) | Err(ServiceError::Forbidden) => {}
            Err(e) => {
                warn!(
                    "Reload of checklist {} failed, using last saved items: {}",
                    self.persisted.id, e
                );
                self.view = self.persisted.items.clone();
                self.state = SyncState::Reconciled;
            }
        }
    }
}
