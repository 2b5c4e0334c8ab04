// scoutshare-service/src/services/access_service.rs
//! Event access model: ownership, collaborators and their roles.
//!
//! The synchronous functions at the top mutate an [`Event`] snapshot and
//! hold the collaborator invariants. The async functions below load the
//! event, check the caller's rights and persist the result.

use crate::models::{
    user_key, Checklist, ChecklistScope, Collaborator, Event, EventData, EventDocument, Identity,
    PitScout, Role, ServiceError, ShareEventRequest, CHECKLISTS_COLLECTION, EVENTS_COLLECTION,
    MATCH_SCOUTS_COLLECTION, PIT_IMAGES_BUCKET, PIT_SCOUTS_COLLECTION,
};
use crate::services::permissions;
use crate::utils::blob_store::BlobStore;
use crate::utils::document_store::{DocumentStore, Query, StoredDocument};
use crate::utils::documents::{from_document, to_document};
use chrono::Utc;
use futures::future::try_join_all;
use indexmap::IndexMap;
use log::{debug, error, info, warn};
use std::collections::HashSet;
use uuid::Uuid;

fn require_non_blank(value: &str, what: &str) -> Result<String, ServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::Validation(format!("{} must not be empty", what)));
    }
    Ok(trimmed.to_string())
}

/// Adds a collaborator, or overwrites the name and role of an existing one
/// in place.
pub fn share_event(
    event: &mut Event,
    user_id: &str,
    user_name: &str,
    role: Role,
) -> Result<(), ServiceError> {
    let user_id = require_non_blank(user_id, "User id")?;
    let user_name = require_non_blank(user_name, "User name")?;

    if event.is_owner(&user_id) {
        return Err(ServiceError::Validation(
            "Cannot share an event with its owner".to_string(),
        ));
    }

    match event.collaborators.get_mut(&user_id) {
        Some(existing) => {
            existing.name = user_name;
            existing.role = role;
        }
        None => {
            event.collaborators.insert(
                user_id,
                Collaborator {
                    name: user_name,
                    role,
                },
            );
        }
    }
    Ok(())
}

/// Removes a collaborator. Returns whether anything was removed; removing a
/// user who was never shared, the owner included, is not an error here.
/// [`unshare`] refuses an owner target before reaching this.
pub fn unshare_event(event: &mut Event, user_id: &str) -> bool {
    event.collaborators.shift_remove(user_key(user_id)).is_some()
}

pub fn update_user_role(event: &mut Event, user_id: &str, role: Role) -> Result<(), ServiceError> {
    match event.collaborators.get_mut(user_key(user_id)) {
        Some(collaborator) => {
            collaborator.role = role;
            Ok(())
        }
        None => Err(ServiceError::NotFound(format!(
            "User {} is not a collaborator on event {}",
            user_id, event.id
        ))),
    }
}

/// The owner resolves to `Admin` without appearing in the collaborator map.
pub fn get_user_role(event: &Event, user_id: &str) -> Option<Role> {
    if event.is_owner(user_id) {
        return Some(Role::Admin);
    }
    event.collaborator(user_id).map(|c| c.role)
}

fn validate_event_data(data: &EventData) -> Result<(String, String), ServiceError> {
    let name = require_non_blank(&data.name, "Event name")?;
    if data.end_date < data.start_date {
        return Err(ServiceError::Validation(
            "Event end date must not be before its start date".to_string(),
        ));
    }
    Ok((name, data.location.trim().to_string()))
}

fn event_from_stored(doc: StoredDocument) -> Result<Event, ServiceError> {
    let id = doc.id.clone();
    let fields: EventDocument = from_document(doc)?;
    Event::from_document(&id, fields)
}

pub async fn create_event(
    store: &dyn DocumentStore,
    owner: &Identity,
    data: &EventData,
) -> Result<Event, ServiceError> {
    let (name, location) = validate_event_data(data)?;
    let now = Utc::now();

    let event = Event {
        id: Uuid::new_v4().to_string(),
        name,
        location,
        start_date: data.start_date,
        end_date: data.end_date,
        owner_id: owner.user_id.clone(),
        owner_name: owner.user_name.clone(),
        is_active: true,
        collaborators: IndexMap::new(),
        created_at: now,
        updated_at: now,
    };

    store
        .create(EVENTS_COLLECTION, &event.id, to_document(&event.to_document())?)
        .await?;

    info!("✅ Event created: {} owned by {}", event.id, event.owner_id);
    Ok(event)
}

pub async fn load_event(store: &dyn DocumentStore, event_id: &str) -> Result<Event, ServiceError> {
    match store.get(EVENTS_COLLECTION, event_id).await? {
        Some(doc) => event_from_stored(doc),
        None => {
            debug!("Event not found: {}", event_id);
            Err(ServiceError::NotFound(format!("Event {}", event_id)))
        }
    }
}

/// Loads an event the caller is allowed to see.
pub async fn load_visible_event(
    store: &dyn DocumentStore,
    event_id: &str,
    actor: &Identity,
) -> Result<Event, ServiceError> {
    let event = load_event(store, event_id).await?;
    if !permissions::can_view(&event, &actor.user_id) {
        error!("❌ User: {} doesn't have access to event: {}", actor.user_id, event_id);
        return Err(ServiceError::Forbidden);
    }
    Ok(event)
}

async fn save_event(store: &dyn DocumentStore, event: &mut Event) -> Result<(), ServiceError> {
    event.updated_at = Utc::now();
    store
        .update(EVENTS_COLLECTION, &event.id, to_document(&event.to_document())?)
        .await?;
    Ok(())
}

/// Events the user owns plus events shared with them, newest first.
pub async fn list_events_for_user(
    store: &dyn DocumentStore,
    user_id: &str,
) -> Result<Vec<Event>, ServiceError> {
    let owned = store
        .list(EVENTS_COLLECTION, &Query::new().filter_eq("ownerId", user_id))
        .await?;
    let shared = store
        .list(EVENTS_COLLECTION, &Query::new().array_contains("sharedWith", user_id))
        .await?;

    let mut seen = HashSet::new();
    let mut events = Vec::new();
    for doc in owned.into_iter().chain(shared) {
        if !seen.insert(doc.id.clone()) {
            continue;
        }
        match event_from_stored(doc) {
            Ok(event) => events.push(event),
            Err(e) => warn!("Skipping unreadable event: {}", e),
        }
    }

    events.sort_by(|a, b| b.start_date.cmp(&a.start_date));
    Ok(events)
}

pub async fn update_event_details(
    store: &dyn DocumentStore,
    event_id: &str,
    actor: &Identity,
    data: &EventData,
) -> Result<Event, ServiceError> {
    let mut event = load_visible_event(store, event_id, actor).await?;
    if !permissions::can_edit_details(&event, &actor.user_id) {
        error!("❌ Only the owner can edit event: {}", event_id);
        return Err(ServiceError::Forbidden);
    }

    let (name, location) = validate_event_data(data)?;
    event.name = name;
    event.location = location;
    event.start_date = data.start_date;
    event.end_date = data.end_date;
    save_event(store, &mut event).await?;

    info!("✅ Event details updated: {}", event_id);
    Ok(event)
}

pub async fn set_event_active(
    store: &dyn DocumentStore,
    event_id: &str,
    actor: &Identity,
    active: bool,
) -> Result<Event, ServiceError> {
    let mut event = load_visible_event(store, event_id, actor).await?;
    if !permissions::can_edit_details(&event, &actor.user_id) {
        error!("❌ Only the owner can change whether event {} is active", event_id);
        return Err(ServiceError::Forbidden);
    }

    event.is_active = active;
    save_event(store, &mut event).await?;

    info!("✅ Event {} active={}", event_id, active);
    Ok(event)
}

pub async fn share(
    store: &dyn DocumentStore,
    event_id: &str,
    actor: &Identity,
    request: &ShareEventRequest,
) -> Result<Event, ServiceError> {
    let mut event = load_visible_event(store, event_id, actor).await?;
    if !permissions::can_manage_sharing(&event, &actor.user_id) {
        error!("❌ User: {} can't manage sharing on event: {}", actor.user_id, event_id);
        return Err(ServiceError::Forbidden);
    }

    let role = request.role.unwrap_or_default();
    share_event(&mut event, &request.user_id, &request.user_name, role)?;
    save_event(store, &mut event).await?;

    info!("✅ Event {} shared with {} as {}", event_id, request.user_id, role);
    Ok(event)
}

/// Collaborators may always remove themselves; removing anyone else needs
/// sharing rights. Returns whether a collaborator was removed.
///
/// Leaving an event twice is a no-op, even though the second call comes from
/// a user who can no longer see the event. The owner can't be targeted:
/// ownership is not a share and is never given up this way.
pub async fn unshare(
    store: &dyn DocumentStore,
    event_id: &str,
    actor: &Identity,
    target_user_id: &str,
) -> Result<bool, ServiceError> {
    let target_user_id = require_non_blank(target_user_id, "User id")?;
    let mut event = load_event(store, event_id).await?;

    let is_self_removal = user_key(&actor.user_id) == target_user_id;
    let already_gone =
        event.collaborator(&target_user_id).is_none() && !event.is_owner(&target_user_id);
    if is_self_removal && already_gone {
        debug!("User {} already left event {}", target_user_id, event_id);
        return Ok(false);
    }

    if !permissions::can_view(&event, &actor.user_id) {
        error!("❌ User: {} doesn't have access to event: {}", actor.user_id, event_id);
        return Err(ServiceError::Forbidden);
    }

    if event.is_owner(&target_user_id) {
        return Err(ServiceError::Validation(
            "Cannot remove the owner from an event".to_string(),
        ));
    }

    if !is_self_removal && !permissions::can_manage_sharing(&event, &actor.user_id) {
        error!("❌ User: {} can't remove collaborators from event: {}", actor.user_id, event_id);
        return Err(ServiceError::Forbidden);
    }

    if unshare_event(&mut event, &target_user_id) {
        save_event(store, &mut event).await?;
        info!("✅ User {} removed from event {}", target_user_id, event_id);
        Ok(true)
    } else {
        debug!("User {} was not shared on event {}", target_user_id, event_id);
        Ok(false)
    }
}

pub async fn change_role(
    store: &dyn DocumentStore,
    event_id: &str,
    actor: &Identity,
    target_user_id: &str,
    role: Role,
) -> Result<Event, ServiceError> {
    let mut event = load_visible_event(store, event_id, actor).await?;
    if !permissions::can_manage_sharing(&event, &actor.user_id) {
        error!("❌ User: {} can't change roles on event: {}", actor.user_id, event_id);
        return Err(ServiceError::Forbidden);
    }

    update_user_role(&mut event, target_user_id, role)?;
    save_event(store, &mut event).await?;

    info!("✅ User {} on event {} is now {}", target_user_id, event_id, role);
    Ok(event)
}

/// Deletes the event and everything recorded under it.
pub async fn delete_event(
    store: &dyn DocumentStore,
    blobs: &dyn BlobStore,
    event_id: &str,
    actor: &Identity,
) -> Result<(), ServiceError> {
    let event = load_visible_event(store, event_id, actor).await?;
    if !permissions::can_delete_event(&event, &actor.user_id) {
        error!("❌ Only the owner can delete event: {}", event_id);
        return Err(ServiceError::Forbidden);
    }

    let by_event = Query::new().filter_eq("eventId", event_id);

    let match_scouts = store.list(MATCH_SCOUTS_COLLECTION, &by_event).await?;
    try_join_all(
        match_scouts
            .iter()
            .map(|doc| store.delete(MATCH_SCOUTS_COLLECTION, &doc.id)),
    )
    .await?;

    let pit_scouts = store.list(PIT_SCOUTS_COLLECTION, &by_event).await?;
    for doc in &pit_scouts {
        let image = from_document::<PitScout>(doc.clone())
            .ok()
            .and_then(|scout| scout.image_file_id);
        if let Some(file_id) = image {
            if let Err(e) = blobs.delete(PIT_IMAGES_BUCKET, &file_id).await {
                // Orphaned images are tolerated
                warn!("Failed to delete pit image {}: {}", file_id, e);
            }
        }
    }
    try_join_all(
        pit_scouts
            .iter()
            .map(|doc| store.delete(PIT_SCOUTS_COLLECTION, &doc.id)),
    )
    .await?;

    for scope in ChecklistScope::all() {
        let checklist_id = Checklist::id_for(event_id, *scope);
        if store.get(CHECKLISTS_COLLECTION, &checklist_id).await?.is_some() {
            store.delete(CHECKLISTS_COLLECTION, &checklist_id).await?;
        }
    }

    store.delete(EVENTS_COLLECTION, event_id).await?;

    info!(
        "✅ Event {} deleted with {} match scouts and {} pit scouts",
        event_id,
        match_scouts.len(),
        pit_scouts.len()
    );
    Ok(())
}
