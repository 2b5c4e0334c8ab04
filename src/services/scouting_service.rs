// scoutshare-service/src/services/scouting_service.rs
use crate::models::{
    Event, Identity, MatchScout, MatchScoutData, PitScout, PitScoutData, ServiceError,
    MATCH_SCOUTS_COLLECTION, PIT_IMAGES_BUCKET, PIT_SCOUTS_COLLECTION,
};
use crate::services::{access_service, permissions};
use crate::utils::blob_store::BlobStore;
use crate::utils::document_store::{Direction, DocumentStore, Query};
use crate::utils::documents::{from_document, to_document};
use chrono::Utc;
use log::{error, info, warn};
use serde::de::DeserializeOwned;
use uuid::Uuid;

// Scouting data is readable by every collaborator but writable only by
// roles above viewer
async fn load_editable_event(
    store: &dyn DocumentStore,
    event_id: &str,
    actor: &Identity,
) -> Result<Event, ServiceError> {
    let event = access_service::load_visible_event(store, event_id, actor).await?;
    if !permissions::can_edit_data(&event, &actor.user_id) {
        error!("❌ User: {} can't edit scouting data for event: {}", actor.user_id, event_id);
        return Err(ServiceError::Forbidden);
    }
    Ok(event)
}

fn check_number(value: u32, what: &str) -> Result<(), ServiceError> {
    if value == 0 {
        return Err(ServiceError::Validation(format!("{} must be positive", what)));
    }
    Ok(())
}

fn optional_text(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

trait EventScoped {
    fn event_id(&self) -> &str;
}

impl EventScoped for MatchScout {
    fn event_id(&self) -> &str {
        &self.event_id
    }
}

impl EventScoped for PitScout {
    fn event_id(&self) -> &str {
        &self.event_id
    }
}

// Loads a record and checks it belongs to the event in the path
async fn load_record<T: DeserializeOwned + EventScoped>(
    store: &dyn DocumentStore,
    collection: &str,
    event_id: &str,
    record_id: &str,
) -> Result<T, ServiceError> {
    let not_found = || ServiceError::NotFound(format!("Record {} in event {}", record_id, event_id));
    let doc = store.get(collection, record_id).await?.ok_or_else(not_found)?;
    let record: T = from_document(doc)?;
    if record.event_id() != event_id {
        return Err(not_found());
    }
    Ok(record)
}

pub async fn list_match_scouts(
    store: &dyn DocumentStore,
    event_id: &str,
    actor: &Identity,
) -> Result<Vec<MatchScout>, ServiceError> {
    access_service::load_visible_event(store, event_id, actor).await?;
    let query = Query::new()
        .filter_eq("eventId", event_id)
        .order_by("matchNumber", Direction::Ascending);
    let docs = store.list(MATCH_SCOUTS_COLLECTION, &query).await?;

    let mut scouts = Vec::with_capacity(docs.len());
    for doc in docs {
        match from_document::<MatchScout>(doc) {
            Ok(scout) => scouts.push(scout),
            Err(e) => warn!("Skipping unreadable match scout: {}", e),
        }
    }
    Ok(scouts)
}

pub async fn create_match_scout(
    store: &dyn DocumentStore,
    event_id: &str,
    actor: &Identity,
    data: &MatchScoutData,
) -> Result<MatchScout, ServiceError> {
    load_editable_event(store, event_id, actor).await?;
    check_number(data.team_number, "Team number")?;
    check_number(data.match_number, "Match number")?;

    let now = Utc::now();
    let scout = MatchScout {
        id: Uuid::new_v4().to_string(),
        event_id: event_id.to_string(),
        team_number: data.team_number,
        match_number: data.match_number,
        alliance: data.alliance,
        auto_points: data.auto_points,
        teleop_points: data.teleop_points,
        endgame_points: data.endgame_points,
        notes: data.notes.trim().to_string(),
        created_by: actor.user_id.clone(),
        created_by_name: actor.user_name.clone(),
        last_edited_by: None,
        last_edited_by_name: None,
        created_at: now,
        updated_at: now,
    };

    store
        .create(MATCH_SCOUTS_COLLECTION, &scout.id, to_document(&scout)?)
        .await?;

    info!(
        "✅ Match scout {} recorded for team {} in match {}",
        scout.id, scout.team_number, scout.match_number
    );
    Ok(scout)
}

pub async fn update_match_scout(
    store: &dyn DocumentStore,
    event_id: &str,
    scout_id: &str,
    actor: &Identity,
    data: &MatchScoutData,
) -> Result<MatchScout, ServiceError> {
    load_editable_event(store, event_id, actor).await?;
    check_number(data.team_number, "Team number")?;
    check_number(data.match_number, "Match number")?;

    let mut scout: MatchScout = load_record(store, MATCH_SCOUTS_COLLECTION, event_id, scout_id).await?;

    scout.team_number = data.team_number;
    scout.match_number = data.match_number;
    scout.alliance = data.alliance;
    scout.auto_points = data.auto_points;
    scout.teleop_points = data.teleop_points;
    scout.endgame_points = data.endgame_points;
    scout.notes = data.notes.trim().to_string();
    scout.last_edited_by = Some(actor.user_id.clone());
    scout.last_edited_by_name = Some(actor.user_name.clone());
    scout.updated_at = Utc::now();

    store
        .update(MATCH_SCOUTS_COLLECTION, &scout.id, to_document(&scout)?)
        .await?;

    info!("✅ Match scout {} updated by {}", scout.id, actor.user_id);
    Ok(scout)
}

pub async fn delete_match_scout(
    store: &dyn DocumentStore,
    event_id: &str,
    scout_id: &str,
    actor: &Identity,
) -> Result<(), ServiceError> {
    load_editable_event(store, event_id, actor).await?;
    let scout: MatchScout = load_record(store, MATCH_SCOUTS_COLLECTION, event_id, scout_id).await?;

    store.delete(MATCH_SCOUTS_COLLECTION, &scout.id).await?;
    info!("🗑️ Match scout {} deleted", scout.id);
    Ok(())
}

pub async fn list_pit_scouts(
    store: &dyn DocumentStore,
    event_id: &str,
    actor: &Identity,
) -> Result<Vec<PitScout>, ServiceError> {
    access_service::load_visible_event(store, event_id, actor).await?;
    let query = Query::new()
        .filter_eq("eventId", event_id)
        .order_by("teamNumber", Direction::Ascending);
    let docs = store.list(PIT_SCOUTS_COLLECTION, &query).await?;

    let mut scouts = Vec::with_capacity(docs.len());
    for doc in docs {
        match from_document::<PitScout>(doc) {
            Ok(scout) => scouts.push(scout),
            Err(e) => warn!("Skipping unreadable pit scout: {}", e),
        }
    }
    Ok(scouts)
}

pub async fn create_pit_scout(
    store: &dyn DocumentStore,
    event_id: &str,
    actor: &Identity,
    data: &PitScoutData,
) -> Result<PitScout, ServiceError> {
    load_editable_event(store, event_id, actor).await?;
    check_number(data.team_number, "Team number")?;

    let now = Utc::now();
    let scout = PitScout {
        id: Uuid::new_v4().to_string(),
        event_id: event_id.to_string(),
        team_number: data.team_number,
        team_name: optional_text(&data.team_name),
        drivetrain: optional_text(&data.drivetrain),
        notes: data.notes.trim().to_string(),
        image_file_id: None,
        created_by: actor.user_id.clone(),
        created_by_name: actor.user_name.clone(),
        last_edited_by: None,
        last_edited_by_name: None,
        created_at: now,
        updated_at: now,
    };

    store
        .create(PIT_SCOUTS_COLLECTION, &scout.id, to_document(&scout)?)
        .await?;

    info!("✅ Pit scout {} recorded for team {}", scout.id, scout.team_number);
    Ok(scout)
}

pub async fn update_pit_scout(
    store: &dyn DocumentStore,
    event_id: &str,
    scout_id: &str,
    actor: &Identity,
    data: &PitScoutData,
) -> Result<PitScout, ServiceError> {
    load_editable_event(store, event_id, actor).await?;
    check_number(data.team_number, "Team number")?;

    let mut scout: PitScout = load_record(store, PIT_SCOUTS_COLLECTION, event_id, scout_id).await?;

    scout.team_number = data.team_number;
    scout.team_name = optional_text(&data.team_name);
    scout.drivetrain = optional_text(&data.drivetrain);
    scout.notes = data.notes.trim().to_string();
    scout.last_edited_by = Some(actor.user_id.clone());
    scout.last_edited_by_name = Some(actor.user_name.clone());
    scout.updated_at = Utc::now();

    store
        .update(PIT_SCOUTS_COLLECTION, &scout.id, to_document(&scout)?)
        .await?;

    info!("✅ Pit scout {} updated by {}", scout.id, actor.user_id);
    Ok(scout)
}

pub async fn delete_pit_scout(
    store: &dyn DocumentStore,
    blobs: &dyn BlobStore,
    event_id: &str,
    scout_id: &str,
    actor: &Identity,
) -> Result<(), ServiceError> {
    load_editable_event(store, event_id, actor).await?;
    let scout: PitScout = load_record(store, PIT_SCOUTS_COLLECTION, event_id, scout_id).await?;

    if let Some(file_id) = &scout.image_file_id {
        if let Err(e) = blobs.delete(PIT_IMAGES_BUCKET, file_id).await {
            warn!("Failed to delete pit image {}: {}", file_id, e);
        }
    }

    store.delete(PIT_SCOUTS_COLLECTION, &scout.id).await?;
    info!("🗑️ Pit scout {} deleted", scout.id);
    Ok(())
}

/// Stores a new photo for a pit scout, replacing any previous one.
pub async fn upload_pit_image(
    store: &dyn DocumentStore,
    blobs: &dyn BlobStore,
    event_id: &str,
    scout_id: &str,
    actor: &Identity,
    bytes: Vec<u8>,
) -> Result<PitScout, ServiceError> {
    load_editable_event(store, event_id, actor).await?;
    if bytes.is_empty() {
        return Err(ServiceError::Validation("Image must not be empty".to_string()));
    }

    let mut scout: PitScout = load_record(store, PIT_SCOUTS_COLLECTION, event_id, scout_id).await?;

    let file_id = blobs
        .upload(PIT_IMAGES_BUCKET, &Uuid::new_v4().to_string(), bytes)
        .await?;
    let previous = scout.image_file_id.replace(file_id);
    scout.last_edited_by = Some(actor.user_id.clone());
    scout.last_edited_by_name = Some(actor.user_name.clone());
    scout.updated_at = Utc::now();

    let saved = match to_document(&scout) {
        Ok(fields) => store
            .update(PIT_SCOUTS_COLLECTION, &scout.id, fields)
            .await
            .map_err(ServiceError::from),
        Err(e) => Err(e),
    };
    if let Err(e) = saved {
        error!("❌ Failed to attach image to pit scout {}: {}", scout.id, e);
        if let Some(new_file) = &scout.image_file_id {
            if let Err(delete_err) = blobs.delete(PIT_IMAGES_BUCKET, new_file).await {
                warn!("Failed to delete unattached pit image {}: {}", new_file, delete_err);
            }
        }
        return Err(e);
    }

    if let Some(old) = previous {
        if let Err(e) = blobs.delete(PIT_IMAGES_BUCKET, &old).await {
            warn!("Failed to delete replaced pit image {}: {}", old, e);
        }
    }

    info!("✅ Pit image uploaded for scout {}", scout.id);
    Ok(scout)
}

pub async fn pit_image_url(
    store: &dyn DocumentStore,
    blobs: &dyn BlobStore,
    event_id: &str,
    scout_id: &str,
    actor: &Identity,
) -> Result<Option<String>, ServiceError> {
    access_service::load_visible_event(store, event_id, actor).await?;
    let scout: PitScout = load_record(store, PIT_SCOUTS_COLLECTION, event_id, scout_id).await?;

    Ok(scout
        .image_file_id
        .map(|file_id| blobs.view_url(PIT_IMAGES_BUCKET, &file_id)))
}
