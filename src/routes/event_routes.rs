use crate::config::AppState;
use crate::models::{EventData, ServiceError};
use crate::services::{access_service, permissions};
use crate::utils::get_identity_from_request;
use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse};
use log::info;
use serde_json::json;

// Create a new event with the caller as owner
#[post("/events")]
async fn create_event(
    req: HttpRequest,
    state: web::Data<AppState>,
    data: web::Json<EventData>,
) -> Result<HttpResponse, ServiceError> {
    let identity = get_identity_from_request(&req)?;

    info!("📝 Creating event: {} for user: {}", data.name, identity.user_id);

    let event = access_service::create_event(state.store.as_ref(), &identity, &data).await?;

    Ok(HttpResponse::Created().json(event))
}

// Events owned by or shared with the caller
#[get("/events")]
async fn list_events(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse, ServiceError> {
    let identity = get_identity_from_request(&req)?;

    info!("📋 Fetching events for user: {}", identity.user_id);

    let events = access_service::list_events_for_user(state.store.as_ref(), &identity.user_id).await?;

    info!("✅ Found {} events for user: {}", events.len(), identity.user_id);

    Ok(HttpResponse::Ok().json(events))
}

#[get("/events/{event_id}")]
async fn get_event(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let identity = get_identity_from_request(&req)?;
    let event_id = path.into_inner();

    info!("🔍 Fetching event: {} for user: {}", event_id, identity.user_id);

    let event = access_service::load_visible_event(state.store.as_ref(), &event_id, &identity).await?;

    Ok(HttpResponse::Ok().json(event))
}

#[put("/events/{event_id}")]
async fn update_event(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
    data: web::Json<EventData>,
) -> Result<HttpResponse, ServiceError> {
    let identity = get_identity_from_request(&req)?;
    let event_id = path.into_inner();

    info!("🔄 Updating event: {} by user: {}", event_id, identity.user_id);

    let event =
        access_service::update_event_details(state.store.as_ref(), &event_id, &identity, &data).await?;

    Ok(HttpResponse::Ok().json(event))
}

#[post("/events/{event_id}/activate")]
async fn activate_event(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let identity = get_identity_from_request(&req)?;
    let event_id = path.into_inner();

    info!("🔄 Activating event: {} by user: {}", event_id, identity.user_id);

    let event = access_service::set_event_active(state.store.as_ref(), &event_id, &identity, true).await?;

    Ok(HttpResponse::Ok().json(event))
}

#[post("/events/{event_id}/deactivate")]
async fn deactivate_event(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let identity = get_identity_from_request(&req)?;
    let event_id = path.into_inner();

    info!("🔄 Deactivating event: {} by user: {}", event_id, identity.user_id);

    let event = access_service::set_event_active(state.store.as_ref(), &event_id, &identity, false).await?;

    Ok(HttpResponse::Ok().json(event))
}

// Caller's role and what it allows
#[get("/events/{event_id}/role")]
async fn get_user_role_in_event(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let identity = get_identity_from_request(&req)?;
    let event_id = path.into_inner();

    info!("🔍 Fetching role for user: {} in event: {}", identity.user_id, event_id);

    let event = access_service::load_visible_event(state.store.as_ref(), &event_id, &identity).await?;
    let capabilities = permissions::capabilities(&event, &identity.user_id);

    info!("✅ User role found: {:?}", capabilities.role);

    Ok(HttpResponse::Ok().json(capabilities))
}

#[delete("/events/{event_id}")]
async fn delete_event(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let identity = get_identity_from_request(&req)?;
    let event_id = path.into_inner();

    info!("🗑️ Deleting event: {} by user: {}", event_id, identity.user_id);

    access_service::delete_event(
        state.store.as_ref(),
        state.blobs.as_ref(),
        &event_id,
        &identity,
    )
    .await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Event deleted successfully",
        "eventId": event_id
    })))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_event)
        .service(list_events)
        .service(get_event)
        .service(update_event)
        .service(activate_event)
        .service(deactivate_event)
        .service(get_user_role_in_event)
        .service(delete_event);
}
