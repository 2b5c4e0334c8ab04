use crate::config::AppState;
use crate::models::{ServiceError, ShareEventRequest, UpdateRoleRequest};
use crate::services::access_service;
use crate::utils::get_identity_from_request;
use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse};
use log::info;
use serde_json::json;

#[get("/events/{event_id}/collaborators")]
async fn list_collaborators(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let identity = get_identity_from_request(&req)?;
    let event_id = path.into_inner();

    info!("📋 Fetching collaborators for event: {}", event_id);

    let event = access_service::load_visible_event(state.store.as_ref(), &event_id, &identity).await?;
    let collaborators: Vec<_> = event
        .collaborators
        .iter()
        .map(|(user_id, c)| {
            json!({
                "userId": user_id,
                "userName": c.name,
                "role": c.role,
            })
        })
        .collect();

    info!("✅ Found {} collaborators", collaborators.len());

    Ok(HttpResponse::Ok().json(json!({
        "ownerId": event.owner_id,
        "ownerName": event.owner_name,
        "collaborators": collaborators
    })))
}

// Share an event, or update an existing collaborator's name and role
#[post("/events/{event_id}/collaborators")]
async fn share_event(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
    data: web::Json<ShareEventRequest>,
) -> Result<HttpResponse, ServiceError> {
    let identity = get_identity_from_request(&req)?;
    let event_id = path.into_inner();

    info!("👥 Sharing event: {} with user: {}", event_id, data.user_id);

    let event = access_service::share(state.store.as_ref(), &event_id, &identity, &data).await?;

    Ok(HttpResponse::Ok().json(event))
}

#[put("/events/{event_id}/collaborators/{user_id}")]
async fn update_collaborator_role(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    data: web::Json<UpdateRoleRequest>,
) -> Result<HttpResponse, ServiceError> {
    let identity = get_identity_from_request(&req)?;
    let (event_id, target_user_id) = path.into_inner();

    info!("🔄 Updating role for user: {} in event: {}", target_user_id, event_id);

    let event = access_service::change_role(
        state.store.as_ref(),
        &event_id,
        &identity,
        &target_user_id,
        data.role,
    )
    .await?;

    Ok(HttpResponse::Ok().json(event))
}

// Owners and admins remove anyone; collaborators may remove themselves
#[delete("/events/{event_id}/collaborators/{user_id}")]
async fn unshare_event(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, ServiceError> {
    let identity = get_identity_from_request(&req)?;
    let (event_id, target_user_id) = path.into_inner();

    info!("🗑️ Removing user: {} from event: {}", target_user_id, event_id);

    let removed =
        access_service::unshare(state.store.as_ref(), &event_id, &identity, &target_user_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "eventId": event_id,
        "userId": target_user_id,
        "removed": removed
    })))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_collaborators)
        .service(share_event)
        .service(update_collaborator_role)
        .service(unshare_event);
}
