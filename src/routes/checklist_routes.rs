use crate::config::AppState;
use crate::models::{ChecklistScope, SaveChecklistRequest, ServiceError};
use crate::services::{access_service, checklist_sync, permissions};
use crate::utils::get_identity_from_request;
use actix_web::{get, post, put, web, HttpRequest, HttpResponse};
use log::info;

// Every checklist the caller's role can see, created on first access
#[get("/events/{event_id}/checklists")]
async fn list_checklists(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let identity = get_identity_from_request(&req)?;
    let event_id = path.into_inner();

    info!("📋 Fetching checklists for event: {} and user: {}", event_id, identity.user_id);

    let event = access_service::load_visible_event(state.store.as_ref(), &event_id, &identity).await?;
    let mut checklists = Vec::new();
    for scope in permissions::visible_checklist_scopes(&event, &identity.user_id) {
        checklists.push(
            checklist_sync::get_or_create(state.store.as_ref(), &event_id, &identity, scope).await?,
        );
    }

    info!("✅ Found {} checklists", checklists.len());

    Ok(HttpResponse::Ok().json(checklists))
}

#[get("/events/{event_id}/checklists/{scope}")]
async fn get_checklist(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, ServiceError> {
    let identity = get_identity_from_request(&req)?;
    let (event_id, scope) = path.into_inner();
    let scope: ChecklistScope = scope.parse()?;

    info!("🔍 Fetching {} checklist for event: {}", scope, event_id);

    let checklist = checklist_sync::get_or_create(state.store.as_ref(), &event_id, &identity, scope).await?;

    Ok(HttpResponse::Ok().json(checklist))
}

// Whole-list save; stale base revisions are answered with 409
#[put("/events/{event_id}/checklists/{scope}")]
async fn save_checklist(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    data: web::Json<SaveChecklistRequest>,
) -> Result<HttpResponse, ServiceError> {
    let identity = get_identity_from_request(&req)?;
    let (event_id, scope) = path.into_inner();
    let scope: ChecklistScope = scope.parse()?;
    let SaveChecklistRequest { items, base_revision } = data.into_inner();

    info!(
        "💾 Saving {} checklist for event: {} by user: {} (base revision {})",
        scope, event_id, identity.user_id, base_revision
    );

    let checklist = checklist_sync::save_items(
        state.store.as_ref(),
        &event_id,
        &identity,
        scope,
        items,
        base_revision,
    )
    .await?;

    info!("✅ Checklist {} saved at revision {}", checklist.id, checklist.revision);

    Ok(HttpResponse::Ok().json(checklist))
}

#[post("/events/{event_id}/checklists/{scope}/clear")]
async fn clear_checklist(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, ServiceError> {
    let identity = get_identity_from_request(&req)?;
    let (event_id, scope) = path.into_inner();
    let scope: ChecklistScope = scope.parse()?;

    info!("🧹 Clearing {} checklist for event: {}", scope, event_id);

    let checklist = checklist_sync::clear_checklist(state.store.as_ref(), &event_id, &identity, scope).await?;

    Ok(HttpResponse::Ok().json(checklist))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_checklists)
        .service(get_checklist)
        .service(save_checklist)
        .service(clear_checklist);
}
