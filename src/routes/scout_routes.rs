use crate::config::AppState;
use crate::models::{MatchScoutData, PitScoutData, ServiceError};
use crate::services::scouting_service;
use crate::utils::get_identity_from_request;
use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse};
use log::info;
use serde_json::json;

// MATCH SCOUTING

#[get("/events/{event_id}/match-scouts")]
async fn list_match_scouts(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let identity = get_identity_from_request(&req)?;
    let event_id = path.into_inner();

    info!("📋 Fetching match scouts for event: {}", event_id);

    let scouts = scouting_service::list_match_scouts(state.store.as_ref(), &event_id, &identity).await?;

    Ok(HttpResponse::Ok().json(scouts))
}

#[post("/events/{event_id}/match-scouts")]
async fn create_match_scout(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
    data: web::Json<MatchScoutData>,
) -> Result<HttpResponse, ServiceError> {
    let identity = get_identity_from_request(&req)?;
    let event_id = path.into_inner();

    info!(
        "📝 Recording match {} for team {} in event: {}",
        data.match_number, data.team_number, event_id
    );

    let scout =
        scouting_service::create_match_scout(state.store.as_ref(), &event_id, &identity, &data).await?;

    Ok(HttpResponse::Created().json(scout))
}

#[put("/events/{event_id}/match-scouts/{scout_id}")]
async fn update_match_scout(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    data: web::Json<MatchScoutData>,
) -> Result<HttpResponse, ServiceError> {
    let identity = get_identity_from_request(&req)?;
    let (event_id, scout_id) = path.into_inner();

    info!("🔄 Updating match scout: {} in event: {}", scout_id, event_id);

    let scout = scouting_service::update_match_scout(
        state.store.as_ref(),
        &event_id,
        &scout_id,
        &identity,
        &data,
    )
    .await?;

    Ok(HttpResponse::Ok().json(scout))
}

#[delete("/events/{event_id}/match-scouts/{scout_id}")]
async fn delete_match_scout(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, ServiceError> {
    let identity = get_identity_from_request(&req)?;
    let (event_id, scout_id) = path.into_inner();

    info!("🗑️ Deleting match scout: {} in event: {}", scout_id, event_id);

    scouting_service::delete_match_scout(state.store.as_ref(), &event_id, &scout_id, &identity).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Match scout deleted successfully",
        "id": scout_id
    })))
}

// PIT SCOUTING

#[get("/events/{event_id}/pit-scouts")]
async fn list_pit_scouts(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let identity = get_identity_from_request(&req)?;
    let event_id = path.into_inner();

    info!("📋 Fetching pit scouts for event: {}", event_id);

    let scouts = scouting_service::list_pit_scouts(state.store.as_ref(), &event_id, &identity).await?;

    Ok(HttpResponse::Ok().json(scouts))
}

#[post("/events/{event_id}/pit-scouts")]
async fn create_pit_scout(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
    data: web::Json<PitScoutData>,
) -> Result<HttpResponse, ServiceError> {
    let identity = get_identity_from_request(&req)?;
    let event_id = path.into_inner();

    info!("📝 Recording pit scout for team {} in event: {}", data.team_number, event_id);

    let scout =
        scouting_service::create_pit_scout(state.store.as_ref(), &event_id, &identity, &data).await?;

    Ok(HttpResponse::Created().json(scout))
}

#[put("/events/{event_id}/pit-scouts/{scout_id}")]
async fn update_pit_scout(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    data: web::Json<PitScoutData>,
) -> Result<HttpResponse, ServiceError> {
    let identity = get_identity_from_request(&req)?;
    let (event_id, scout_id) = path.into_inner();

    info!("🔄 Updating pit scout: {} in event: {}", scout_id, event_id);

    let scout = scouting_service::update_pit_scout(
        state.store.as_ref(),
        &event_id,
        &scout_id,
        &identity,
        &data,
    )
    .await?;

    Ok(HttpResponse::Ok().json(scout))
}

#[delete("/events/{event_id}/pit-scouts/{scout_id}")]
async fn delete_pit_scout(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, ServiceError> {
    let identity = get_identity_from_request(&req)?;
    let (event_id, scout_id) = path.into_inner();

    info!("🗑️ Deleting pit scout: {} in event: {}", scout_id, event_id);

    scouting_service::delete_pit_scout(
        state.store.as_ref(),
        state.blobs.as_ref(),
        &event_id,
        &scout_id,
        &identity,
    )
    .await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Pit scout deleted successfully",
        "id": scout_id
    })))
}

// Raw image bytes in the request body
#[post("/events/{event_id}/pit-scouts/{scout_id}/image")]
async fn upload_pit_image(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    body: web::Bytes,
) -> Result<HttpResponse, ServiceError> {
    let identity = get_identity_from_request(&req)?;
    let (event_id, scout_id) = path.into_inner();

    info!("📷 Uploading {} byte image for pit scout: {}", body.len(), scout_id);

    let scout = scouting_service::upload_pit_image(
        state.store.as_ref(),
        state.blobs.as_ref(),
        &event_id,
        &scout_id,
        &identity,
        body.to_vec(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(scout))
}

#[get("/events/{event_id}/pit-scouts/{scout_id}/image")]
async fn get_pit_image_url(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, ServiceError> {
    let identity = get_identity_from_request(&req)?;
    let (event_id, scout_id) = path.into_inner();

    let url = scouting_service::pit_image_url(
        state.store.as_ref(),
        state.blobs.as_ref(),
        &event_id,
        &scout_id,
        &identity,
    )
    .await?;

    match url {
        Some(url) => Ok(HttpResponse::Ok().json(json!({ "url": url }))),
        None => Err(ServiceError::NotFound(format!("Image for pit scout {}", scout_id))),
    }
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_match_scouts)
        .service(create_match_scout)
        .service(update_match_scout)
        .service(delete_match_scout)
        .service(list_pit_scouts)
        .service(create_pit_scout)
        .service(update_pit_scout)
        .service(delete_pit_scout)
        .service(upload_pit_image)
        .service(get_pit_image_url);
}
