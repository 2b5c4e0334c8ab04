use crate::config::AppState;
use crate::models::ServiceError;
use actix_web::{get, web, HttpResponse};
use log::info;

// Serves the URLs handed out by BlobStore::view_url
#[get("/blobs/{bucket}/{file_id}")]
async fn get_blob(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, ServiceError> {
    let (bucket, file_id) = path.into_inner();

    info!("📥 Fetching blob: {}/{}", bucket, file_id);

    match state.blobs.read(&bucket, &file_id).await? {
        Some(bytes) => Ok(HttpResponse::Ok()
            .content_type("application/octet-stream")
            .body(bytes)),
        None => Err(ServiceError::NotFound(format!("Blob {}/{}", bucket, file_id))),
    }
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(get_blob);
}
