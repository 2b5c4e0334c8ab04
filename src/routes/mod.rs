// src/routes/mod.rs
use actix_web::web;

pub mod blob_routes;
pub mod checklist_routes;
pub mod collaborator_routes;
pub mod event_routes;
pub mod role_routes;
pub mod scout_routes;

// Pit photos come in as raw request bodies
const MAX_UPLOAD_BYTES: usize = 8 * 1024 * 1024;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::PayloadConfig::new(MAX_UPLOAD_BYTES))
        .configure(role_routes::init_routes)
        .configure(event_routes::init_routes)
        .configure(collaborator_routes::init_routes)
        .configure(checklist_routes::init_routes)
        .configure(scout_routes::init_routes)
        .configure(blob_routes::init_routes);
}
