use crate::models::all_roles;
use actix_web::{get, web, HttpResponse};

// Role registry for clients building share dialogs
#[get("/roles")]
async fn list_roles() -> HttpResponse {
    HttpResponse::Ok().json(all_roles())
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_roles);
}
