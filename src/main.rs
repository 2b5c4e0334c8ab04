//Third-party-dependencies
use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use log::info;
use scoutshare_service::config::{AppConfig, AppState};
use scoutshare_service::routes;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;
    let address = config.address.clone();
    let state = web::Data::new(AppState::from_config(config)?);

    info!("Server started at {}", address);
    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .app_data(state.clone())
            .configure(routes::init_routes)
    })
        .bind(address)?
        .run()
        .await
}
