use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;
use log::{info, warn};
use std::time::Duration;

use trippuddy_api::config::AppConfig;
use trippuddy_api::routes;
use trippuddy_api::state::AppState;

const CACHE_PURGE_INTERVAL_SECS: u64 = 3600;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    }

    env_logger::init_from_env(Env::default().default_filter_or("info"));
    info!("Application starting...");

    let config = AppConfig::from_env()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    let state = AppState::from_config(&config)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    if state.directions_configured() {
        info!("Directions provider at {}", config.directions.base_url);
    } else {
        warn!("ORS_API_KEY not set, travel times will be estimated");
    }
    let state = web::Data::new(state);

    let sweeper = state.clone();
    actix_web::rt::spawn(async move {
        let period = Duration::from_secs(CACHE_PURGE_INTERVAL_SECS);
        let mut ticker = actix_web::rt::time::interval(period);
        loop {
            ticker.tick().await;
            let removed = sweeper.resolver().cache().purge_expired();
            if removed > 0 {
                info!("Purged {} expired route cache entries", removed);
            }
        }
    });

    info!("Attempting to bind to {}:{}", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(routes::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
