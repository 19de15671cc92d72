use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::models::activity::Activity;

pub mod day;
pub mod health;
pub mod route;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/api")
                .route("/distance", web::post().to(route::distance))
                .route("/routes/resolve", web::post().to(route::resolve))
                .service(
                    web::scope("/days")
                        .route("/savings", web::post().to(day::savings))
                        .route("/{day}/route", web::post().to(day::build_route))
                        .route("/{day}/route", web::get().to(day::get_route))
                        .route("/{day}/optimize", web::post().to(day::optimize)),
                ),
        );
}

fn bad_request(message: impl std::fmt::Display) -> HttpResponse {
    HttpResponse::BadRequest().json(json!({ "error": message.to_string() }))
}

fn validate_activities(activities: &[Activity]) -> Result<(), HttpResponse> {
    for (index, activity) in activities.iter().enumerate() {
        if let Some(coord) = &activity.coordinates {
            coord.validate().map_err(|e| {
                bad_request(format!("Activity {} ('{}'): {}", index, activity.title, e))
            })?;
        }
    }
    Ok(())
}
