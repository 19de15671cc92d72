use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;
use std::collections::HashMap;
use std::env;

use crate::state::AppState;

#[derive(Serialize)]
struct HealthStatus {
    status: String,
    services: HashMap<String, ServiceStatus>,
    environment: String,
    version: String,
}

#[derive(Serialize, Clone)]
struct ServiceStatus {
    status: String,
    details: Option<String>,
}

pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let mut health = HealthStatus {
        status: "ok".to_string(),
        services: HashMap::new(),
        environment: env::var("RUST_ENV").unwrap_or("development".to_string()),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    health
        .services
        .insert("directions".to_string(), check_directions(&state));
    health
        .services
        .insert("route_cache".to_string(), check_route_cache(&state));

    HttpResponse::Ok().json(health)
}

// Estimate-only mode is a supported configuration, not a failure
fn check_directions(state: &AppState) -> ServiceStatus {
    if state.directions_configured() {
        ServiceStatus {
            status: "ok".to_string(),
            details: Some("Directions provider configured".to_string()),
        }
    } else {
        ServiceStatus {
            status: "estimate_only".to_string(),
            details: Some("ORS_API_KEY not configured, using straight-line estimates".to_string()),
        }
    }
}

fn check_route_cache(state: &AppState) -> ServiceStatus {
    let purged = state.resolver().cache().purge_expired();
    ServiceStatus {
        status: "ok".to_string(),
        details: Some(format!(
            "{} cached routes ({} expired entries purged)",
            state.resolver().cache().len(),
            purged
        )),
    }
}
