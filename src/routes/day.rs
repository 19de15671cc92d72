use actix_web::{web, HttpResponse, Responder};
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::validate_activities;
use crate::models::activity::{Activity, Day};
use crate::models::route::DayRoute;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DayRouteRequest {
    pub activities: Vec<Activity>,
    /// Write travel-time labels onto the returned activities.
    #[serde(default = "default_annotate")]
    pub annotate: bool,
}

fn default_annotate() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct ActivitiesRequest {
    pub activities: Vec<Activity>,
}

#[derive(Debug, Serialize)]
pub struct DayRouteResponse {
    #[serde(flatten)]
    pub day: Day,
    pub route: DayRoute,
    /// False when a newer recomputation for this day superseded this one.
    pub applied: bool,
}

/*
    POST /api/days/{day}/route
*/
pub async fn build_route(
    path: web::Path<u32>,
    state: web::Data<AppState>,
    input: web::Json<DayRouteRequest>,
) -> impl Responder {
    let day = path.into_inner();
    let DayRouteRequest {
        mut activities,
        annotate,
    } = input.into_inner();
    if let Err(response) = validate_activities(&activities) {
        return response;
    }

    let token = state.day_store.begin(day);
    let route = if annotate {
        state.day_routes().annotate_day_route(&mut activities).await
    } else {
        state.day_routes().build_day_route(&activities).await
    };
    let applied = state.day_store.commit(token, route.clone());

    HttpResponse::Ok().json(DayRouteResponse {
        day: Day { day, activities },
        route,
        applied,
    })
}

/*
    GET /api/days/{day}/route
*/
pub async fn get_route(path: web::Path<u32>, state: web::Data<AppState>) -> impl Responder {
    let day = path.into_inner();
    match state.day_store.get(day) {
        Some(route) => HttpResponse::Ok().json(route),
        None => HttpResponse::NotFound()
            .json(json!({ "error": format!("No route computed for day {}", day) })),
    }
}

/*
    POST /api/days/{day}/optimize
*/
pub async fn optimize(
    path: web::Path<u32>,
    state: web::Data<AppState>,
    input: web::Json<ActivitiesRequest>,
) -> impl Responder {
    let day = path.into_inner();
    let mut activities = input.into_inner().activities;
    if let Err(response) = validate_activities(&activities) {
        return response;
    }

    info!("Optimizing day {} with {} activities", day, activities.len());

    let token = state.day_store.begin(day);
    let route = state.optimizer.optimize_day(&mut activities).await;
    let applied = state.day_store.commit(token, route.clone());

    HttpResponse::Ok().json(DayRouteResponse {
        day: Day { day, activities },
        route,
        applied,
    })
}

/*
    POST /api/days/savings
*/
pub async fn savings(
    state: web::Data<AppState>,
    input: web::Json<ActivitiesRequest>,
) -> impl Responder {
    let activities = input.into_inner().activities;
    if let Err(response) = validate_activities(&activities) {
        return response;
    }

    let estimate = state.optimizer.estimate_savings(&activities).await;
    HttpResponse::Ok().json(estimate)
}
