use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

use super::bad_request;
use crate::models::coordinate::Coordinate;
use crate::models::route::TravelMode;
use crate::services::geo::{classify_mode, distance_km};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DistanceRequest {
    pub from: Coordinate,
    pub to: Coordinate,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistanceResponse {
    pub distance_km: f64,
    pub mode: TravelMode,
}

#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    #[serde(default)]
    pub from: Option<Coordinate>,
    #[serde(default)]
    pub to: Option<Coordinate>,
}

/*
    /api/distance
*/
pub async fn distance(input: web::Json<DistanceRequest>) -> impl Responder {
    let DistanceRequest { from, to } = input.into_inner();
    for coord in [&from, &to] {
        if let Err(e) = coord.validate() {
            return bad_request(e);
        }
    }

    let km = distance_km(Some(&from), Some(&to));
    HttpResponse::Ok().json(DistanceResponse {
        distance_km: km,
        mode: classify_mode(km),
    })
}

/*
    /api/routes/resolve
*/
pub async fn resolve(
    state: web::Data<AppState>,
    input: web::Json<ResolveRequest>,
) -> impl Responder {
    let ResolveRequest { from, to } = input.into_inner();
    for coord in [&from, &to].into_iter().flatten() {
        if let Err(e) = coord.validate() {
            return bad_request(e);
        }
    }

    let segment = state.resolver().resolve_route(from.as_ref(), to.as_ref()).await;
    HttpResponse::Ok().json(segment)
}
