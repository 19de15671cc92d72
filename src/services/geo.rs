//! Distance and geometry helpers for itinerary hops.
//!
//! All coordinates are WGS84 degrees. Distances use the haversine great-circle
//! formula on a spherical Earth, which is accurate enough for city-scale hops.

use crate::models::coordinate::Coordinate;
use crate::models::route::TravelMode;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Hops shorter than this are walked, anything else is driven.
pub const WALK_THRESHOLD_KM: f64 = 1.0;

/// Great-circle distance in kilometres. Returns 0 when either side is absent.
pub fn distance_km(a: Option<&Coordinate>, b: Option<&Coordinate>) -> f64 {
    match (a, b) {
        (Some(a), Some(b)) => haversine_km(a, b),
        _ => 0.0,
    }
}

pub fn haversine_km(a: &Coordinate, b: &Coordinate) -> f64 {
    let lat1_rad = a.lat.to_radians();
    let lat2_rad = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lon = (b.lon - a.lon).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

pub fn classify_mode(distance_km: f64) -> TravelMode {
    if distance_km < WALK_THRESHOLD_KM {
        TravelMode::Walk
    } else {
        TravelMode::Drive
    }
}

/// Mean lat/lon of the present coordinates, `None` if there are none.
pub fn centroid<'a, I>(points: I) -> Option<Coordinate>
where
    I: IntoIterator<Item = Option<&'a Coordinate>>,
{
    let (sum_lat, sum_lon, count) = points
        .into_iter()
        .flatten()
        .fold((0.0, 0.0, 0usize), |(lat, lon, n), c| (lat + c.lat, lon + c.lon, n + 1));

    if count == 0 {
        return None;
    }

    Some(Coordinate::new(sum_lat / count as f64, sum_lon / count as f64))
}

/// Round a kilometre figure to one decimal, the precision shown in day totals.
pub fn round_km(km: f64) -> f64 {
    (km * 10.0).round() / 10.0
}
