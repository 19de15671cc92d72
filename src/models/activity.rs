use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::coordinate::Coordinate;

/// A single itinerary stop. Its position in the containing day is its visiting order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(default)]
    pub title: String,
    /// Absent when upstream geocoding failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub travel_time: Option<String>,
    // Fields from the itinerary generator we don't interpret (time, cost, image, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Activity {
    pub fn new(title: impl Into<String>, coordinates: Option<Coordinate>) -> Self {
        Self {
            title: title.into(),
            coordinates,
            travel_time: None,
            extra: Map::new(),
        }
    }

    pub fn at(title: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self::new(title, Some(Coordinate::new(lat, lon)))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Day {
    pub day: u32,
    pub activities: Vec<Activity>,
}
