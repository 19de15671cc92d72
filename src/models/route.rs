use serde::{Deserialize, Serialize};

use super::coordinate::Coordinate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    Walk,
    Drive,
}

impl TravelMode {
    /// Profile name understood by the directions provider.
    pub fn profile(&self) -> &'static str {
        match self {
            TravelMode::Walk => "foot-walking",
            TravelMode::Drive => "driving-car",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TravelMode::Walk => "walk",
            TravelMode::Drive => "drive",
        }
    }

    /// Human-readable travel-time label shown on the itinerary card.
    pub fn label(&self, minutes: f64) -> String {
        if minutes < 1.0 {
            return "Walking distance".to_string();
        }
        let rounded = minutes.round() as i64;
        match self {
            TravelMode::Walk => format!("{} min walk", rounded),
            TravelMode::Drive => format!("{} min by Taxi", rounded),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteStep {
    pub instruction: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub distance_m: f64,
    pub duration_s: f64,
}

/// Why a hop was estimated locally instead of coming from the directions provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FallbackReason {
    MissingCredential,
    Network(String),
    Status(u16),
    MalformedBody(String),
}

impl std::fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FallbackReason::MissingCredential => write!(f, "No directions credential configured"),
            FallbackReason::Network(err) => write!(f, "Directions request failed: {}", err),
            FallbackReason::Status(code) => {
                write!(f, "Directions provider returned status {}", code)
            }
            FallbackReason::MalformedBody(err) => {
                write!(f, "Failed to parse directions response: {}", err)
            }
        }
    }
}

impl std::error::Error for FallbackReason {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RouteSource {
    Directions,
    Estimated { reason: FallbackReason },
    /// One of the hop's endpoints had no coordinates.
    Placeholder,
}

/// A resolved hop between two consecutive activities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSegment {
    pub mode: TravelMode,
    pub label: String,
    pub minutes: f64,
    pub distance_km: f64,
    pub path: Vec<Coordinate>,
    pub steps: Vec<RouteStep>,
    pub source: RouteSource,
    pub used_fallback: bool,
}

impl RouteSegment {
    pub fn placeholder() -> Self {
        Self {
            mode: TravelMode::Walk,
            label: TravelMode::Walk.label(0.0),
            minutes: 0.0,
            distance_km: 0.0,
            path: Vec::new(),
            steps: Vec::new(),
            source: RouteSource::Placeholder,
            used_fallback: false,
        }
    }

    pub fn estimated(
        mode: TravelMode,
        distance_km: f64,
        minutes: f64,
        from: Coordinate,
        to: Coordinate,
        reason: FallbackReason,
    ) -> Self {
        Self {
            mode,
            label: mode.label(minutes),
            minutes,
            distance_km,
            path: vec![from, to],
            steps: Vec::new(),
            source: RouteSource::Estimated { reason },
            used_fallback: true,
        }
    }

    pub fn from_directions(
        mode: TravelMode,
        distance_km: f64,
        minutes: f64,
        path: Vec<Coordinate>,
        steps: Vec<RouteStep>,
    ) -> Self {
        Self {
            mode,
            label: mode.label(minutes),
            minutes,
            distance_km,
            path,
            steps,
            source: RouteSource::Directions,
            used_fallback: false,
        }
    }

    pub fn fallback_reason(&self) -> Option<&FallbackReason> {
        match &self.source {
            RouteSource::Estimated { reason } => Some(reason),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayTotals {
    pub total_km: f64,
    pub walk_minutes: f64,
    pub drive_minutes: f64,
    pub total_minutes: f64,
}

/// Segments for one day. `segments[i - 1]` is the hop into `activities[i]`,
/// `None` when either end of that hop has no coordinates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayRoute {
    pub segments: Vec<Option<RouteSegment>>,
    pub totals: DayTotals,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsEstimate {
    pub current_minutes: f64,
    pub optimized_minutes: f64,
    pub minutes_saved: f64,
    pub recommended: bool,
}
