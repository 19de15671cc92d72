//! Directions provider integration (OpenRouteService).
//!
//! ## Setup
//! 1. Get an API key from openrouteservice.org
//! 2. Set the environment variable: `ORS_API_KEY=your_api_key_here`
//! 3. Optionally point `ORS_BASE_URL` at a self-hosted instance
//!
//! Without a key the client reports [`FallbackReason::MissingCredential`] for
//! every lookup and the route resolver estimates hops locally.

use log::debug;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use url::Url;

use crate::config::DirectionsSettings;
use crate::models::coordinate::Coordinate;
use crate::models::route::{FallbackReason, RouteStep, TravelMode};

/// Route geometry and timing returned by a directions provider.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionsRoute {
    pub duration_s: f64,
    pub path: Vec<Coordinate>,
    pub steps: Vec<RouteStep>,
}

/// Source of real travel times between two points.
pub trait DirectionsProvider {
    /// Whether a credential is present. Unconfigured providers are never called.
    fn is_configured(&self) -> bool;

    fn fetch_route(
        &self,
        mode: TravelMode,
        from: &Coordinate,
        to: &Coordinate,
    ) -> impl Future<Output = Result<DirectionsRoute, FallbackReason>>;
}

#[derive(Debug, Serialize)]
struct DirectionsRequest {
    coordinates: [[f64; 2]; 2],
    geometry: bool,
    instructions: bool,
}

#[derive(Debug, Deserialize)]
struct GeoJsonResponse {
    #[serde(default)]
    features: Vec<GeoJsonFeature>,
}

#[derive(Debug, Deserialize)]
struct GeoJsonFeature {
    properties: FeatureProperties,
    geometry: LineString,
}

#[derive(Debug, Deserialize)]
struct FeatureProperties {
    summary: RouteSummary,
    #[serde(default)]
    segments: Vec<RouteLeg>,
}

#[derive(Debug, Deserialize)]
struct RouteSummary {
    duration: Option<f64>, // seconds
}

#[derive(Debug, Deserialize)]
struct RouteLeg {
    #[serde(default)]
    steps: Vec<LegStep>,
}

#[derive(Debug, Deserialize)]
struct LegStep {
    #[serde(default)]
    distance: f64,
    #[serde(default)]
    duration: f64,
    #[serde(default)]
    instruction: String,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LineString {
    coordinates: Vec<Vec<f64>>,
}

/// Parse a GeoJSON directions body into a [`DirectionsRoute`].
pub fn parse_directions(body: &str) -> Result<DirectionsRoute, FallbackReason> {
    let response: GeoJsonResponse = serde_json::from_str(body)
        .map_err(|e| FallbackReason::MalformedBody(e.to_string()))?;

    let feature = response
        .features
        .into_iter()
        .next()
        .ok_or_else(|| FallbackReason::MalformedBody("No route feature returned".to_string()))?;

    let duration_s = feature
        .properties
        .summary
        .duration
        .filter(|d| d.is_finite() && *d >= 0.0)
        .ok_or_else(|| FallbackReason::MalformedBody("Route duration not available".to_string()))?;

    let path = feature
        .geometry
        .coordinates
        .iter()
        .map(|position| match position.as_slice() {
            [lon, lat, ..] => Ok(Coordinate::from_lon_lat([*lon, *lat])),
            _ => Err(FallbackReason::MalformedBody(format!(
                "Invalid geometry position: {:?}",
                position
            ))),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let steps = feature
        .properties
        .segments
        .into_iter()
        .next()
        .map(|leg| {
            leg.steps
                .into_iter()
                .map(|step| RouteStep {
                    instruction: step.instruction,
                    // unnamed ways come back as "-"
                    name: step.name.filter(|n| !n.is_empty() && n != "-"),
                    distance_m: step.distance,
                    duration_s: step.duration,
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(DirectionsRoute {
        duration_s,
        path,
        steps,
    })
}

/// Spaces out request dispatches so we stay under the provider's rate limit.
#[derive(Debug)]
pub struct RequestThrottle {
    min_interval: Duration,
    next_dispatch: Mutex<Instant>,
}

impl RequestThrottle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            next_dispatch: Mutex::new(Instant::now()),
        }
    }

    /// Wait for our dispatch slot. Each caller gets a unique slot spaced
    /// `min_interval` apart.
    pub async fn wait_for_slot(&self) {
        if self.min_interval.is_zero() {
            return;
        }

        let wait = {
            let mut next = self.next_dispatch.lock().await;
            let now = Instant::now();
            let dispatch_at = if *next > now { *next } else { now };
            *next = dispatch_at + self.min_interval;
            dispatch_at - now
        };

        // sleep outside the lock
        if !wait.is_zero() {
            debug!("Throttling directions request for {:?}", wait);
            tokio::time::sleep(wait).await;
        }
    }
}

pub struct OpenRouteServiceClient {
    http_client: reqwest::Client,
    api_key: Option<String>,
    base_url: Url,
    throttle: RequestThrottle,
}

impl OpenRouteServiceClient {
    pub fn new(settings: &DirectionsSettings) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()?;

        Ok(Self {
            http_client,
            api_key: settings.api_key.clone(),
            base_url: settings.base_url.clone(),
            throttle: RequestThrottle::new(settings.min_request_interval),
        })
    }

    fn endpoint(&self, mode: TravelMode) -> Result<Url, url::ParseError> {
        self.base_url
            .join(&format!("v2/directions/{}/geojson", mode.profile()))
    }
}

impl DirectionsProvider for OpenRouteServiceClient {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn fetch_route(
        &self,
        mode: TravelMode,
        from: &Coordinate,
        to: &Coordinate,
    ) -> Result<DirectionsRoute, FallbackReason> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(FallbackReason::MissingCredential)?;

        let url = self
            .endpoint(mode)
            .map_err(|e| FallbackReason::Network(format!("Invalid directions URL: {}", e)))?;

        let request = DirectionsRequest {
            coordinates: [from.to_lon_lat(), to.to_lon_lat()],
            geometry: true,
            instructions: true,
        };

        self.throttle.wait_for_slot().await;

        debug!(
            "Fetching {} directions for ({:.4}, {:.4}) to ({:.4}, {:.4})",
            mode.profile(),
            from.lat,
            from.lon,
            to.lat,
            to.lon
        );

        let response = self
            .http_client
            .post(url)
            .header(reqwest::header::AUTHORIZATION, api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| FallbackReason::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FallbackReason::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FallbackReason::Network(e.to_string()))?;

        parse_directions(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RESPONSE: &str = r#"{
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": {
                "segments": [{
                    "distance": 2104.3,
                    "duration": 312.7,
                    "steps": [
                        { "distance": 1500.1, "duration": 220.0, "type": 11, "instruction": "Head north on Raffles Avenue", "name": "Raffles Avenue" },
                        { "distance": 604.2, "duration": 92.7, "type": 10, "instruction": "Arrive at your destination", "name": "-" }
                    ]
                }],
                "summary": { "distance": 2104.3, "duration": 312.7 }
            },
            "geometry": {
                "type": "LineString",
                "coordinates": [[103.85, 1.30], [103.852, 1.305], [103.85, 1.318]]
            }
        }]
    }"#;

    fn settings(api_key: Option<&str>, base_url: &str) -> DirectionsSettings {
        DirectionsSettings {
            api_key: api_key.map(str::to_string),
            base_url: Url::parse(base_url).unwrap(),
            timeout: Duration::from_secs(2),
            min_request_interval: Duration::ZERO,
        }
    }

    #[test]
    fn parses_geojson_route() {
        let route = parse_directions(SAMPLE_RESPONSE).unwrap();
        assert_eq!(route.duration_s, 312.7);
        assert_eq!(route.path.len(), 3);
        assert_eq!(route.path[0], Coordinate::new(1.30, 103.85));
        assert_eq!(route.steps.len(), 2);
        assert_eq!(route.steps[0].name.as_deref(), Some("Raffles Avenue"));
        assert!(route.steps[1].name.is_none());
    }

    #[test]
    fn rejects_bodies_without_a_route() {
        assert!(matches!(
            parse_directions(r#"{"features": []}"#),
            Err(FallbackReason::MalformedBody(_))
        ));
        assert!(matches!(
            parse_directions("<html>Bad gateway</html>"),
            Err(FallbackReason::MalformedBody(_))
        ));
        let no_duration = r#"{"features": [{"properties": {"summary": {}}, "geometry": {"coordinates": []}}]}"#;
        assert!(matches!(
            parse_directions(no_duration),
            Err(FallbackReason::MalformedBody(_))
        ));
    }

    #[test]
    fn builds_profile_endpoint() {
        let client =
            OpenRouteServiceClient::new(&settings(Some("key"), "https://api.openrouteservice.org/"))
                .unwrap();
        assert_eq!(
            client.endpoint(TravelMode::Walk).unwrap().as_str(),
            "https://api.openrouteservice.org/v2/directions/foot-walking/geojson"
        );
        assert_eq!(
            client.endpoint(TravelMode::Drive).unwrap().as_str(),
            "https://api.openrouteservice.org/v2/directions/driving-car/geojson"
        );
    }

    #[actix_rt::test]
    async fn missing_key_is_reported() {
        let client = OpenRouteServiceClient::new(&settings(None, "http://127.0.0.1:1/")).unwrap();
        assert!(!client.is_configured());

        let result = client
            .fetch_route(
                TravelMode::Drive,
                &Coordinate::new(1.30, 103.85),
                &Coordinate::new(1.32, 103.85),
            )
            .await;
        assert_eq!(result, Err(FallbackReason::MissingCredential));
    }

    #[actix_rt::test]
    async fn unreachable_provider_is_a_network_failure() {
        let client =
            OpenRouteServiceClient::new(&settings(Some("key"), "http://127.0.0.1:1/")).unwrap();

        let result = client
            .fetch_route(
                TravelMode::Walk,
                &Coordinate::new(1.30, 103.85),
                &Coordinate::new(1.301, 103.85),
            )
            .await;
        assert!(matches!(result, Err(FallbackReason::Network(_))));
    }

    #[actix_rt::test]
    async fn throttle_spaces_dispatches() {
        let throttle = RequestThrottle::new(Duration::from_millis(40));
        let started = Instant::now();
        for _ in 0..3 {
            throttle.wait_for_slot().await;
        }
        assert!(started.elapsed() >= Duration::from_millis(80));
    }
}
