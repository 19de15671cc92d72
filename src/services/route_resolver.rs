//! Resolves a single hop between two activities.
//!
//! Real travel times come from the directions provider when one is configured.
//! Any provider failure is absorbed: the hop is estimated from straight-line
//! distance and the segment is marked with the [`FallbackReason`], so callers
//! always get something to render.

use log::warn;

use super::directions_service::{DirectionsProvider, OpenRouteServiceClient};
use super::geo::{classify_mode, haversine_km};
use super::route_cache::RouteCache;
use crate::models::coordinate::Coordinate;
use crate::models::route::{FallbackReason, RouteSegment, TravelMode};

pub const WALK_SPEED_KMH: f64 = 4.0;
pub const DRIVE_SPEED_KMH: f64 = 30.0;
/// Flat pickup/parking allowance added to every estimated drive.
pub const DRIVE_OVERHEAD_MINUTES: f64 = 3.0;

/// Travel minutes for a straight-line distance at the mode's average speed.
pub fn estimate_minutes(mode: TravelMode, distance_km: f64) -> f64 {
    match mode {
        TravelMode::Walk => distance_km / WALK_SPEED_KMH * 60.0,
        TravelMode::Drive => distance_km / DRIVE_SPEED_KMH * 60.0 + DRIVE_OVERHEAD_MINUTES,
    }
}

pub fn estimate_route(from: &Coordinate, to: &Coordinate, reason: FallbackReason) -> RouteSegment {
    let distance_km = haversine_km(from, to);
    let mode = classify_mode(distance_km);
    RouteSegment::estimated(
        mode,
        distance_km,
        estimate_minutes(mode, distance_km),
        *from,
        *to,
        reason,
    )
}

fn pin_endpoints(path: &mut Vec<Coordinate>, from: &Coordinate, to: &Coordinate) {
    match path.len() {
        0 | 1 => *path = vec![*from, *to],
        last => {
            path[0] = *from;
            path[last - 1] = *to;
        }
    }
}

pub struct RouteResolver<P = OpenRouteServiceClient> {
    provider: P,
    cache: RouteCache,
}

impl<P: DirectionsProvider> RouteResolver<P> {
    pub fn new(provider: P, cache: RouteCache) -> Self {
        Self { provider, cache }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn cache(&self) -> &RouteCache {
        &self.cache
    }

    pub async fn resolve_route(
        &self,
        prev: Option<&Coordinate>,
        next: Option<&Coordinate>,
    ) -> RouteSegment {
        let (from, to) = match (prev, next) {
            (Some(from), Some(to)) => (from, to),
            _ => return RouteSegment::placeholder(),
        };

        if !self.provider.is_configured() {
            return estimate_route(from, to, FallbackReason::MissingCredential);
        }

        let distance_km = haversine_km(from, to);
        let mode = classify_mode(distance_km);

        if let Some(mut cached) = self.cache.get(mode, from, to) {
            // the cached route may belong to endpoints a few meters away
            pin_endpoints(&mut cached.path, from, to);
            cached.distance_km = distance_km;
            return cached;
        }

        match self.provider.fetch_route(mode, from, to).await {
            Ok(route) => {
                let path = if route.path.is_empty() {
                    vec![*from, *to]
                } else {
                    route.path
                };
                let segment = RouteSegment::from_directions(
                    mode,
                    distance_km,
                    route.duration_s / 60.0,
                    path,
                    route.steps,
                );
                self.cache.insert(mode, from, to, segment.clone());
                segment
            }
            Err(reason) => {
                warn!("Falling back to estimated {} time: {}", mode.as_str(), reason);
                estimate_route(from, to, reason)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::route::RouteSource;
    use crate::services::directions_service::DirectionsRoute;
    use crate::services::geo::EARTH_RADIUS_KM;
    use std::cell::Cell;

    /// Provider double that returns a canned result and counts calls.
    pub struct StubProvider {
        pub configured: bool,
        pub result: Result<DirectionsRoute, FallbackReason>,
        pub calls: Cell<usize>,
    }

    impl StubProvider {
        pub fn returning(result: Result<DirectionsRoute, FallbackReason>) -> Self {
            Self {
                configured: true,
                result,
                calls: Cell::new(0),
            }
        }

        pub fn unconfigured() -> Self {
            Self {
                configured: false,
                result: Err(FallbackReason::MissingCredential),
                calls: Cell::new(0),
            }
        }
    }

    impl DirectionsProvider for StubProvider {
        fn is_configured(&self) -> bool {
            self.configured
        }

        async fn fetch_route(
            &self,
            _mode: TravelMode,
            _from: &Coordinate,
            _to: &Coordinate,
        ) -> Result<DirectionsRoute, FallbackReason> {
            self.calls.set(self.calls.get() + 1);
            self.result.clone()
        }
    }

    pub fn km_north_of(origin: Coordinate, km: f64) -> Coordinate {
        let degrees = km / (EARTH_RADIUS_KM * std::f64::consts::PI / 180.0);
        Coordinate::new(origin.lat + degrees, origin.lon)
    }

    fn origin() -> Coordinate {
        Coordinate::new(1.30, 103.85)
    }

    #[actix_rt::test]
    async fn missing_endpoint_is_placeholder() {
        let resolver = RouteResolver::new(StubProvider::unconfigured(), RouteCache::default());
        let a = origin();

        for segment in [
            resolver.resolve_route(None, Some(&a)).await,
            resolver.resolve_route(Some(&a), None).await,
        ] {
            assert_eq!(segment.mode, TravelMode::Walk);
            assert_eq!(segment.minutes, 0.0);
            assert!(segment.path.is_empty());
            assert_eq!(segment.source, RouteSource::Placeholder);
        }
    }

    #[actix_rt::test]
    async fn estimates_without_credential() {
        let provider = StubProvider::unconfigured();
        let resolver = RouteResolver::new(provider, RouteCache::default());
        let a = origin();
        let b = km_north_of(a, 2.0);

        let segment = resolver.resolve_route(Some(&a), Some(&b)).await;
        assert_eq!(segment.mode, TravelMode::Drive);
        assert!((segment.minutes - 7.0).abs() < 1e-6, "got {}", segment.minutes);
        assert_eq!(segment.label, "7 min by Taxi");
        assert_eq!(segment.path, vec![a, b]);
        assert_eq!(segment.fallback_reason(), Some(&FallbackReason::MissingCredential));
        assert_eq!(resolver.provider().calls.get(), 0);
    }

    #[actix_rt::test]
    async fn short_hop_estimates_walking_time() {
        let resolver = RouteResolver::new(StubProvider::unconfigured(), RouteCache::default());
        let a = origin();
        let b = km_north_of(a, 0.6);

        let segment = resolver.resolve_route(Some(&a), Some(&b)).await;
        assert_eq!(segment.mode, TravelMode::Walk);
        assert!((segment.minutes - 9.0).abs() < 1e-6);
        assert_eq!(segment.label, "9 min walk");
    }

    #[actix_rt::test]
    async fn provider_failure_falls_back_silently() {
        let provider = StubProvider::returning(Err(FallbackReason::Status(502)));
        let resolver = RouteResolver::new(provider, RouteCache::default());
        let a = origin();
        let b = km_north_of(a, 2.0);

        let segment = resolver.resolve_route(Some(&a), Some(&b)).await;
        assert!(segment.used_fallback);
        assert_eq!(segment.fallback_reason(), Some(&FallbackReason::Status(502)));
        assert!((segment.minutes - 7.0).abs() < 1e-6);
        // estimates are not cached
        assert!(resolver.cache().is_empty());
    }

    #[actix_rt::test]
    async fn uses_provider_route_and_caches_it() {
        let a = origin();
        let b = km_north_of(a, 2.0);
        let mid = Coordinate::new(1.309, 103.851);
        let provider = StubProvider::returning(Ok(DirectionsRoute {
            duration_s: 540.0,
            path: vec![a, mid, b],
            steps: Vec::new(),
        }));
        let resolver = RouteResolver::new(provider, RouteCache::default());

        let first = resolver.resolve_route(Some(&a), Some(&b)).await;
        assert_eq!(first.source, RouteSource::Directions);
        assert_eq!(first.minutes, 9.0);
        assert_eq!(first.label, "9 min by Taxi");
        assert_eq!(first.path, vec![a, mid, b]);

        let second = resolver.resolve_route(Some(&a), Some(&b)).await;
        assert_eq!(second, first);
        assert_eq!(resolver.provider().calls.get(), 1);
    }

    #[actix_rt::test]
    async fn cache_hit_path_starts_and_ends_at_queried_points() {
        let a = origin();
        let b = km_north_of(a, 2.0);
        let mid = Coordinate::new(1.309, 103.851);
        let provider = StubProvider::returning(Ok(DirectionsRoute {
            duration_s: 540.0,
            path: vec![a, mid, b],
            steps: Vec::new(),
        }));
        let resolver = RouteResolver::new(provider, RouteCache::default());
        resolver.resolve_route(Some(&a), Some(&b)).await;

        // a few meters off, same cache cell
        let a2 = Coordinate::new(a.lat + 0.00003, a.lon - 0.00002);
        let b2 = Coordinate::new(b.lat - 0.00002, b.lon + 0.00003);
        let hit = resolver.resolve_route(Some(&a2), Some(&b2)).await;

        assert_eq!(resolver.provider().calls.get(), 1);
        assert_eq!(hit.path, vec![a2, mid, b2]);
        assert_eq!(hit.distance_km, haversine_km(&a2, &b2));
        assert_eq!(hit.minutes, 9.0);
    }

    #[actix_rt::test]
    async fn sub_minute_route_reads_walking_distance() {
        let a = origin();
        let b = km_north_of(a, 0.05);
        let provider = StubProvider::returning(Ok(DirectionsRoute {
            duration_s: 40.0,
            path: Vec::new(),
            steps: Vec::new(),
        }));
        let resolver = RouteResolver::new(provider, RouteCache::default());

        let segment = resolver.resolve_route(Some(&a), Some(&b)).await;
        assert_eq!(segment.label, "Walking distance");
        assert_eq!(segment.path, vec![a, b]);
    }
}
