//! Per-day route aggregation.
//!
//! A day's route is one segment per consecutive pair of activities plus the
//! day's totals. Routes are transient and rebuilt from scratch whenever the
//! order changes; [`DayRouteStore`] keeps only the newest result per day.

use futures::future::join_all;
use log::debug;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use super::directions_service::{DirectionsProvider, OpenRouteServiceClient};
use super::geo::round_km;
use super::route_resolver::RouteResolver;
use crate::models::activity::Activity;
use crate::models::route::{DayRoute, DayTotals, RouteSegment, TravelMode};

pub struct DayRouteService<P = OpenRouteServiceClient> {
    resolver: RouteResolver<P>,
}

impl<P: DirectionsProvider> DayRouteService<P> {
    pub fn new(resolver: RouteResolver<P>) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &RouteResolver<P> {
        &self.resolver
    }

    /// Compute segments and totals without touching the activities.
    ///
    /// Hops are resolved concurrently; `segments[i - 1]` always belongs to the
    /// hop into `activities[i]`.
    pub async fn build_day_route(&self, activities: &[Activity]) -> DayRoute {
        let hops = activities.windows(2).map(|pair| async move {
            match (pair[0].coordinates.as_ref(), pair[1].coordinates.as_ref()) {
                (Some(prev), Some(next)) => {
                    Some(self.resolver.resolve_route(Some(prev), Some(next)).await)
                }
                _ => None,
            }
        });

        let segments = join_all(hops).await;
        let totals = day_totals(&segments);

        DayRoute { segments, totals }
    }

    /// Same as [`build_day_route`](Self::build_day_route), then write each hop's
    /// label to the `travel_time` of the activity it leads into.
    pub async fn annotate_day_route(&self, activities: &mut [Activity]) -> DayRoute {
        let route = self.build_day_route(activities).await;
        apply_travel_labels(activities, &route);
        route
    }
}

pub fn apply_travel_labels(activities: &mut [Activity], route: &DayRoute) {
    for (segment, activity) in route.segments.iter().zip(activities.iter_mut().skip(1)) {
        if let Some(segment) = segment {
            activity.travel_time = Some(segment.label.clone());
        }
    }
}

pub fn day_totals(segments: &[Option<RouteSegment>]) -> DayTotals {
    let mut total_km = 0.0;
    let mut walk_minutes = 0.0;
    let mut drive_minutes = 0.0;

    for segment in segments.iter().flatten() {
        total_km += segment.distance_km;
        match segment.mode {
            TravelMode::Walk => walk_minutes += segment.minutes,
            TravelMode::Drive => drive_minutes += segment.minutes,
        }
    }

    DayTotals {
        total_km: round_km(total_km),
        walk_minutes,
        drive_minutes,
        total_minutes: walk_minutes + drive_minutes,
    }
}

/// Issued by [`DayRouteStore::begin`]; only the newest token for a day may commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecomputeToken {
    pub day: u32,
    pub version: u64,
}

#[derive(Debug, Default)]
struct DayEntry {
    latest_version: u64,
    route: Option<DayRoute>,
}

/// Latest computed route per day index.
#[derive(Debug, Default)]
pub struct DayRouteStore {
    next_version: AtomicU64,
    days: Mutex<HashMap<u32, DayEntry>>,
}

impl DayRouteStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn days(&self) -> MutexGuard<'_, HashMap<u32, DayEntry>> {
        self.days.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Start a recomputation for `day`, superseding any still in flight.
    pub fn begin(&self, day: u32) -> RecomputeToken {
        let version = self.next_version.fetch_add(1, Ordering::Relaxed) + 1;
        self.days().entry(day).or_default().latest_version = version;
        RecomputeToken { day, version }
    }

    /// Store `route` if `token` is still the newest for its day. Returns whether it was applied.
    pub fn commit(&self, token: RecomputeToken, route: DayRoute) -> bool {
        let mut days = self.days();
        match days.get_mut(&token.day) {
            Some(entry) if entry.latest_version == token.version => {
                entry.route = Some(route);
                true
            }
            _ => {
                debug!(
                    "Discarding stale route for day {} (version {})",
                    token.day, token.version
                );
                false
            }
        }
    }

    pub fn get(&self, day: u32) -> Option<DayRoute> {
        self.days().get(&day).and_then(|entry| entry.route.clone())
    }
}
