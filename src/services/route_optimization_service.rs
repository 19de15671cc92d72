//! Route Optimization Service
//!
//! This service reorders the activities within a day to cut travel time and
//! avoid back-and-forth routing, and estimates how much the reorder saves.
//!
//! ## Algorithm
//! 1. Cluster: take the first remaining activity as a seed and pull in every
//!    remaining activity within [`CLUSTER_RADIUS_KM`] of the seed. Membership is
//!    tested against the seed only, so clusters are not transitive.
//! 2. Order each cluster of three or more by greedy nearest neighbour, starting
//!    from its seed.
//! 3. Chain the clusters by greedy nearest neighbour over their centroids,
//!    starting from the first cluster.
//! 4. Flatten.
//!
//! This is an O(n²) greedy heuristic, not an exact tour. Activities without
//! coordinates are infinitely far from everything: they end up in their own
//! cluster and are only picked when nothing closer remains. Ties go to the
//! first candidate in list order.

use log::info;

use super::day_route_service::DayRouteService;
use super::directions_service::{DirectionsProvider, OpenRouteServiceClient};
use super::geo::{centroid, haversine_km};
use crate::models::activity::Activity;
use crate::models::coordinate::Coordinate;
use crate::models::route::{DayRoute, SavingsEstimate};

pub const CLUSTER_RADIUS_KM: f64 = 0.9;
pub const SUGGEST_THRESHOLD_MINUTES: f64 = 8.0;

#[derive(Debug, Clone)]
pub struct OptimizationConfig {
    pub cluster_radius_km: f64,
    /// Savings above this make "optimize" a highlighted recommendation.
    pub suggest_threshold_minutes: f64,
}

impl Default for OptimizationConfig {
    fn default() -> Self {
        Self {
            cluster_radius_km: CLUSTER_RADIUS_KM,
            suggest_threshold_minutes: SUGGEST_THRESHOLD_MINUTES,
        }
    }
}

pub struct RouteOptimizationService<P = OpenRouteServiceClient> {
    day_routes: DayRouteService<P>,
    config: OptimizationConfig,
}

impl<P: DirectionsProvider> RouteOptimizationService<P> {
    pub fn new(day_routes: DayRouteService<P>) -> Self {
        Self {
            day_routes,
            config: OptimizationConfig::default(),
        }
    }

    pub fn with_config(day_routes: DayRouteService<P>, config: OptimizationConfig) -> Self {
        Self { day_routes, config }
    }

    pub fn day_routes(&self) -> &DayRouteService<P> {
        &self.day_routes
    }

    pub fn config(&self) -> &OptimizationConfig {
        &self.config
    }

    pub fn optimize_order(&self, activities: Vec<Activity>) -> Vec<Activity> {
        optimize_order_within(activities, self.config.cluster_radius_km)
    }

    /// Compare the current order's travel time with the optimized order's.
    /// Neither order is written back.
    pub async fn estimate_savings(&self, activities: &[Activity]) -> SavingsEstimate {
        let current = self.day_routes.build_day_route(activities).await;
        let candidate = self.optimize_order(activities.to_vec());
        let optimized = self.day_routes.build_day_route(&candidate).await;

        let current_minutes = current.totals.total_minutes;
        let optimized_minutes = optimized.totals.total_minutes;
        // a worse candidate is reported as no savings rather than a negative number
        let minutes_saved = (current_minutes - optimized_minutes).max(0.0);
        let recommended = minutes_saved > self.config.suggest_threshold_minutes;

        info!(
            "Optimizing {} activities saves {:.1} min ({:.1} -> {:.1}){}",
            activities.len(),
            minutes_saved,
            current_minutes,
            optimized_minutes,
            if recommended { ", recommending" } else { "" }
        );

        SavingsEstimate {
            current_minutes,
            optimized_minutes,
            minutes_saved,
            recommended,
        }
    }

    /// Reorder the day in place and relabel every hop for the new order.
    pub async fn optimize_day(&self, activities: &mut Vec<Activity>) -> DayRoute {
        let reordered = self.optimize_order(std::mem::take(activities));
        *activities = reordered;
        self.day_routes.annotate_day_route(activities).await
    }
}

/// Reorder with the default cluster radius.
pub fn optimize_order(activities: Vec<Activity>) -> Vec<Activity> {
    optimize_order_within(activities, CLUSTER_RADIUS_KM)
}

pub fn optimize_order_within(activities: Vec<Activity>, cluster_radius_km: f64) -> Vec<Activity> {
    if activities.len() <= 1 {
        return activities;
    }

    let clusters = cluster_by_seed(activities, cluster_radius_km)
        .into_iter()
        .map(order_cluster)
        .collect();

    chain_clusters(clusters).into_iter().flatten().collect()
}

fn comparable_km(a: Option<&Coordinate>, b: Option<&Coordinate>) -> f64 {
    match (a, b) {
        (Some(a), Some(b)) => haversine_km(a, b),
        _ => f64::INFINITY,
    }
}

/// Index of the candidate nearest to `from`. First wins on ties, and when
/// nothing is reachable.
fn nearest_index<'a, I>(from: Option<&Coordinate>, candidates: I) -> usize
where
    I: IntoIterator<Item = Option<&'a Coordinate>>,
{
    let mut nearest = 0;
    let mut nearest_km = f64::INFINITY;

    for (idx, candidate) in candidates.into_iter().enumerate() {
        let km = comparable_km(from, candidate);
        if km < nearest_km {
            nearest = idx;
            nearest_km = km;
        }
    }

    nearest
}

fn cluster_by_seed(mut remaining: Vec<Activity>, radius_km: f64) -> Vec<Vec<Activity>> {
    let mut clusters = Vec::new();

    while !remaining.is_empty() {
        let seed = remaining.remove(0);
        let (near, far): (Vec<Activity>, Vec<Activity>) = remaining.into_iter().partition(|a| {
            comparable_km(seed.coordinates.as_ref(), a.coordinates.as_ref()) <= radius_km
        });

        let mut cluster = Vec::with_capacity(near.len() + 1);
        cluster.push(seed);
        cluster.extend(near);
        clusters.push(cluster);
        remaining = far;
    }

    clusters
}

fn order_cluster(mut cluster: Vec<Activity>) -> Vec<Activity> {
    if cluster.len() <= 2 {
        return cluster;
    }

    let mut ordered = Vec::with_capacity(cluster.len());
    let mut last = cluster.remove(0);

    while !cluster.is_empty() {
        let next = nearest_index(
            last.coordinates.as_ref(),
            cluster.iter().map(|a| a.coordinates.as_ref()),
        );
        ordered.push(std::mem::replace(&mut last, cluster.remove(next)));
    }
    ordered.push(last);

    ordered
}

fn chain_clusters(clusters: Vec<Vec<Activity>>) -> Vec<Vec<Activity>> {
    let mut remaining: Vec<(Option<Coordinate>, Vec<Activity>)> = clusters
        .into_iter()
        .map(|cluster| {
            let center = centroid(cluster.iter().map(|a| a.coordinates.as_ref()));
            (center, cluster)
        })
        .collect();

    if remaining.is_empty() {
        return Vec::new();
    }

    let mut chained = Vec::with_capacity(remaining.len());
    let mut last = remaining.remove(0);

    while !remaining.is_empty() {
        let next = nearest_index(
            last.0.as_ref(),
            remaining.iter().map(|(center, _)| center.as_ref()),
        );
        chained.push(std::mem::replace(&mut last, remaining.remove(next)).1);
    }
    chained.push(last.1);

    chained
}
