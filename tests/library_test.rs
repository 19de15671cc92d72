//! Exercises the in-process API the itinerary UI links against.

use trippuddy_api::config::DirectionsSettings;
use trippuddy_api::services::day_route_service::DayRouteService;
use trippuddy_api::services::directions_service::OpenRouteServiceClient;
use trippuddy_api::services::route_cache::RouteCache;
use trippuddy_api::services::route_optimization_service::RouteOptimizationService;
use trippuddy_api::services::route_resolver::RouteResolver;
use trippuddy_api::{classify_mode, distance_km, optimize_order, Activity, Coordinate, TravelMode};

fn estimate_only_optimizer() -> RouteOptimizationService {
    let provider = OpenRouteServiceClient::new(&DirectionsSettings::default()).unwrap();
    RouteOptimizationService::new(DayRouteService::new(RouteResolver::new(
        provider,
        RouteCache::default(),
    )))
}

#[test]
fn test_distance_and_mode() {
    let a = Coordinate::new(1.30, 103.85);
    let b = Coordinate::new(1.3005, 103.8505);

    let km = distance_km(Some(&a), Some(&b));
    assert!(km > 0.07 && km < 0.09);
    assert_eq!(classify_mode(km), TravelMode::Walk);
    assert_eq!(distance_km(Some(&a), None), 0.0);
}

#[test]
fn test_end_to_end_singapore_day() {
    let optimizer = estimate_only_optimizer();
    let mut day = vec![
        Activity::at("near1", 1.30, 103.85),
        Activity::at("far", 1.35, 103.90),
        Activity::at("near2", 1.3005, 103.8505),
    ];

    let estimate = tokio_test::block_on(optimizer.estimate_savings(&day));
    assert!(estimate.minutes_saved > 0.0);

    let route = tokio_test::block_on(optimizer.optimize_day(&mut day));
    let order: Vec<&str> = day.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(order, vec!["near1", "near2", "far"]);
    assert!(route.segments.iter().flatten().all(|s| s.used_fallback));
    assert!((route.totals.total_minutes - estimate.optimized_minutes).abs() < 1e-9);
}

#[test]
fn test_optimize_order_keeps_every_activity() {
    let day = vec![
        Activity::at("Chinatown", 1.2838, 103.8443),
        Activity::new("Hawker dinner (unmapped)", None),
        Activity::at("Clarke Quay", 1.2906, 103.8465),
        Activity::at("Sentosa", 1.2494, 103.8303),
        Activity::at("Boat Quay", 1.2870, 103.8497),
    ];

    let optimized = optimize_order(day.clone());
    assert_eq!(optimized.len(), day.len());
    for activity in &day {
        assert!(optimized.contains(activity));
    }
}
