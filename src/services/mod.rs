pub mod day_route_service;
pub mod directions_service;
pub mod geo;
pub mod route_cache;
pub mod route_optimization_service;
pub mod route_resolver;
