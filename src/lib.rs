pub mod config;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

pub use models::activity::{Activity, Day};
pub use models::coordinate::Coordinate;
pub use models::route::{
    DayRoute, DayTotals, FallbackReason, RouteSegment, RouteSource, RouteStep, SavingsEstimate,
    TravelMode,
};
pub use services::geo::{classify_mode, distance_km};
pub use services::route_optimization_service::optimize_order;
