use crate::config::AppConfig;
use crate::services::day_route_service::{DayRouteService, DayRouteStore};
use crate::services::directions_service::{DirectionsProvider, OpenRouteServiceClient};
use crate::services::route_cache::RouteCache;
use crate::services::route_optimization_service::{OptimizationConfig, RouteOptimizationService};
use crate::services::route_resolver::RouteResolver;

/// Shared application state. Everything stateful is owned here and handed to
/// actix as `web::Data`, one instance per server.
pub struct AppState {
    pub optimizer: RouteOptimizationService,
    pub day_store: DayRouteStore,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> Result<Self, reqwest::Error> {
        let provider = OpenRouteServiceClient::new(&config.directions)?;
        let resolver = RouteResolver::new(provider, RouteCache::new(config.route_cache_ttl_secs));
        let optimizer = RouteOptimizationService::with_config(
            DayRouteService::new(resolver),
            OptimizationConfig {
                suggest_threshold_minutes: config.suggest_threshold_minutes,
                ..OptimizationConfig::default()
            },
        );

        Ok(Self {
            optimizer,
            day_store: DayRouteStore::new(),
        })
    }

    pub fn resolver(&self) -> &RouteResolver {
        self.optimizer.day_routes().resolver()
    }

    pub fn day_routes(&self) -> &DayRouteService {
        self.optimizer.day_routes()
    }

    pub fn directions_configured(&self) -> bool {
        self.resolver().provider().is_configured()
    }
}
