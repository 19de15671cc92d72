#![allow(dead_code)]

use actix_web::{middleware::Logger, web, App};
use serde_json::{json, Value};

use trippuddy_api::config::AppConfig;
use trippuddy_api::routes;
use trippuddy_api::state::AppState;

pub struct TestApp {
    pub state: web::Data<AppState>,
}

impl TestApp {
    /// App without a directions key, so every hop is estimated locally.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let state = AppState::from_config(&config).expect("Failed to build app state");
        Self {
            state: web::Data::new(state),
        }
    }

    pub fn create_app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .wrap(Logger::default())
            .app_data(self.state.clone())
            .configure(routes::configure)
    }
}

pub fn activity(title: &str, lat: f64, lon: f64) -> Value {
    json!({ "title": title, "coordinates": { "lat": lat, "lon": lon } })
}

/// near1, far, near2: the back-and-forth order from the Singapore itinerary.
pub fn singapore_back_and_forth() -> Value {
    json!([
        activity("near1", 1.30, 103.85),
        activity("far", 1.35, 103.90),
        activity("near2", 1.3005, 103.8505),
    ])
}

pub fn titles(activities: &Value) -> Vec<String> {
    activities
        .as_array()
        .expect("activities should be an array")
        .iter()
        .map(|a| a["title"].as_str().unwrap_or_default().to_string())
        .collect()
}
