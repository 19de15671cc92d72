use std::env;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

use crate::services::route_cache::DEFAULT_TTL_SECS;

const HOST: &str = "0.0.0.0";
const PORT: u16 = 8080;
const ORS_BASE_URL: &str = "https://api.openrouteservice.org/";
const DIRECTIONS_TIMEOUT_SECS: u64 = 10;
const SUGGEST_THRESHOLD_MINUTES: f64 = 8.0;

#[derive(Debug)]
pub enum ConfigError {
    InvalidNumber { var: &'static str, value: String },
    InvalidUrl { var: &'static str, value: String, reason: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidNumber { var, value } => {
                write!(f, "{} must be a number, got '{}'", var, value)
            }
            ConfigError::InvalidUrl { var, value, reason } => {
                write!(f, "{} is not a valid URL ('{}'): {}", var, value, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct DirectionsSettings {
    pub api_key: Option<String>,
    pub base_url: Url,
    pub timeout: Duration,
    pub min_request_interval: Duration,
}

impl Default for DirectionsSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            timeout: Duration::from_secs(DIRECTIONS_TIMEOUT_SECS),
            min_request_interval: Duration::ZERO,
        }
    }
}

fn default_base_url() -> Url {
    Url::parse(ORS_BASE_URL).unwrap()
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub directions: DirectionsSettings,
    pub route_cache_ttl_secs: u64,
    /// Savings above this many minutes make "optimize" a recommendation.
    pub suggest_threshold_minutes: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: HOST.to_string(),
            port: PORT,
            directions: DirectionsSettings::default(),
            route_cache_ttl_secs: DEFAULT_TTL_SECS,
            suggest_threshold_minutes: SUGGEST_THRESHOLD_MINUTES,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let base_url = match get("ORS_BASE_URL") {
            Some(raw) => parse_base_url(&raw)?,
            None => defaults.directions.base_url,
        };

        Ok(Self {
            host: get("HOST").unwrap_or(defaults.host),
            port: parse_or("PORT", get("PORT"), defaults.port)?,
            directions: DirectionsSettings {
                api_key: get("ORS_API_KEY"),
                base_url,
                timeout: Duration::from_secs(parse_or(
                    "DIRECTIONS_TIMEOUT_SECS",
                    get("DIRECTIONS_TIMEOUT_SECS"),
                    DIRECTIONS_TIMEOUT_SECS,
                )?),
                min_request_interval: Duration::from_millis(parse_or(
                    "DIRECTIONS_MIN_INTERVAL_MS",
                    get("DIRECTIONS_MIN_INTERVAL_MS"),
                    0,
                )?),
            },
            route_cache_ttl_secs: parse_or(
                "ROUTE_CACHE_TTL_SECS",
                get("ROUTE_CACHE_TTL_SECS"),
                defaults.route_cache_ttl_secs,
            )?,
            suggest_threshold_minutes: parse_or(
                "OPTIMIZE_SUGGEST_THRESHOLD_MINUTES",
                get("OPTIMIZE_SUGGEST_THRESHOLD_MINUTES"),
                defaults.suggest_threshold_minutes,
            )?,
        })
    }
}

fn parse_or<T: FromStr>(
    var: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { var, value }),
        None => Ok(default),
    }
}

// Url::join drops the last path segment unless the base ends with '/'
fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{}/", raw)
    };

    Url::parse(&normalized).map_err(|e| ConfigError::InvalidUrl {
        var: "ORS_BASE_URL",
        value: raw.to_string(),
        reason: e.to_string(),
    })
}
