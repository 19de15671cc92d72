use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    #[serde(alias = "lng")]
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CoordinateError {
    NotFinite { lat: f64, lon: f64 },
    LatitudeOutOfRange(f64),
    LongitudeOutOfRange(f64),
}

impl std::fmt::Display for CoordinateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoordinateError::NotFinite { lat, lon } => {
                write!(f, "Coordinate ({}, {}) is not finite", lat, lon)
            }
            CoordinateError::LatitudeOutOfRange(lat) => {
                write!(f, "Latitude {} is outside [-90, 90]", lat)
            }
            CoordinateError::LongitudeOutOfRange(lon) => {
                write!(f, "Longitude {} is outside [-180, 180]", lon)
            }
        }
    }
}

impl std::error::Error for CoordinateError {}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Build from a GeoJSON position, which is ordered `[lon, lat]`.
    pub fn from_lon_lat(position: [f64; 2]) -> Self {
        Self {
            lat: position[1],
            lon: position[0],
        }
    }

    pub fn to_lon_lat(&self) -> [f64; 2] {
        [self.lon, self.lat]
    }

    pub fn validate(&self) -> Result<(), CoordinateError> {
        if !self.lat.is_finite() || !self.lon.is_finite() {
            return Err(CoordinateError::NotFinite {
                lat: self.lat,
                lon: self.lon,
            });
        }
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(CoordinateError::LatitudeOutOfRange(self.lat));
        }
        if !(-180.0..=180.0).contains(&self.lon) {
            return Err(CoordinateError::LongitudeOutOfRange(self.lon));
        }
        Ok(())
    }
}
