//! Configuration structs and their defaults.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::coord::{Coordinate, SearchRegion};
use crate::distance::DEFAULT_SPAN_DEGREES;
use crate::generation::{DEFAULT_ENDPOINT, DEFAULT_MODEL};
use crate::provider::NOMINATIM_BASE_URL;
use crate::ride::PricingModel;
use crate::search::DEFAULT_DEBOUNCE;

/// Hotel location, the reference point for place search.
pub const DEFAULT_HOTEL: Coordinate = Coordinate::new(37.2309, -80.4236);

/// Guest location, the reference point for recommendation distances.
pub const DEFAULT_GUEST: Coordinate = Coordinate::new(37.19928, -80.40117);

/// Place search radius around the hotel.
pub const DEFAULT_SEARCH_RADIUS_METERS: f64 = 5000.0;

/// Environment variable holding the generation API key.
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Generation request timeout.
pub const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 60;

/// Complete kiosk configuration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConfigFile {
    pub location: LocationSettings,
    pub search: SearchSettings,
    pub distance: DistanceSettings,
    pub ride: PricingModel,
    pub generation: GenerationSettings,
    pub data: DataSettings,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationSettings {
    pub hotel: Coordinate,
    pub guest: Coordinate,
}

impl Default for LocationSettings {
    fn default() -> Self {
        Self {
            hotel: DEFAULT_HOTEL,
            guest: DEFAULT_GUEST,
        }
    }
}

/// Which place lookup backs search and distance resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderKind {
    /// Built-in list of Blacksburg places, no network
    Catalog,
    /// OpenStreetMap Nominatim over HTTP
    #[default]
    Nominatim,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Catalog => write!(f, "catalog"),
            ProviderKind::Nominatim => write!(f, "nominatim"),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "catalog" => Ok(ProviderKind::Catalog),
            "nominatim" => Ok(ProviderKind::Nominatim),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchSettings {
    pub debounce_ms: u64,
    pub radius_meters: f64,
    pub provider: ProviderKind,
    pub nominatim_url: String,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE.as_millis() as u64,
            radius_meters: DEFAULT_SEARCH_RADIUS_METERS,
            provider: ProviderKind::default(),
            nominatim_url: NOMINATIM_BASE_URL.to_string(),
        }
    }
}

impl SearchSettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceSettings {
    pub span_degrees: f64,
}

impl Default for DistanceSettings {
    fn default() -> Self {
        Self {
            span_degrees: DEFAULT_SPAN_DEGREES,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub endpoint: String,
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub timeout_secs: u64,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            timeout_secs: DEFAULT_GENERATION_TIMEOUT_SECS,
        }
    }
}

impl GenerationSettings {
    /// The API key from the configured environment variable, if set.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Local guest data files.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataSettings {
    pub profile_path: Option<PathBuf>,
    pub feed_path: Option<PathBuf>,
}

impl ConfigFile {
    /// Region place searches are constrained to.
    pub fn search_region(&self) -> SearchRegion {
        SearchRegion::radius(self.location.hotel, self.search.radius_meters)
    }

    /// Region distance lookups are constrained to.
    pub fn distance_region(&self) -> SearchRegion {
        SearchRegion::span(self.location.guest, self.distance.span_degrees)
    }
}
