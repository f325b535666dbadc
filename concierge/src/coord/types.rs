//! Coordinate types and validation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum valid latitude in degrees.
pub const MIN_LAT: f64 = -90.0;
/// Maximum valid latitude in degrees.
pub const MAX_LAT: f64 = 90.0;
/// Minimum valid longitude in degrees.
pub const MIN_LON: f64 = -180.0;
/// Maximum valid longitude in degrees.
pub const MAX_LON: f64 = 180.0;

/// Errors produced when building or parsing coordinates.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordError {
    #[error("Invalid latitude: {0} (must be between -90 and 90)")]
    InvalidLatitude(f64),

    #[error("Invalid longitude: {0} (must be between -180 and 180)")]
    InvalidLongitude(f64),

    #[error("Invalid coordinate '{0}': expected 'lat,lon'")]
    Malformed(String),
}

/// A WGS84 geographic coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Create a coordinate without range checks.
    ///
    /// Intended for compile-time constants; use [`Coordinate::try_new`]
    /// for values that come from users or upstream services.
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Create a coordinate, validating both components.
    pub fn try_new(latitude: f64, longitude: f64) -> Result<Self, CoordError> {
        if !(MIN_LAT..=MAX_LAT).contains(&latitude) {
            return Err(CoordError::InvalidLatitude(latitude));
        }
        if !(MIN_LON..=MAX_LON).contains(&longitude) {
            return Err(CoordError::InvalidLongitude(longitude));
        }
        Ok(Self::new(latitude, longitude))
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5},{:.5}", self.latitude, self.longitude)
    }
}

impl FromStr for Coordinate {
    type Err = CoordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lon) = s
            .split_once(',')
            .ok_or_else(|| CoordError::Malformed(s.to_string()))?;
        let lat: f64 = lat
            .trim()
            .parse()
            .map_err(|_| CoordError::Malformed(s.to_string()))?;
        let lon: f64 = lon
            .trim()
            .parse()
            .map_err(|_| CoordError::Malformed(s.to_string()))?;
        Self::try_new(lat, lon)
    }
}

/// How far a search region extends from its centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RegionExtent {
    /// Square box reaching `meters` from the centre in each direction.
    Radius { meters: f64 },
    /// Box spanning the given number of degrees (full width, centred).
    Span { latitude_delta: f64, longitude_delta: f64 },
}

/// Axis-aligned latitude/longitude box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Whether the coordinate lies inside the box (edges inclusive).
    pub fn contains(&self, coord: &Coordinate) -> bool {
        (self.min_lat..=self.max_lat).contains(&coord.latitude)
            && (self.min_lon..=self.max_lon).contains(&coord.longitude)
    }
}

/// A reference point plus the area around it that a lookup is constrained to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchRegion {
    pub center: Coordinate,
    pub extent: RegionExtent,
}

impl SearchRegion {
    /// Region reaching `meters` around `center`.
    pub fn radius(center: Coordinate, meters: f64) -> Self {
        Self {
            center,
            extent: RegionExtent::Radius { meters },
        }
    }

    /// Region spanning `degrees` of latitude and longitude around `center`.
    pub fn span(center: Coordinate, degrees: f64) -> Self {
        Self {
            center,
            extent: RegionExtent::Span {
                latitude_delta: degrees,
                longitude_delta: degrees,
            },
        }
    }

    /// Bounding box of the region, clamped to valid coordinate ranges.
    pub fn bounding_box(&self) -> BoundingBox {
        let (half_lat, half_lon) = match self.extent {
            RegionExtent::Radius { meters } => {
                let half_lat = meters / super::METERS_PER_DEGREE_LAT;
                let cos_lat = self.center.latitude.to_radians().cos().abs().max(1e-6);
                (half_lat, half_lat / cos_lat)
            }
            RegionExtent::Span {
                latitude_delta,
                longitude_delta,
            } => (latitude_delta / 2.0, longitude_delta / 2.0),
        };

        BoundingBox {
            min_lat: (self.center.latitude - half_lat).max(MIN_LAT),
            min_lon: (self.center.longitude - half_lon).max(MIN_LON),
            max_lat: (self.center.latitude + half_lat).min(MAX_LAT),
            max_lon: (self.center.longitude + half_lon).min(MAX_LON),
        }
    }
}
