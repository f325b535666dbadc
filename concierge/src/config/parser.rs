//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This is the single place where INI key names are mapped to struct fields.

use std::path::PathBuf;
use std::str::FromStr;

use ini::{Ini, Properties};

use super::file::ConfigFileError;
use super::settings::ConfigFile;
use crate::coord::Coordinate;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [location] section
    if let Some(section) = ini.section(Some("location")) {
        config.location.hotel = coordinate(
            section,
            "location",
            ("hotel_latitude", "hotel_longitude"),
            config.location.hotel,
        )?;
        config.location.guest = coordinate(
            section,
            "location",
            ("guest_latitude", "guest_longitude"),
            config.location.guest,
        )?;
    }

    // [search] section
    if let Some(section) = ini.section(Some("search")) {
        if let Some(v) = section.get("debounce_ms") {
            config.search.debounce_ms =
                parse(v, "search", "debounce_ms", "must be a non-negative integer (milliseconds)")?;
        }
        if let Some(v) = section.get("radius_meters") {
            config.search.radius_meters =
                positive(v, "search", "radius_meters", "must be a positive number of metres")?;
        }
        if let Some(v) = section.get("provider") {
            config.search.provider = parse(v, "search", "provider", "must be 'catalog' or 'nominatim'")?;
        }
        if let Some(v) = section.get("nominatim_url") {
            let v = v.trim();
            if !v.is_empty() {
                config.search.nominatim_url = v.to_string();
            }
        }
    }

    // [distance] section
    if let Some(section) = ini.section(Some("distance")) {
        if let Some(v) = section.get("span_degrees") {
            config.distance.span_degrees =
                positive(v, "distance", "span_degrees", "must be a positive number of degrees")?;
        }
    }

    // [ride] section
    if let Some(section) = ini.section(Some("ride")) {
        if let Some(v) = section.get("base") {
            config.ride.base = non_negative(v, "ride", "base", "must be a non-negative amount")?;
        }
        if let Some(v) = section.get("per_mile") {
            config.ride.per_mile = non_negative(v, "ride", "per_mile", "must be a non-negative amount")?;
        }
        if let Some(v) = section.get("low_factor") {
            config.ride.low_factor =
                non_negative(v, "ride", "low_factor", "must be a non-negative multiplier")?;
        }
        if let Some(v) = section.get("high_factor") {
            config.ride.high_factor =
                non_negative(v, "ride", "high_factor", "must be a non-negative multiplier")?;
        }
        if config.ride.low_factor > config.ride.high_factor {
            return Err(ConfigFileError::InvalidValue {
                section: "ride".to_string(),
                key: "low_factor".to_string(),
                value: config.ride.low_factor.to_string(),
                reason: "must not exceed high_factor".to_string(),
            });
        }
    }

    // [generation] section
    if let Some(section) = ini.section(Some("generation")) {
        if let Some(v) = section.get("endpoint") {
            let v = v.trim();
            if !v.is_empty() {
                config.generation.endpoint = v.to_string();
            }
        }
        if let Some(v) = section.get("model") {
            let v = v.trim();
            if !v.is_empty() {
                config.generation.model = v.to_string();
            }
        }
        if let Some(v) = section.get("api_key_env") {
            let v = v.trim();
            if !v.is_empty() {
                config.generation.api_key_env = v.to_string();
            }
        }
        if let Some(v) = section.get("timeout_secs") {
            let timeout: u64 =
                parse(v, "generation", "timeout_secs", "must be a positive integer (seconds)")?;
            if timeout == 0 {
                return Err(ConfigFileError::InvalidValue {
                    section: "generation".to_string(),
                    key: "timeout_secs".to_string(),
                    value: v.to_string(),
                    reason: "must be a positive integer (seconds)".to_string(),
                });
            }
            config.generation.timeout_secs = timeout;
        }
    }

    // [data] section
    if let Some(section) = ini.section(Some("data")) {
        config.data.profile_path = path(section, "profile_path");
        config.data.feed_path = path(section, "feed_path");
    }

    Ok(config)
}

fn parse<T: FromStr>(value: &str, section: &str, key: &str, reason: &str) -> Result<T, ConfigFileError> {
    value.trim().parse().map_err(|_| ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    })
}

fn non_negative(value: &str, section: &str, key: &str, reason: &str) -> Result<f64, ConfigFileError> {
    let parsed: f64 = parse(value, section, key, reason)?;
    if parsed.is_finite() && parsed >= 0.0 {
        Ok(parsed)
    } else {
        Err(ConfigFileError::InvalidValue {
            section: section.to_string(),
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        })
    }
}

fn positive(value: &str, section: &str, key: &str, reason: &str) -> Result<f64, ConfigFileError> {
    match non_negative(value, section, key, reason)? {
        parsed if parsed > 0.0 => Ok(parsed),
        _ => Err(ConfigFileError::InvalidValue {
            section: section.to_string(),
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }),
    }
}

fn coordinate(
    properties: &Properties,
    section: &str,
    (lat_key, lon_key): (&str, &str),
    fallback: Coordinate,
) -> Result<Coordinate, ConfigFileError> {
    let latitude = match properties.get(lat_key) {
        Some(v) => parse(v, section, lat_key, "must be a latitude in degrees")?,
        None => fallback.latitude,
    };
    let longitude = match properties.get(lon_key) {
        Some(v) => parse(v, section, lon_key, "must be a longitude in degrees")?,
        None => fallback.longitude,
    };
    Coordinate::try_new(latitude, longitude).map_err(|e| ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: format!("{}/{}", lat_key, lon_key),
        value: format!("{},{}", latitude, longitude),
        reason: e.to_string(),
    })
}

fn path(properties: &Properties, key: &str) -> Option<PathBuf> {
    properties
        .get(key)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(expand_tilde)
}

/// Expand a leading `~` to the home directory.
fn expand_tilde(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(rest),
        None => PathBuf::from(path),
    }
}
