//! INI serialization logic for converting `ConfigFile` → INI string.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let profile_path = config
        .data
        .profile_path
        .as_deref()
        .map(path_to_string)
        .unwrap_or_default();
    let feed_path = config
        .data
        .feed_path
        .as_deref()
        .map(path_to_string)
        .unwrap_or_default();

    format!(
        r#"[location]
; Hotel position, the centre of place searches
hotel_latitude = {}
hotel_longitude = {}
; Guest position, the reference for recommendation distances
guest_latitude = {}
guest_longitude = {}

[search]
; Quiet period after the last keystroke before searching (milliseconds)
debounce_ms = {}
; Search box half-size around the hotel (metres)
radius_meters = {}
; Place lookup:
;   catalog   - built-in list of Blacksburg places (offline)
;   nominatim - OpenStreetMap Nominatim
provider = {}
nominatim_url = {}

[distance]
; Lookup box half-size around the guest (degrees)
span_degrees = {}

[ride]
; Fare = (base + per_mile * miles) * factor
base = {}
per_mile = {}
low_factor = {}
high_factor = {}

[generation]
; OpenAI-compatible chat completions endpoint
endpoint = {}
model = {}
; Environment variable holding the API key
api_key_env = {}
timeout_secs = {}

[data]
; Guest profile and recommendation feed (JSON). Leave empty to skip personalisation.
profile_path = {}
feed_path = {}
"#,
        config.location.hotel.latitude,
        config.location.hotel.longitude,
        config.location.guest.latitude,
        config.location.guest.longitude,
        config.search.debounce_ms,
        config.search.radius_meters,
        config.search.provider,
        config.search.nominatim_url,
        config.distance.span_degrees,
        config.ride.base,
        config.ride.per_mile,
        config.ride.low_factor,
        config.ride.high_factor,
        config.generation.endpoint,
        config.generation.model,
        config.generation.api_key_env,
        config.generation.timeout_secs,
        profile_path,
        feed_path,
    )
}

fn path_to_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
