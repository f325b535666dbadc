//! OpenStreetMap Nominatim place lookup.
//!
//! # URL Pattern
//!
//! `{base}/search?q={query}&format=jsonv2&viewbox={minlon},{maxlat},{maxlon},{minlat}&bounded=1&limit={n}`
//!
//! - `bounded=1` restricts matches to the viewbox built from the search region
//! - No authentication, but a descriptive User-Agent is mandatory
//! - The public instance allows roughly one request per second
//!
//! # Terms of Use
//!
//! See: <https://operations.osmfoundation.org/policies/nominatim/>

use futures::future::BoxFuture;
use serde::Deserialize;
use tracing::debug;

use crate::coord::{Coordinate, SearchRegion};
use crate::provider::{HttpClient, LookupError, PlaceCandidate, PlaceLookup};

/// Public Nominatim instance.
pub const NOMINATIM_BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// Maximum number of results requested per lookup.
const RESULT_LIMIT: u32 = 15;

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    #[serde(default)]
    name: Option<String>,
    display_name: String,
}

impl NominatimPlace {
    fn into_candidate(self) -> Result<PlaceCandidate, LookupError> {
        let latitude: f64 = self
            .lat
            .parse()
            .map_err(|_| LookupError::InvalidResponse(format!("bad latitude '{}'", self.lat)))?;
        let longitude: f64 = self
            .lon
            .parse()
            .map_err(|_| LookupError::InvalidResponse(format!("bad longitude '{}'", self.lon)))?;
        let coordinate = Coordinate::try_new(latitude, longitude)
            .map_err(|e| LookupError::InvalidResponse(e.to_string()))?;

        let name = match self.name.filter(|n| !n.trim().is_empty()) {
            Some(name) => name,
            None => self
                .display_name
                .split(',')
                .next()
                .unwrap_or_default()
                .trim()
                .to_string(),
        };

        // display_name repeats the name as its first component
        let address = self
            .display_name
            .strip_prefix(name.as_str())
            .map(|rest| rest.trim_start_matches([',', ' ']).to_string())
            .unwrap_or_else(|| self.display_name.clone());

        Ok(PlaceCandidate::new(name, address, coordinate))
    }
}

/// Place lookup against a Nominatim search endpoint.
pub struct NominatimLookup<C: HttpClient> {
    http_client: C,
    base_url: String,
}

impl<C: HttpClient> NominatimLookup<C> {
    /// Creates a lookup against the public Nominatim instance.
    pub fn new(http_client: C) -> Self {
        Self::with_base_url(http_client, NOMINATIM_BASE_URL)
    }

    /// Creates a lookup against a self-hosted Nominatim instance.
    pub fn with_base_url(http_client: C, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Builds the search URL for the given query and region.
    fn build_url(&self, query: &str, region: &SearchRegion) -> Result<String, LookupError> {
        let bbox = region.bounding_box();
        let viewbox = format!(
            "{},{},{},{}",
            bbox.min_lon, bbox.max_lat, bbox.max_lon, bbox.min_lat
        );
        let limit = RESULT_LIMIT.to_string();
        reqwest::Url::parse_with_params(
            &format!("{}/search", self.base_url),
            &[
                ("q", query),
                ("format", "jsonv2"),
                ("viewbox", viewbox.as_str()),
                ("bounded", "1"),
                ("limit", limit.as_str()),
            ],
        )
        .map(String::from)
        .map_err(|e| LookupError::HttpError(format!("Invalid base URL: {}", e)))
    }

    fn parse_response(body: &[u8]) -> Result<Vec<PlaceCandidate>, LookupError> {
        let places: Vec<NominatimPlace> = serde_json::from_slice(body)
            .map_err(|e| LookupError::InvalidResponse(e.to_string()))?;
        places.into_iter().map(NominatimPlace::into_candidate).collect()
    }
}

impl<C: HttpClient> PlaceLookup for NominatimLookup<C> {
    fn lookup<'a>(
        &'a self,
        query: &'a str,
        region: &'a SearchRegion,
    ) -> BoxFuture<'a, Result<Vec<PlaceCandidate>, LookupError>> {
        Box::pin(async move {
            let url = self.build_url(query, region)?;
            debug!(query, url = %url, "Nominatim lookup");
            let body = self.http_client.get(&url).await?;
            Self::parse_response(&body)
        })
    }

    fn name(&self) -> &str {
        "Nominatim"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockHttpClient;

    const HOTEL: Coordinate = Coordinate::new(37.2309, -80.4236);

    fn sample_response() -> Vec<u8> {
        br#"[
            {"lat":"37.2226","lon":"-80.4190","name":"Cassell Coliseum",
             "display_name":"Cassell Coliseum, Washington Street, Blacksburg, Virginia"},
            {"lat":"37.2353","lon":"-80.4195","name":"",
             "display_name":"Benny Marzano's, North Main Street, Blacksburg"}
        ]"#
        .to_vec()
    }

    #[test]
    fn test_provider_name() {
        let lookup = NominatimLookup::new(MockHttpClient::new(Ok(Vec::new())));
        assert_eq!(lookup.name(), "Nominatim");
    }

    #[test]
    fn test_url_construction() {
        let lookup = NominatimLookup::with_base_url(
            MockHttpClient::new(Ok(Vec::new())),
            "http://localhost:8080/",
        );
        let url = lookup
            .build_url("pizza near me", &SearchRegion::radius(HOTEL, 5000.0))
            .unwrap();
        assert!(url.starts_with("http://localhost:8080/search?"));
        assert!(url.contains("q=pizza+near+me"));
        assert!(url.contains("bounded=1"));
        assert!(url.contains("format=jsonv2"));
    }

    #[tokio::test]
    async fn test_lookup_parses_places() {
        let lookup = NominatimLookup::new(MockHttpClient::new(Ok(sample_response())));
        let found = lookup
            .lookup("coliseum", &SearchRegion::radius(HOTEL, 5000.0))
            .await
            .unwrap();

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].name, "Cassell Coliseum");
        assert_eq!(found[0].address, "Washington Street, Blacksburg, Virginia");
        assert_eq!(found[1].name, "Benny Marzano's");
        assert_eq!(found[1].address, "North Main Street, Blacksburg");
        assert!((found[0].coordinate.latitude - 37.2226).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_lookup_propagates_http_error() {
        let lookup = NominatimLookup::new(MockHttpClient::new(Err(LookupError::HttpError(
            "timeout".to_string(),
        ))));
        let result = lookup
            .lookup("coliseum", &SearchRegion::radius(HOTEL, 5000.0))
            .await;
        assert!(matches!(result, Err(LookupError::HttpError(_))));
    }

    #[tokio::test]
    async fn test_lookup_rejects_malformed_body() {
        let lookup = NominatimLookup::new(MockHttpClient::new(Ok(b"<html>".to_vec())));
        let result = lookup
            .lookup("coliseum", &SearchRegion::radius(HOTEL, 5000.0))
            .await;
        assert!(matches!(result, Err(LookupError::InvalidResponse(_))));
    }

    #[test]
    fn test_empty_array_is_no_results() {
        let found = NominatimLookup::<MockHttpClient>::parse_response(b"[]").unwrap();
        assert!(found.is_empty());
    }
}
