//! In-memory place catalog.
//!
//! Answers lookups from a fixed list of named places. Used when the kiosk runs
//! offline and as a deterministic provider in tests.

use futures::future::BoxFuture;
use serde::Deserialize;

use crate::coord::{Coordinate, SearchRegion};
use crate::provider::{LookupError, PlaceCandidate, PlaceLookup};

/// Words ignored when matching a query against catalog entries.
const STOPWORDS: &[&str] = &["a", "an", "the", "near", "me", "in", "around", "by", "at", "nearby"];

/// One place known to the catalog.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CatalogPlace {
    pub name: String,
    pub address: String,
    pub coordinate: Coordinate,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl CatalogPlace {
    fn new(name: &str, address: &str, lat: f64, lon: f64, keywords: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            address: address.to_string(),
            coordinate: Coordinate::new(lat, lon),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    fn haystack(&self) -> String {
        let mut text = self.name.to_lowercase();
        for keyword in &self.keywords {
            text.push(' ');
            text.push_str(&keyword.to_lowercase());
        }
        text
    }
}

/// Place lookup backed by a fixed in-memory list.
#[derive(Debug, Clone, Default)]
pub struct CatalogLookup {
    places: Vec<CatalogPlace>,
}

impl CatalogLookup {
    /// Create a catalog from an explicit list of places.
    pub fn new(places: Vec<CatalogPlace>) -> Self {
        Self { places }
    }

    /// Parse a catalog from a JSON array of places.
    pub fn from_json(bytes: &[u8]) -> Result<Self, LookupError> {
        let places: Vec<CatalogPlace> = serde_json::from_slice(bytes)
            .map_err(|e| LookupError::InvalidResponse(format!("catalog: {}", e)))?;
        Ok(Self::new(places))
    }

    /// Built-in catalog of places around the Blacksburg, VA hotel.
    pub fn blacksburg() -> Self {
        Self::new(vec![
            CatalogPlace::new(
                "Cassell Coliseum",
                "675 Washington St SW, Blacksburg, VA",
                37.22268,
                -80.41902,
                &["arena", "basketball", "sports"],
            ),
            CatalogPlace::new(
                "Lane Stadium",
                "185 Beamer Way, Blacksburg, VA",
                37.21990,
                -80.41800,
                &["stadium", "football", "sports"],
            ),
            CatalogPlace::new(
                "Moss Arts Center",
                "190 Alumni Mall, Blacksburg, VA",
                37.23195,
                -80.41759,
                &["arts", "theater", "museum", "culture"],
            ),
            CatalogPlace::new(
                "Benny Marzano's",
                "611 N Main St, Blacksburg, VA",
                37.23530,
                -80.41950,
                &["pizza", "italian", "dining", "late night"],
            ),
            CatalogPlace::new(
                "Mellow Mushroom",
                "207 S Main St, Blacksburg, VA",
                37.22770,
                -80.41420,
                &["pizza", "dining", "bar"],
            ),
            CatalogPlace::new(
                "Gillie's",
                "153 College Ave, Blacksburg, VA",
                37.22930,
                -80.41380,
                &["breakfast", "vegetarian", "dining", "brunch"],
            ),
            CatalogPlace::new(
                "The Cellar",
                "302 N Main St, Blacksburg, VA",
                37.23160,
                -80.41480,
                &["bar", "nightlife", "live music", "dining"],
            ),
            CatalogPlace::new(
                "Rising Silo Brewery",
                "2351 Glade Rd, Blacksburg, VA",
                37.24890,
                -80.44680,
                &["brewery", "beer", "nightlife", "outdoor"],
            ),
            CatalogPlace::new(
                "Huckleberry Trail",
                "Miller St Trailhead, Blacksburg, VA",
                37.22490,
                -80.41150,
                &["trail", "walking", "running", "outdoor", "wellness"],
            ),
            CatalogPlace::new(
                "Hahn Horticulture Garden",
                "200 Garden Ln, Blacksburg, VA",
                37.21870,
                -80.42670,
                &["garden", "outdoor", "relaxation", "sightseeing"],
            ),
            CatalogPlace::new(
                "Blacksburg Farmers Market",
                "100 Draper Rd NW, Blacksburg, VA",
                37.23000,
                -80.41670,
                &["market", "shopping", "local", "breakfast"],
            ),
            CatalogPlace::new(
                "Mountain Lake Lodge",
                "115 Hotel Cir, Pembroke, VA",
                37.35630,
                -80.53450,
                &["lodge", "hiking", "scenic"],
            ),
        ])
    }

    /// Number of places in the catalog.
    pub fn len(&self) -> usize {
        self.places.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    fn matches(place: &CatalogPlace, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        let haystack = place.haystack();
        if haystack.contains(&query) {
            return true;
        }

        let tokens: Vec<&str> = query
            .split_whitespace()
            .filter(|t| !STOPWORDS.contains(t))
            .collect();
        !tokens.is_empty() && tokens.iter().all(|t| haystack.contains(t))
    }
}

impl PlaceLookup for CatalogLookup {
    fn lookup<'a>(
        &'a self,
        query: &'a str,
        region: &'a SearchRegion,
    ) -> BoxFuture<'a, Result<Vec<PlaceCandidate>, LookupError>> {
        let bbox = region.bounding_box();
        let found = self
            .places
            .iter()
            .filter(|p| bbox.contains(&p.coordinate))
            .filter(|p| Self::matches(p, query))
            .map(|p| PlaceCandidate::new(p.name.clone(), p.address.clone(), p.coordinate))
            .collect();
        Box::pin(async move { Ok(found) })
    }

    fn name(&self) -> &str {
        "Catalog"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOTEL: Coordinate = Coordinate::new(37.2309, -80.4236);

    fn region() -> SearchRegion {
        SearchRegion::radius(HOTEL, 5000.0)
    }

    #[tokio::test]
    async fn test_lookup_by_name() {
        let catalog = CatalogLookup::blacksburg();
        let found = catalog.lookup("cassell coliseum", &region()).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Cassell Coliseum");
    }

    #[tokio::test]
    async fn test_lookup_by_keyword_ignores_stopwords() {
        let catalog = CatalogLookup::blacksburg();
        let found = catalog.lookup("pizza near me", &region()).await.unwrap();
        let names: Vec<_> = found.iter().map(|p| p.name.as_str()).collect();
        assert!(names.contains(&"Benny Marzano's"));
        assert!(names.contains(&"Mellow Mushroom"));
    }

    #[tokio::test]
    async fn test_lookup_respects_region() {
        let catalog = CatalogLookup::blacksburg();
        let found = catalog.lookup("lodge", &region()).await.unwrap();
        assert!(found.is_empty(), "Mountain Lake Lodge is outside 5km");

        let wide = SearchRegion::radius(HOTEL, 50_000.0);
        let found = catalog.lookup("lodge", &wide).await.unwrap();
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn test_lookup_no_match_is_empty() {
        let catalog = CatalogLookup::blacksburg();
        let found = catalog.lookup("aquarium", &region()).await.unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_stopwords_only_query_matches_nothing() {
        let catalog = CatalogLookup::blacksburg();
        let found = catalog.lookup("near me", &region()).await.unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_from_json() {
        let json = br#"[{"name":"Test Cafe","address":"1 Main St",
            "coordinate":{"latitude":37.23,"longitude":-80.42},"keywords":["coffee"]}]"#;
        let catalog = CatalogLookup::from_json(json).unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(CatalogLookup::from_json(b"not json").is_err());
    }
}
