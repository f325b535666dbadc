//! Place lookup provider abstraction
//!
//! This module provides the [`PlaceLookup`] trait used by the search box and
//! the distance cache, plus two implementations:
//!
//! - [`CatalogLookup`]: fixed in-memory list of places (offline mode, tests)
//! - [`NominatimLookup`]: OpenStreetMap Nominatim search over HTTP
//!
//! ```ignore
//! use concierge::provider::{NominatimLookup, PlaceLookup, ReqwestClient};
//!
//! let lookup = NominatimLookup::new(ReqwestClient::new()?);
//! let places = lookup.lookup("pizza", &region).await?;
//! ```

mod catalog;
mod http;
mod nominatim;
mod types;

pub use catalog::{CatalogLookup, CatalogPlace};
pub use http::{HttpClient, ReqwestClient, USER_AGENT};
pub use nominatim::{NominatimLookup, NOMINATIM_BASE_URL};
pub use types::{LookupError, PlaceCandidate, PlaceLookup};

#[cfg(test)]
pub use http::tests::MockHttpClient;
