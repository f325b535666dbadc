//! Core types for place lookup providers.

use futures::future::BoxFuture;
use thiserror::Error;

use crate::coord::{Coordinate, SearchRegion};

/// Errors returned by an upstream place lookup service.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LookupError {
    /// Transport failure (connection, timeout, non-success status).
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// The service answered with something that could not be decoded.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The service refused the request (rate limit, bad key).
    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

/// A single point of interest returned by a lookup service.
///
/// Upstream order carries no meaning; callers re-rank by distance.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceCandidate {
    pub name: String,
    pub address: String,
    pub coordinate: Coordinate,
}

impl PlaceCandidate {
    pub fn new(name: impl Into<String>, address: impl Into<String>, coordinate: Coordinate) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            coordinate,
        }
    }
}

/// Geocoding / points-of-interest search service.
///
/// Implementations must be `Send + Sync` so a single instance can be shared
/// between the search box and the distance cache. Methods return boxed
/// futures to keep the trait usable as `Arc<dyn PlaceLookup>`.
pub trait PlaceLookup: Send + Sync {
    /// Find points of interest matching `query` inside `region`.
    ///
    /// An empty list is a valid answer, not an error.
    fn lookup<'a>(
        &'a self,
        query: &'a str,
        region: &'a SearchRegion,
    ) -> BoxFuture<'a, Result<Vec<PlaceCandidate>, LookupError>>;

    /// Human-readable provider name for logs.
    fn name(&self) -> &str;
}
