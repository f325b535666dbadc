//! Region-constrained place search with distance ranking.

use std::sync::Arc;

use tracing::{debug, warn};

use super::types::{SearchError, SearchResult};
use crate::coord::{distance_meters, SearchRegion};
use crate::provider::{PlaceCandidate, PlaceLookup};

/// Issues lookups for a text query and ranks the answers by distance.
///
/// Upstream order is not trusted: results are always re-sorted by
/// straight-line distance from the region centre (stable, so equal distances
/// keep upstream order). The search future owns no shared state, so dropping
/// it mid-flight cancels the lookup without leaking partial results.
#[derive(Clone)]
pub struct PlaceSearchCoordinator {
    lookup: Arc<dyn PlaceLookup>,
}

impl std::fmt::Debug for PlaceSearchCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaceSearchCoordinator")
            .field("lookup", &self.lookup.name())
            .finish()
    }
}

impl PlaceSearchCoordinator {
    pub fn new(lookup: Arc<dyn PlaceLookup>) -> Self {
        Self { lookup }
    }

    /// Search for `query` inside `region`.
    ///
    /// # Errors
    ///
    /// - [`SearchError::InputInvalid`] if the query is blank (no lookup is made)
    /// - [`SearchError::Unavailable`] if the lookup service fails
    pub async fn search(
        &self,
        query: &str,
        region: &SearchRegion,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SearchError::InputInvalid);
        }

        let candidates = self.lookup.lookup(query, region).await.map_err(|e| {
            warn!(query, provider = self.lookup.name(), error = %e, "Place lookup failed");
            SearchError::from(e)
        })?;

        let results = rank_by_distance(candidates, region);
        debug!(query, count = results.len(), "Place search completed");
        Ok(results)
    }
}

/// Convert candidates to results ordered by ascending distance from the region centre.
pub fn rank_by_distance(candidates: Vec<PlaceCandidate>, region: &SearchRegion) -> Vec<SearchResult> {
    let mut results: Vec<SearchResult> = candidates
        .into_iter()
        .map(|c| SearchResult {
            distance_from_reference: distance_meters(&region.center, &c.coordinate),
            name: c.name,
            address_line: c.address,
            coordinate: c.coordinate,
        })
        .collect();

    // sort_by is stable: ties keep upstream order
    results.sort_by(|a, b| a.distance_from_reference.total_cmp(&b.distance_from_reference));
    results
}
