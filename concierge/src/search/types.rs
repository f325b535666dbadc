//! Search result and snapshot types.

use std::sync::Arc;

use thiserror::Error;

use crate::coord::Coordinate;
use crate::provider::LookupError;
use crate::task_slot::Generation;

/// Errors returned by [`PlaceSearchCoordinator::search`](super::PlaceSearchCoordinator::search).
///
/// "No results" is not an error; it is an empty result list.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    /// The query was empty after trimming; no service call was made.
    #[error("Search query is empty")]
    InputInvalid,

    /// The lookup service failed.
    #[error("Search unavailable: {0}")]
    Unavailable(#[from] LookupError),
}

/// One ranked search hit.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub name: String,
    pub address_line: String,
    pub coordinate: Coordinate,
    /// Straight-line distance from the region centre, in metres.
    pub distance_from_reference: f64,
}

/// What the search box is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchStatus {
    /// Nothing typed, or the box was cleared.
    #[default]
    Idle,
    /// Input received, waiting for the typing pause to elapse.
    Debouncing,
    /// Lookup in flight.
    Searching,
    /// Results are from a completed lookup.
    Ready,
    /// The last lookup failed; results were cleared.
    Unavailable,
}

/// Point-in-time view of the search box, published to subscribers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchSnapshot {
    /// Generation that produced this snapshot.
    pub generation: Generation,
    /// Trimmed query the snapshot belongs to.
    pub query: String,
    /// Results ordered by ascending distance.
    pub results: Arc<Vec<SearchResult>>,
    pub status: SearchStatus,
}

impl SearchSnapshot {
    /// Whether an update tagged `generation` may replace this snapshot, given
    /// the slot's `current` generation.
    ///
    /// Updates from superseded generations and updates older than what is
    /// already visible are rejected.
    pub fn accepts(&self, generation: Generation, current: Generation) -> bool {
        generation == current && generation >= self.generation
    }

    /// Whether no results are visible.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
