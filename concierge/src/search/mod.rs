//! Free-text place search.
//!
//! ```text
//! keystrokes ──► DebouncedQuery ──► TaskSlot ──► PlaceSearchCoordinator ──► PlaceLookup
//!                     │                                   │
//!                     └──◄── SearchSnapshot (watch) ◄─────┘ ranked by distance
//! ```
//!
//! - [`PlaceSearchCoordinator`]: one lookup, re-ranked by distance from the region centre
//! - [`DebouncedQuery`]: coalesces typing into one search per pause and publishes
//!   only results from the newest generation

mod coordinator;
mod debounce;
mod types;

pub use coordinator::{rank_by_distance, PlaceSearchCoordinator};
pub use debounce::{DebouncedQuery, DEFAULT_DEBOUNCE};
pub use types::{SearchError, SearchResult, SearchSnapshot, SearchStatus};
