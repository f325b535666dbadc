//! UI-facing kiosk state and its event reducer.
//!
//! Background work never mutates [`KioskState`] directly. It produces
//! [`KioskEvent`]s, and [`KioskState::apply`] folds them in one at a time on
//! the single owner. Events from superseded itinerary runs are dropped here as
//! a second line of defence behind the generation guards.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::distance::UNKNOWN_DISTANCE;
use crate::generation::{GenerationState, GenerationStatus, PartialTrip, Trip};
use crate::ride::RideEstimate;
use crate::search::{SearchResult, SearchSnapshot, SearchStatus};
use crate::task_slot::Generation;

/// Price range for the trip from the hotel to the selected place.
#[derive(Debug, Clone, PartialEq)]
pub struct RideQuote {
    pub destination: String,
    pub estimate: RideEstimate,
}

impl RideQuote {
    /// `"$x.xx - $y.yy"`.
    pub fn price_text(&self) -> String {
        self.estimate.to_string()
    }

    pub fn bucket_label(&self) -> &'static str {
        self.estimate.bucket().label()
    }
}

/// What the itinerary panel shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItineraryView {
    /// Run the view belongs to.
    pub generation: Generation,
    pub state: GenerationState,
    /// Latest snapshot of the run; kept when the run fails or is cancelled.
    pub snapshot: Option<Arc<PartialTrip>>,
    /// Final trip once the run completes.
    pub trip: Option<Arc<Trip>>,
}

impl ItineraryView {
    /// Switch to `generation`, discarding the previous run's output.
    ///
    /// Returns `None` if `generation` is older than the current run, otherwise
    /// whether the view was reset for a newer run.
    fn adopt(&mut self, generation: Generation) -> Option<bool> {
        if generation < self.generation {
            return None;
        }
        let newer = generation > self.generation;
        if newer {
            *self = ItineraryView {
                generation,
                ..Default::default()
            };
        }
        Some(newer)
    }
}

/// Store `value` in `slot`, reporting whether it differed.
fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

/// Store a shared value, treating the same allocation as unchanged.
fn replace_shared<T>(slot: &mut Option<Arc<T>>, value: Arc<T>) -> bool {
    let same = slot.as_ref().is_some_and(|held| Arc::ptr_eq(held, &value));
    *slot = Some(value);
    !same
}

/// Everything the kiosk screen renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KioskState {
    pub search: SearchSnapshot,
    pub selected: Option<SearchResult>,
    pub ride: Option<RideQuote>,
    /// Distance text per recommendation name.
    pub distances: BTreeMap<String, String>,
    pub itinerary: ItineraryView,
}

/// A state change produced by background work or user action.
#[derive(Debug, Clone, PartialEq)]
pub enum KioskEvent {
    SearchUpdated(SearchSnapshot),
    PlaceSelected { place: SearchResult, ride: RideEstimate },
    SelectionCleared,
    DistanceResolved { name: String, text: String },
    ItineraryStatus(GenerationStatus),
    ItinerarySnapshot {
        generation: Generation,
        snapshot: Arc<PartialTrip>,
    },
    ItineraryCompleted {
        generation: Generation,
        trip: Arc<Trip>,
    },
}

impl KioskState {
    /// Fold one event into the state. Returns `true` if anything changed.
    pub fn apply(&mut self, event: KioskEvent) -> bool {
        match event {
            KioskEvent::SearchUpdated(snapshot) => {
                let cleared = snapshot.status == SearchStatus::Idle && self.clear_selection();
                replace(&mut self.search, snapshot) | cleared
            }
            KioskEvent::PlaceSelected { place, ride } => {
                let quote = RideQuote {
                    destination: place.name.clone(),
                    estimate: ride,
                };
                replace(&mut self.ride, Some(quote)) | replace(&mut self.selected, Some(place))
            }
            KioskEvent::SelectionCleared => self.clear_selection(),
            KioskEvent::DistanceResolved { name, text } => {
                let name = name.trim();
                if self.distances.get(name) == Some(&text) {
                    return false;
                }
                self.distances.insert(name.to_string(), text);
                true
            }
            KioskEvent::ItineraryStatus(status) => {
                let lagging = status.generation == self.itinerary.generation
                    && status.state.is_active()
                    && self.itinerary.state != GenerationState::Idle
                    && !self.itinerary.state.is_active();
                // A lagging status must not reopen a finished run
                if lagging {
                    return false;
                }
                match self.itinerary.adopt(status.generation) {
                    Some(reset) => replace(&mut self.itinerary.state, status.state) | reset,
                    None => false,
                }
            }
            KioskEvent::ItinerarySnapshot {
                generation,
                snapshot,
            } => match self.itinerary.adopt(generation) {
                Some(reset) => replace_shared(&mut self.itinerary.snapshot, snapshot) | reset,
                None => false,
            },
            KioskEvent::ItineraryCompleted { generation, trip } => {
                match self.itinerary.adopt(generation) {
                    Some(reset) => {
                        replace(&mut self.itinerary.state, GenerationState::Completed)
                            | replace_shared(&mut self.itinerary.trip, trip)
                            | reset
                    }
                    None => false,
                }
            }
        }
    }

    fn clear_selection(&mut self) -> bool {
        replace(&mut self.selected, None) | replace(&mut self.ride, None)
    }

    /// Distance text for a recommendation, or the unknown marker.
    pub fn distance_text(&self, name: &str) -> &str {
        self.distances
            .get(name.trim())
            .map(String::as_str)
            .unwrap_or(UNKNOWN_DISTANCE)
    }
}
