//! The kiosk's single UI-facing state owner.
//!
//! [`Dashboard`] wires the search box, distance cache, itinerary session,
//! ride estimator and map focus together. Every background result is turned
//! into a [`KioskEvent`] and folded into one [`KioskState`] published through
//! a `watch` channel. Views subscribe and render; they never own logic.
//!
//! ```text
//! DebouncedQuery ──snapshots──┐
//! DistanceResolutionCache ────┤
//! ItineraryGenerationSession ─┼──► KioskEvent ──► KioskState::apply ──► watch ──► views
//! select_result (ride) ───────┘                                      └──► FocusNotifier ──► map
//! ```

mod state;

pub use state::{ItineraryView, KioskEvent, KioskState, RideQuote};

use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::ConfigFile;
use crate::coord::Coordinate;
use crate::distance::DistanceResolutionCache;
use crate::focus::FocusNotifier;
use crate::generation::{
    itinerary_request, GenerationEvent, GenerativeModel, ItineraryGenerationSession,
};
use crate::profile::{RecommendationFeed, UserProfile};
use crate::provider::PlaceLookup;
use crate::ride::PricingModel;
use crate::search::{DebouncedQuery, PlaceSearchCoordinator};
use crate::task_slot::{Generation, TaskSlot};

/// Coordinates every background component behind one published state.
pub struct Dashboard {
    search: DebouncedQuery,
    distances: DistanceResolutionCache,
    session: ItineraryGenerationSession,
    pricing: PricingModel,
    hotel: Coordinate,
    focus: FocusNotifier,
    state: Arc<watch::Sender<KioskState>>,
    distance_slot: TaskSlot,
    itinerary_slot: TaskSlot,
    forwarders: Vec<JoinHandle<()>>,
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("search", &self.search)
            .field("session", &self.session)
            .field("hotel", &self.hotel)
            .finish_non_exhaustive()
    }
}

impl Dashboard {
    /// Build a dashboard from configuration.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(
        config: &ConfigFile,
        lookup: Arc<dyn PlaceLookup>,
        model: Arc<dyn GenerativeModel>,
        focus: FocusNotifier,
    ) -> Self {
        let search = DebouncedQuery::new(
            PlaceSearchCoordinator::new(Arc::clone(&lookup)),
            config.search_region(),
            config.search.debounce(),
        );
        let distances =
            DistanceResolutionCache::new(lookup, config.location.guest, config.distance_region());
        let session = ItineraryGenerationSession::new(model);
        let (state, _) = watch::channel(KioskState::default());
        let state = Arc::new(state);

        let forwarders = vec![
            forward(search.subscribe(), Arc::clone(&state), KioskEvent::SearchUpdated),
            forward(
                session.subscribe(),
                Arc::clone(&state),
                KioskEvent::ItineraryStatus,
            ),
        ];

        Self {
            search,
            distances,
            session,
            pricing: config.ride,
            hotel: config.location.hotel,
            focus,
            state,
            distance_slot: TaskSlot::new("distances"),
            itinerary_slot: TaskSlot::new("itinerary-view"),
            forwarders,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<KioskState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> KioskState {
        self.state.borrow().clone()
    }

    /// Fold an event into the published state.
    pub fn apply(&self, event: KioskEvent) -> bool {
        apply(&self.state, event)
    }

    pub fn on_search_input(&self, text: impl Into<String>) {
        self.search.on_input(text);
    }

    pub fn on_search_submit(&self) {
        self.search.on_submit();
    }

    pub fn clear_search(&self) {
        self.search.clear();
    }

    /// Select the `index`-th visible search result.
    ///
    /// Quotes a ride from the hotel and asks the map to focus the place.
    /// Returns `None` if there is no such result.
    pub fn select_result(&self, index: usize) -> Option<RideQuote> {
        let place = self.state.borrow().search.results.get(index).cloned()?;
        let ride = self.pricing.estimate_between(&self.hotel, &place.coordinate);

        info!(place = %place.name, price = %ride, "Place selected");
        self.focus.notify_focus(place.coordinate, place.name.clone());
        self.apply(KioskEvent::PlaceSelected { place, ride });
        self.state.borrow().ride.clone()
    }

    pub fn clear_selection(&self) {
        self.apply(KioskEvent::SelectionCleared);
    }

    /// Resolve distances for the displayed recommendation names and publish them.
    pub async fn resolve_distances<S: AsRef<str>>(&self, names: &[S]) {
        for (name, text) in self.distances.resolve_all(names).await {
            self.apply(KioskEvent::DistanceResolved { name, text });
        }
    }

    /// Like [`resolve_distances`](Self::resolve_distances) without waiting.
    ///
    /// A newer call supersedes the previous list; lookups already started
    /// still complete into the cache.
    pub fn show_distances(&self, names: Vec<String>) {
        let distances = self.distances.clone();
        let state = Arc::clone(&self.state);
        self.distance_slot.start(move |ctx| async move {
            let resolved = tokio::select! {
                biased;
                _ = ctx.cancelled() => return,
                resolved = distances.resolve_all(&names) => resolved,
            };
            if ctx.is_current() {
                for (name, text) in resolved {
                    apply(&state, KioskEvent::DistanceResolved { name, text });
                }
            }
        });
    }

    /// Start generating a personalised itinerary, replacing any run in progress.
    ///
    /// Missing profile or feed data degrades the prompt.
    pub fn start_itinerary(
        &self,
        profile: Option<&UserProfile>,
        feed: Option<&RecommendationFeed>,
    ) -> Generation {
        let mut stream = self.session.generate(itinerary_request(profile, feed));
        let generation = stream.generation();
        debug!(generation = %generation, "Itinerary requested");

        let state = Arc::clone(&self.state);
        self.itinerary_slot.start(move |_ctx| async move {
            while let Some(event) = stream.next().await {
                let event = match event {
                    GenerationEvent::Partial(snapshot) => {
                        KioskEvent::ItinerarySnapshot {
                            generation,
                            snapshot,
                        }
                    }
                    GenerationEvent::Completed(trip) => {
                        KioskEvent::ItineraryCompleted { generation, trip }
                    }
                    // Surfaced through the session status
                    GenerationEvent::Failed(_) => continue,
                };
                apply(&state, event);
            }
        });
        generation
    }

    pub fn stop_itinerary(&self) {
        self.session.stop();
    }

    pub async fn prewarm(&self) {
        self.session.prewarm().await;
    }

    pub fn distances(&self) -> &DistanceResolutionCache {
        &self.distances
    }

    pub fn session(&self) -> &ItineraryGenerationSession {
        &self.session
    }

    pub fn search(&self) -> &DebouncedQuery {
        &self.search
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        for forwarder in &self.forwarders {
            forwarder.abort();
        }
    }
}

fn apply(state: &watch::Sender<KioskState>, event: KioskEvent) -> bool {
    state.send_if_modified(|s| s.apply(event))
}

/// Forward every value of `rx` into the kiosk state as an event.
fn forward<T, F>(
    mut rx: watch::Receiver<T>,
    state: Arc<watch::Sender<KioskState>>,
    to_event: F,
) -> JoinHandle<()>
where
    T: Clone + Send + Sync + 'static,
    F: Fn(T) -> KioskEvent + Send + 'static,
{
    tokio::spawn(async move {
        loop {
            let value = rx.borrow_and_update().clone();
            apply(&state, to_event(value));
            if rx.changed().await.is_err() {
                break;
            }
        }
    })
}
