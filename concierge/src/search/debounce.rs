//! Debounced search box.
//!
//! Keystrokes arrive far faster than a lookup service should be called. The
//! debouncer coalesces a burst of input into one search that runs once the
//! typing pause reaches the configured quiet period (500 ms by default).
//!
//! # State Machine
//!
//! ```text
//! Idle ──on_input(text)──► Debouncing ──quiet period──► Searching ──► Ready | Unavailable
//!   ▲          │                 │ on_input(text)               (results published)
//!   │          │                 └──► Debouncing (timer restarted, old task cancelled)
//!   │          └── blank text ──► Idle (results cleared synchronously, no lookup)
//!   └──────────── on_submit() skips the quiet period and searches immediately
//! ```
//!
//! Every search runs in a [`TaskSlot`], so a new keystroke cancels both a
//! pending timer and an in-flight lookup. Results are only published when the
//! task's generation is still the slot's current one.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, info};

use super::coordinator::PlaceSearchCoordinator;
use super::types::{SearchError, SearchResult, SearchSnapshot, SearchStatus};
use crate::coord::SearchRegion;
use crate::task_slot::{Generation, GenerationGuard, TaskSlot};

/// Default quiet period before a typed query is searched.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Coalesces rapid input into a single delayed search.
pub struct DebouncedQuery {
    coordinator: PlaceSearchCoordinator,
    region: SearchRegion,
    delay: Duration,
    slot: TaskSlot,
    text: Mutex<String>,
    snapshot: Arc<watch::Sender<SearchSnapshot>>,
}

impl std::fmt::Debug for DebouncedQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DebouncedQuery")
            .field("region", &self.region)
            .field("delay", &self.delay)
            .field("slot", &self.slot)
            .finish_non_exhaustive()
    }
}

impl DebouncedQuery {
    /// Create a debounced query searching `region` with the given quiet period.
    pub fn new(coordinator: PlaceSearchCoordinator, region: SearchRegion, delay: Duration) -> Self {
        let (snapshot, _) = watch::channel(SearchSnapshot::default());
        Self {
            coordinator,
            region,
            delay,
            slot: TaskSlot::new("search"),
            text: Mutex::new(String::new()),
            snapshot: Arc::new(snapshot),
        }
    }

    /// Create a debounced query with the default 500 ms quiet period.
    pub fn with_default_delay(coordinator: PlaceSearchCoordinator, region: SearchRegion) -> Self {
        Self::new(coordinator, region, DEFAULT_DEBOUNCE)
    }

    /// Record new input text and restart the quiet-period timer.
    ///
    /// Blank text clears the results immediately and cancels any pending
    /// search. Must be called from within a Tokio runtime.
    pub fn on_input(&self, text: impl Into<String>) {
        let text = text.into();
        let query = text.trim().to_string();
        *self.text.lock() = text;

        if query.is_empty() {
            self.clear();
            return;
        }
        self.schedule(query, Some(self.delay));
    }

    /// Search the current text right away, superseding any pending timer.
    pub fn on_submit(&self) {
        let query = self.text.lock().trim().to_string();
        if query.is_empty() {
            self.clear();
            return;
        }
        self.schedule(query, None);
    }

    /// Cancel pending work and clear visible results.
    pub fn clear(&self) {
        let generation = self.slot.cancel();
        self.snapshot.send_replace(SearchSnapshot {
            generation,
            ..Default::default()
        });
        debug!(generation = %generation, "Search cleared");
    }

    /// Subscribe to snapshot updates.
    pub fn subscribe(&self) -> watch::Receiver<SearchSnapshot> {
        self.snapshot.subscribe()
    }

    /// The currently visible snapshot.
    pub fn snapshot(&self) -> SearchSnapshot {
        self.snapshot.borrow().clone()
    }

    /// The raw text last passed to [`on_input`](Self::on_input).
    pub fn text(&self) -> String {
        self.text.lock().clone()
    }

    /// The region searches are constrained to.
    pub fn region(&self) -> &SearchRegion {
        &self.region
    }

    /// Generation of the most recently scheduled search.
    pub fn current_generation(&self) -> Generation {
        self.slot.current_generation()
    }

    fn schedule(&self, query: String, delay: Option<Duration>) {
        let coordinator = self.coordinator.clone();
        let region = self.region;
        let snapshot = Arc::clone(&self.snapshot);

        self.slot.start(move |ctx| async move {
            let guard = ctx.guard();

            if let Some(delay) = delay {
                publish(&snapshot, &guard, |s| {
                    s.query = query.clone();
                    s.status = SearchStatus::Debouncing;
                });
                tokio::select! {
                    biased;
                    _ = ctx.cancelled() => return,
                    _ = tokio::time::sleep(delay) => {}
                }
            }

            publish(&snapshot, &guard, |s| {
                s.query = query.clone();
                s.status = SearchStatus::Searching;
            });
            info!(query = %query, generation = %guard.generation(), "Searching places");

            let outcome = tokio::select! {
                biased;
                _ = ctx.cancelled() => return,
                outcome = coordinator.search(&query, &region) => outcome,
            };

            publish(&snapshot, &guard, |s| apply_outcome(s, outcome));
        });
    }
}

fn apply_outcome(snapshot: &mut SearchSnapshot, outcome: Result<Vec<SearchResult>, SearchError>) {
    match outcome {
        Ok(results) => {
            snapshot.results = Arc::new(results);
            snapshot.status = SearchStatus::Ready;
        }
        Err(_) => {
            // Failures clear results silently; the next keystroke retries
            snapshot.results = Arc::new(Vec::new());
            snapshot.status = SearchStatus::Unavailable;
        }
    }
}

/// Apply `update` to the visible snapshot if `guard` is still current.
fn publish(
    snapshot: &watch::Sender<SearchSnapshot>,
    guard: &GenerationGuard,
    update: impl FnOnce(&mut SearchSnapshot),
) -> bool {
    let generation = guard.generation();
    snapshot.send_if_modified(|s| {
        let current = if guard.is_current() {
            generation
        } else {
            Generation::INITIAL
        };
        if !s.accepts(generation, current) {
            debug!(generation = %generation, visible = %s.generation, "Dropping stale search update");
            return false;
        }
        s.generation = generation;
        update(s);
        true
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::Coordinate;
    use crate::provider::{CatalogLookup, LookupError, PlaceCandidate, PlaceLookup};
    use futures::future::BoxFuture;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const HOTEL: Coordinate = Coordinate::new(37.2309, -80.4236);

    /// Lookup that records every query it receives.
    struct RecordingLookup {
        inner: CatalogLookup,
        queries: Mutex<Vec<String>>,
        calls: AtomicUsize,
        fail: bool,
    }

    impl RecordingLookup {
        fn new(fail: bool) -> Self {
            Self {
                inner: CatalogLookup::blacksburg(),
                queries: Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
                fail,
            }
        }
    }

    impl PlaceLookup for RecordingLookup {
        fn lookup<'a>(
            &'a self,
            query: &'a str,
            region: &'a SearchRegion,
        ) -> BoxFuture<'a, Result<Vec<PlaceCandidate>, LookupError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.queries.lock().push(query.to_string());
            if self.fail {
                return Box::pin(async { Err(LookupError::HttpError("down".to_string())) });
            }
            Box::pin(async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                self.inner.lookup(query, region).await
            })
        }

        fn name(&self) -> &str {
            "Recording"
        }
    }

    fn debounced(lookup: Arc<RecordingLookup>) -> DebouncedQuery {
        DebouncedQuery::with_default_delay(
            PlaceSearchCoordinator::new(lookup),
            SearchRegion::radius(HOTEL, 5000.0),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_input_issues_one_search() {
        let lookup = Arc::new(RecordingLookup::new(false));
        let query = debounced(Arc::clone(&lookup));

        query.on_input("pizza");
        tokio::time::sleep(Duration::from_millis(200)).await;
        query.on_input("pizz");
        tokio::time::sleep(Duration::from_millis(200)).await;
        query.on_input("pizza near me");
        tokio::time::sleep(Duration::from_millis(1000)).await;

        assert_eq!(lookup.calls.load(Ordering::SeqCst), 1);
        assert_eq!(*lookup.queries.lock(), vec!["pizza near me".to_string()]);

        let snapshot = query.snapshot();
        assert_eq!(snapshot.status, SearchStatus::Ready);
        assert_eq!(snapshot.query, "pizza near me");
        assert!(!snapshot.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_search_before_quiet_period() {
        let lookup = Arc::new(RecordingLookup::new(false));
        let query = debounced(Arc::clone(&lookup));

        query.on_input("pizza");
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);
        assert_eq!(query.snapshot().status, SearchStatus::Debouncing);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_bypasses_delay() {
        let lookup = Arc::new(RecordingLookup::new(false));
        let query = debounced(Arc::clone(&lookup));

        query.on_input("coliseum");
        query.on_submit();
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(lookup.calls.load(Ordering::SeqCst), 1);
        assert_eq!(query.snapshot().results[0].name, "Cassell Coliseum");

        // The superseded debounce timer never fires a second search
        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_input_clears_without_search() {
        let lookup = Arc::new(RecordingLookup::new(false));
        let query = debounced(Arc::clone(&lookup));

        query.on_input("pizza");
        query.on_submit();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!query.snapshot().is_empty());

        query.on_input("   ");
        // Cleared synchronously, before any await
        let snapshot = query.snapshot();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.status, SearchStatus::Idle);

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_clears_results() {
        let lookup = Arc::new(RecordingLookup::new(true));
        let query = debounced(Arc::clone(&lookup));

        query.on_input("pizza");
        tokio::time::sleep(Duration::from_millis(600)).await;

        let snapshot = query.snapshot();
        assert_eq!(snapshot.status, SearchStatus::Unavailable);
        assert!(snapshot.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_input_during_search_cancels_lookup() {
        let lookup = Arc::new(RecordingLookup::new(false));
        let query = debounced(Arc::clone(&lookup));

        query.on_input("pizza");
        query.on_submit();
        // Lookup is in its 50ms sleep
        tokio::time::sleep(Duration::from_millis(10)).await;
        query.on_input("coliseum");
        query.on_submit();
        tokio::time::sleep(Duration::from_millis(200)).await;

        let snapshot = query.snapshot();
        assert_eq!(snapshot.query, "coliseum");
        assert_eq!(snapshot.results.len(), 1);
        assert_eq!(snapshot.generation, query.current_generation());
    }

    #[tokio::test]
    async fn test_stale_publish_is_rejected() {
        let (tx, _rx) = watch::channel(SearchSnapshot::default());
        let slot = TaskSlot::new("test");
        let old = slot.start(|_ctx| async {});
        let new = slot.start(|_ctx| async {});

        assert!(publish(&tx, &slot.guard(new.generation()), |s| {
            s.status = SearchStatus::Ready;
        }));
        assert!(!publish(&tx, &slot.guard(old.generation()), |s| {
            s.status = SearchStatus::Unavailable;
        }));
        assert_eq!(tx.borrow().status, SearchStatus::Ready);
        assert_eq!(tx.borrow().generation, new.generation());
    }
}
