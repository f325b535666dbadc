//! Memoised distance resolution for recommendation items.
//!
//! Many widgets on the dashboard show "how far is this place" for the same
//! handful of names. The [`DistanceResolutionCache`] looks each name up at most
//! once for the lifetime of the process and fans the single answer out to
//! every caller that asked for it.
//!
//! # State Machine (per key)
//!
//! ```text
//! Absent ──resolve()──► Pending ──lookup ok──► Resolved(text)
//!                          │
//!                          └──lookup error / no match──► Failed
//!
//! Resolved, Failed: terminal until evict(name) or reset()
//! ```
//!
//! Callers arriving while a key is `Pending` wait on the same in-flight
//! lookup. A failed key is never retried automatically: later calls return
//! [`UNKNOWN_DISTANCE`] until the entry is evicted. Eviction only forgets
//! terminal entries; a pending key stays shared until its lookup settles.
//!
//! Entries live in a sharded `DashMap`, so lookups for unrelated names never
//! contend on a global lock.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry as MapEntry;
use dashmap::DashMap;
use futures::future::join_all;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::coord::{distance_meters, format_imperial, Coordinate, SearchRegion};
use crate::provider::PlaceLookup;

/// Text shown when a distance could not be determined.
pub const UNKNOWN_DISTANCE: &str = "—";

/// Default span (degrees) of the lookup region around the reference point.
pub const DEFAULT_SPAN_DEGREES: f64 = 0.05;

/// Observable state of one cache key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DistanceState {
    /// Never requested (or evicted).
    Absent,
    /// Lookup in flight.
    Pending,
    /// Distance text, e.g. `"1.9 mi"`.
    Resolved(String),
    /// Lookup failed or found nothing.
    Failed,
}

impl DistanceState {
    /// Display text: the distance, or the unknown marker for anything else.
    pub fn display_text(&self) -> &str {
        match self {
            DistanceState::Resolved(text) => text,
            _ => UNKNOWN_DISTANCE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Outcome {
    Resolved(String),
    Failed,
}

impl Outcome {
    fn text(&self) -> String {
        match self {
            Outcome::Resolved(text) => text.clone(),
            Outcome::Failed => UNKNOWN_DISTANCE.to_string(),
        }
    }

    fn state(&self) -> DistanceState {
        match self {
            Outcome::Resolved(text) => DistanceState::Resolved(text.clone()),
            Outcome::Failed => DistanceState::Failed,
        }
    }
}

enum CacheEntry {
    Pending(watch::Receiver<Option<Outcome>>),
    Done(Outcome),
}

struct Inner {
    lookup: Arc<dyn PlaceLookup>,
    reference: Coordinate,
    region: SearchRegion,
    entries: DashMap<String, CacheEntry>,
    lookups_started: AtomicU64,
}

impl Inner {
    async fn compute(&self, name: &str) -> Outcome {
        match self.lookup.lookup(name, &self.region).await {
            Ok(candidates) => match candidates.first() {
                Some(first) => {
                    let meters = distance_meters(&self.reference, &first.coordinate);
                    Outcome::Resolved(format_imperial(meters))
                }
                None => {
                    debug!(name, "No match for distance lookup");
                    Outcome::Failed
                }
            },
            Err(e) => {
                warn!(name, error = %e, "Distance lookup failed");
                Outcome::Failed
            }
        }
    }

    fn complete(&self, name: &str, outcome: &Outcome) {
        if let Some(mut entry) = self.entries.get_mut(name) {
            if matches!(*entry, CacheEntry::Pending(_)) {
                *entry = CacheEntry::Done(outcome.clone());
            }
        }
    }
}

/// Process-lifetime, per-name distance cache with single-flight lookups.
#[derive(Clone)]
pub struct DistanceResolutionCache {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for DistanceResolutionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DistanceResolutionCache")
            .field("reference", &self.inner.reference)
            .field("entries", &self.inner.entries.len())
            .field("lookups_started", &self.lookups_started())
            .finish()
    }
}

impl DistanceResolutionCache {
    /// Create a cache measuring from `reference`, looking names up inside `region`.
    pub fn new(lookup: Arc<dyn PlaceLookup>, reference: Coordinate, region: SearchRegion) -> Self {
        Self {
            inner: Arc::new(Inner {
                lookup,
                reference,
                region,
                entries: DashMap::new(),
                lookups_started: AtomicU64::new(0),
            }),
        }
    }

    /// Create a cache using a square region of [`DEFAULT_SPAN_DEGREES`] around `reference`.
    pub fn around(lookup: Arc<dyn PlaceLookup>, reference: Coordinate) -> Self {
        Self::new(
            lookup,
            reference,
            SearchRegion::span(reference, DEFAULT_SPAN_DEGREES),
        )
    }

    /// Resolve the distance text for `name`.
    ///
    /// Launches at most one lookup per name; concurrent callers share it.
    /// Returns [`UNKNOWN_DISTANCE`] for failed or blank names. Must be called
    /// from within a Tokio runtime.
    pub async fn resolve(&self, name: &str) -> String {
        let key = name.trim();
        if key.is_empty() {
            return UNKNOWN_DISTANCE.to_string();
        }

        let mut outcome = match self.inner.entries.entry(key.to_string()) {
            MapEntry::Occupied(entry) => match entry.get() {
                CacheEntry::Done(outcome) => return outcome.text(),
                CacheEntry::Pending(outcome) => outcome.clone(),
            },
            MapEntry::Vacant(entry) => {
                let (tx, rx) = watch::channel(None);
                entry.insert(CacheEntry::Pending(rx.clone()));
                self.spawn_lookup(key.to_string(), tx);
                rx
            }
        };

        // A closed channel means the lookup task died; treat as unknown
        let result = match outcome.wait_for(Option::is_some).await {
            Ok(value) => (*value).as_ref().map(Outcome::text),
            Err(_) => None,
        };
        result.unwrap_or_else(|| UNKNOWN_DISTANCE.to_string())
    }

    /// Resolve several names concurrently, preserving input order.
    pub async fn resolve_all<S: AsRef<str>>(&self, names: &[S]) -> Vec<(String, String)> {
        let lookups = names.iter().map(|name| async move {
            let name = name.as_ref();
            (name.to_string(), self.resolve(name).await)
        });
        join_all(lookups).await
    }

    /// Current state of `name` without triggering a lookup.
    pub fn peek(&self, name: &str) -> DistanceState {
        match self.inner.entries.get(name.trim()) {
            None => DistanceState::Absent,
            Some(entry) => match &*entry {
                CacheEntry::Pending(_) => DistanceState::Pending,
                CacheEntry::Done(outcome) => outcome.state(),
            },
        }
    }

    /// Forget the terminal entry for `name` so the next `resolve` looks it up again.
    ///
    /// A pending lookup is left in place and keeps serving its callers.
    /// Returns whether an entry was removed.
    pub fn evict(&self, name: &str) -> bool {
        self.inner
            .entries
            .remove_if(name.trim(), |_, entry| matches!(entry, CacheEntry::Done(_)))
            .is_some()
    }

    /// Forget every terminal entry. Pending lookups stay shared.
    pub fn reset(&self) {
        self.inner
            .entries
            .retain(|_, entry| matches!(entry, CacheEntry::Pending(_)));
    }

    /// Number of names with an entry (pending or terminal).
    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }

    /// Total upstream lookups launched since creation.
    pub fn lookups_started(&self) -> u64 {
        self.inner.lookups_started.load(Ordering::Relaxed)
    }

    /// Reference point distances are measured from.
    pub fn reference(&self) -> Coordinate {
        self.inner.reference
    }

    fn spawn_lookup(&self, name: String, tx: watch::Sender<Option<Outcome>>) {
        let inner = Arc::clone(&self.inner);
        inner.lookups_started.fetch_add(1, Ordering::Relaxed);
        debug!(name = %name, "Starting distance lookup");

        tokio::spawn(async move {
            let outcome = inner.compute(&name).await;
            // Publish to the map first so late callers see the terminal state
            inner.complete(&name, &outcome);
            tx.send_replace(Some(outcome));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{CatalogLookup, LookupError, PlaceCandidate};
    use futures::future::BoxFuture;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    const GUEST: Coordinate = Coordinate::new(37.19928, -80.40117);

    /// Lookup that counts calls and answers slowly.
    struct SlowLookup {
        inner: CatalogLookup,
        calls: AtomicUsize,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        fail: bool,
    }

    impl SlowLookup {
        fn new(fail: bool) -> Self {
            Self {
                inner: CatalogLookup::blacksburg(),
                calls: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
                fail,
            }
        }
    }

    impl PlaceLookup for SlowLookup {
        fn lookup<'a>(
            &'a self,
            query: &'a str,
            region: &'a SearchRegion,
        ) -> BoxFuture<'a, Result<Vec<PlaceCandidate>, LookupError>> {
            self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Box::pin(async move {
                let now = self.in_flight.fetch_add(1, std::sync::atomic::Ordering::SeqCst) + 1;
                self.max_in_flight
                    .fetch_max(now, std::sync::atomic::Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(100)).await;
                self.in_flight.fetch_sub(1, std::sync::atomic::Ordering::SeqCst);
                if self.fail {
                    return Err(LookupError::HttpError("offline".to_string()));
                }
                self.inner.lookup(query, region).await
            })
        }

        fn name(&self) -> &str {
            "Slow"
        }
    }

    fn cache(lookup: Arc<SlowLookup>) -> DistanceResolutionCache {
        DistanceResolutionCache::around(lookup, GUEST)
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_requests_share_one_lookup() {
        let lookup = Arc::new(SlowLookup::new(false));
        let cache = cache(Arc::clone(&lookup));

        let requests = (0..10).map(|_| cache.resolve("Cassell Coliseum"));
        let results = join_all(requests).await;

        assert_eq!(lookup.calls.load(std::sync::atomic::Ordering::SeqCst), 1);
        assert!(results.iter().all(|r| r == &results[0]));
        assert_eq!(results[0], "1.9 mi");
        assert_eq!(cache.lookups_started(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolved_is_served_from_cache() {
        let lookup = Arc::new(SlowLookup::new(false));
        let cache = cache(Arc::clone(&lookup));

        let first = cache.resolve("Lane Stadium").await;
        let second = cache.resolve("Lane Stadium").await;

        assert_eq!(first, second);
        assert_eq!(lookup.calls.load(std::sync::atomic::Ordering::SeqCst), 1);
        assert_eq!(cache.peek("Lane Stadium"), DistanceState::Resolved(first));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_is_terminal_until_evicted() {
        let lookup = Arc::new(SlowLookup::new(true));
        let cache = cache(Arc::clone(&lookup));

        assert_eq!(cache.resolve("Cassell Coliseum").await, UNKNOWN_DISTANCE);
        assert_eq!(cache.resolve("Cassell Coliseum").await, UNKNOWN_DISTANCE);
        assert_eq!(lookup.calls.load(std::sync::atomic::Ordering::SeqCst), 1);
        assert_eq!(cache.peek("Cassell Coliseum"), DistanceState::Failed);

        assert!(cache.evict("Cassell Coliseum"));
        assert_eq!(cache.peek("Cassell Coliseum"), DistanceState::Absent);
        cache.resolve("Cassell Coliseum").await;
        assert_eq!(lookup.calls.load(std::sync::atomic::Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_match_is_failed() {
        let lookup = Arc::new(SlowLookup::new(false));
        let cache = cache(Arc::clone(&lookup));

        assert_eq!(cache.resolve("Eiffel Tower").await, UNKNOWN_DISTANCE);
        assert_eq!(cache.peek("Eiffel Tower"), DistanceState::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_peek_reports_pending() {
        let lookup = Arc::new(SlowLookup::new(false));
        let cache = cache(Arc::clone(&lookup));

        let background = cache.clone();
        let handle = tokio::spawn(async move { background.resolve("Lane Stadium").await });
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(cache.peek("Lane Stadium"), DistanceState::Pending);
        handle.await.unwrap();
        assert!(matches!(cache.peek("Lane Stadium"), DistanceState::Resolved(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unrelated_keys_resolve_independently() {
        let lookup = Arc::new(SlowLookup::new(false));
        let cache = cache(Arc::clone(&lookup));

        let results = cache
            .resolve_all(&["Cassell Coliseum", "Lane Stadium", "Cassell Coliseum"])
            .await;

        assert_eq!(lookup.calls.load(std::sync::atomic::Ordering::SeqCst), 2);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].0, "Cassell Coliseum");
        assert_eq!(results[0].1, results[2].1);
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn test_blank_name_skips_lookup() {
        let lookup = Arc::new(SlowLookup::new(false));
        let cache = cache(Arc::clone(&lookup));

        assert_eq!(cache.resolve("  ").await, UNKNOWN_DISTANCE);
        assert_eq!(lookup.calls.load(std::sync::atomic::Ordering::SeqCst), 0);
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_evict_while_pending_keeps_single_lookup() {
        let lookup = Arc::new(SlowLookup::new(false));
        let cache = cache(Arc::clone(&lookup));

        let background = cache.clone();
        let first = tokio::spawn(async move { background.resolve("Lane Stadium").await });
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert!(!cache.evict("Lane Stadium"));
        cache.reset();
        assert_eq!(cache.peek("Lane Stadium"), DistanceState::Pending);

        let second = cache.resolve("Lane Stadium").await;
        let first = first.await.unwrap();

        assert_eq!(first, second);
        assert_ne!(first, UNKNOWN_DISTANCE);
        assert_eq!(lookup.calls.load(std::sync::atomic::Ordering::SeqCst), 1);
        assert_eq!(lookup.max_in_flight.load(std::sync::atomic::Ordering::SeqCst), 1);

        // Once settled the entry can be forgotten
        assert!(cache.evict("Lane Stadium"));
        assert_eq!(cache.peek("Lane Stadium"), DistanceState::Absent);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_keeps_pending_and_drops_terminal() {
        let lookup = Arc::new(SlowLookup::new(false));
        let cache = cache(Arc::clone(&lookup));

        cache.resolve("Cassell Coliseum").await;
        let background = cache.clone();
        let pending = tokio::spawn(async move { background.resolve("Lane Stadium").await });
        tokio::time::sleep(Duration::from_millis(10)).await;

        cache.reset();
        assert_eq!(cache.peek("Cassell Coliseum"), DistanceState::Absent);
        assert_eq!(cache.peek("Lane Stadium"), DistanceState::Pending);
        assert_eq!(cache.len(), 1);

        pending.await.unwrap();
        assert!(matches!(cache.peek("Lane Stadium"), DistanceState::Resolved(_)));
    }

    #[test]
    fn test_display_text() {
        assert_eq!(DistanceState::Pending.display_text(), UNKNOWN_DISTANCE);
        assert_eq!(
            DistanceState::Resolved("2.0 mi".to_string()).display_text(),
            "2.0 mi"
        );
    }
}
