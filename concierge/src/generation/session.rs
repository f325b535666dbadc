//! Itinerary generation session.
//!
//! One session owns at most one generation run at a time. Each run streams
//! progressively refined [`PartialTrip`] snapshots and ends with a complete
//! [`Trip`] or a [`GenerationError`].
//!
//! # State Machine
//!
//! ```text
//! Idle ──generate()──► Generating ──first snapshot──► Streaming { n } ──► Completed
//!                          │                               │        └──► Failed(err)
//!                          └──────── stop() ───────────────┴──► Cancelled
//! ```
//!
//! A new `generate()` supersedes the running one through the session's
//! [`TaskSlot`]. The superseded stream yields nothing further, its task stops
//! at the next suspension point, and the new run starts from an empty trip.
//! Cancellation never produces an error.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::{Stream, StreamExt};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use super::collector::SnapshotCollector;
use super::error::GenerationError;
use super::model::{GenerationRequest, GenerativeModel};
use super::trip::{PartialTrip, Trip};
use crate::task_slot::{Generation, GenerationGuard, TaskContext, TaskSlot};

/// Snapshots buffered between the run and a slow consumer.
const EVENT_BUFFER: usize = 16;

/// Lifecycle of the session's latest run.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum GenerationState {
    #[default]
    Idle,
    /// Request sent, no snapshot yet
    Generating,
    /// `snapshots` refined snapshots delivered so far
    Streaming { snapshots: usize },
    Completed,
    Failed(GenerationError),
    Cancelled,
}

impl GenerationState {
    /// `true` while a run is in progress.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            GenerationState::Generating | GenerationState::Streaming { .. }
        )
    }
}

/// The session state tagged with the run it belongs to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationStatus {
    pub generation: Generation,
    pub state: GenerationState,
}

/// One element of a generation stream.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationEvent {
    /// A refined snapshot; every field of earlier snapshots is still present
    Partial(Arc<PartialTrip>),
    /// Final, fully populated trip
    Completed(Arc<Trip>),
    /// The run failed; no further events follow
    Failed(GenerationError),
}

/// Events of one generation run.
///
/// Ends after a terminal event, or as soon as the run is superseded or stopped.
#[derive(Debug)]
pub struct GenerationStream {
    guard: GenerationGuard,
    events: mpsc::Receiver<GenerationEvent>,
}

impl GenerationStream {
    /// The run this stream belongs to.
    pub fn generation(&self) -> Generation {
        self.guard.generation()
    }
}

impl Stream for GenerationStream {
    type Item = GenerationEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.guard.is_stale() {
            self.events.close();
            return Poll::Ready(None);
        }
        match self.events.poll_recv(cx) {
            // Superseded while the event was buffered
            Poll::Ready(Some(_)) if self.guard.is_stale() => Poll::Ready(None),
            other => other,
        }
    }
}

/// Drives schema-constrained itinerary generation against a model.
pub struct ItineraryGenerationSession {
    model: Arc<dyn GenerativeModel>,
    slot: TaskSlot,
    status: Arc<watch::Sender<GenerationStatus>>,
}

impl std::fmt::Debug for ItineraryGenerationSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItineraryGenerationSession")
            .field("model", &self.model.name())
            .field("slot", &self.slot)
            .finish_non_exhaustive()
    }
}

impl ItineraryGenerationSession {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        let (status, _) = watch::channel(GenerationStatus::default());
        Self {
            model,
            slot: TaskSlot::new("generation"),
            status: Arc::new(status),
        }
    }

    /// Start a new run, cancelling any run in progress.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn generate(&self, request: GenerationRequest) -> GenerationStream {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let model = Arc::clone(&self.model);
        let status = Arc::clone(&self.status);

        let ticket = self
            .slot
            .start(move |ctx| run(model, request, ctx, status, tx));
        let guard = self.slot.guard(ticket.generation());

        // Only if the run has not already published something newer
        let generation = ticket.generation();
        self.status.send_if_modified(|s| {
            if guard.is_current() && s.generation < generation {
                *s = GenerationStatus {
                    generation,
                    state: GenerationState::Generating,
                };
                true
            } else {
                false
            }
        });

        GenerationStream { guard, events: rx }
    }

    /// Cancel the run in progress, if any.
    pub fn stop(&self) {
        self.slot.cancel();
        // Cancelled keeps the stopped run's generation
        let mut stopped = None;
        self.status.send_if_modified(|s| {
            if s.state.is_active() {
                s.state = GenerationState::Cancelled;
                stopped = Some(s.generation);
                true
            } else {
                false
            }
        });
        if let Some(generation) = stopped {
            debug!(generation = %generation, "Itinerary generation stopped");
        }
    }

    /// Warm up the model ahead of the first request.
    pub async fn prewarm(&self) {
        self.model.prewarm().await;
    }

    pub fn subscribe(&self) -> watch::Receiver<GenerationStatus> {
        self.status.subscribe()
    }

    pub fn status(&self) -> GenerationStatus {
        self.status.borrow().clone()
    }

    pub fn current_generation(&self) -> Generation {
        self.slot.current_generation()
    }
}

async fn run(
    model: Arc<dyn GenerativeModel>,
    request: GenerationRequest,
    ctx: TaskContext,
    status: Arc<watch::Sender<GenerationStatus>>,
    events: mpsc::Sender<GenerationEvent>,
) {
    let guard = ctx.guard();
    info!(generation = %guard.generation(), model = model.name(), "Itinerary generation started");

    let opened = tokio::select! {
        biased;
        _ = ctx.cancelled() => return,
        opened = model.stream(request) => opened,
    };
    let mut deltas = match opened {
        Ok(deltas) => deltas,
        Err(e) => return fail(&ctx, &status, &events, e.into()).await,
    };

    let mut collector = SnapshotCollector::new();
    loop {
        let next = tokio::select! {
            biased;
            _ = ctx.cancelled() => {
                debug!(generation = %guard.generation(), "Generation superseded mid-stream");
                return;
            }
            next = deltas.next() => next,
        };
        let delta = match next {
            None => break,
            Some(Ok(delta)) => delta,
            Some(Err(e)) => return fail(&ctx, &status, &events, e.into()).await,
        };

        match collector.process(&delta) {
            Ok(Some(snapshot)) => {
                let state = GenerationState::Streaming {
                    snapshots: collector.snapshots(),
                };
                if !publish(&status, &guard, state) {
                    return;
                }
                if !deliver(&ctx, &events, GenerationEvent::Partial(snapshot)).await {
                    return;
                }
            }
            Ok(None) => {}
            Err(e) => return fail(&ctx, &status, &events, e).await,
        }
    }

    let snapshots = collector.snapshots();
    match collector.finish() {
        Ok(trip) => {
            if publish(&status, &guard, GenerationState::Completed) {
                info!(
                    generation = %guard.generation(),
                    snapshots,
                    days = trip.days.len(),
                    "Itinerary generation completed"
                );
                deliver(&ctx, &events, GenerationEvent::Completed(Arc::new(trip))).await;
            }
        }
        Err(e) => fail(&ctx, &status, &events, e).await,
    }
}

async fn fail(
    ctx: &TaskContext,
    status: &watch::Sender<GenerationStatus>,
    events: &mpsc::Sender<GenerationEvent>,
    error: GenerationError,
) {
    let guard = ctx.guard();
    if publish(status, &guard, GenerationState::Failed(error.clone())) {
        warn!(generation = %guard.generation(), error = %error, "Itinerary generation failed");
        deliver(ctx, events, GenerationEvent::Failed(error)).await;
    }
}

/// Send an event unless the run is cancelled first.
///
/// Returns `false` if the run was cancelled. A dropped consumer is not an
/// error: the run continues so the session state still reaches a terminal value.
async fn deliver(
    ctx: &TaskContext,
    events: &mpsc::Sender<GenerationEvent>,
    event: GenerationEvent,
) -> bool {
    tokio::select! {
        biased;
        _ = ctx.cancelled() => false,
        _ = events.send(event) => true,
    }
}

/// Replace the session state if `guard` is still current.
///
/// Returns `false` when the run has been superseded.
fn publish(
    status: &watch::Sender<GenerationStatus>,
    guard: &GenerationGuard,
    state: GenerationState,
) -> bool {
    let generation = guard.generation();
    let mut accepted = false;
    status.send_if_modified(|s| {
        if !guard.is_current() || s.generation > generation {
            return false;
        }
        accepted = true;
        if s.generation == generation && s.state == state {
            return false;
        }
        *s = GenerationStatus { generation, state };
        true
    });
    accepted
}
