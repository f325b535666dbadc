//! Single-occupancy slot for cancellable background operations.
//!
//! A [`TaskSlot`] owns at most one in-flight operation. Starting a new
//! operation cancels the previous one and bumps the slot's generation counter,
//! so anything the old operation produces afterwards can be recognised as stale.
//!
//! # Lifecycle
//!
//! ```text
//! start(op₁) ──► generation 1 running
//! start(op₂) ──► op₁ cancelled + aborted, generation 2 running
//! cancel()   ──► op₂ cancelled + aborted, generation 3 (nothing running)
//! ```
//!
//! The slot never delivers results. Operations publish their own output and
//! must check their [`TaskContext::is_current`] guard before doing so.
//! Cancellation is a normal lifecycle event, not a failure: nothing is
//! reported when an operation is superseded.
//!
//! # Example
//!
//! ```ignore
//! use concierge::task_slot::TaskSlot;
//!
//! let slot = TaskSlot::new("search");
//! slot.start(|ctx| async move {
//!     tokio::select! {
//!         _ = ctx.cancelled() => {}
//!         result = do_search() => {
//!             if ctx.is_current() {
//!                 publish(result);
//!             }
//!         }
//!     }
//! });
//! ```

mod generation;

pub use generation::{Generation, GenerationGuard};

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Context handed to an operation started on a [`TaskSlot`].
#[derive(Debug, Clone)]
pub struct TaskContext {
    guard: GenerationGuard,
    cancellation: CancellationToken,
}

impl TaskContext {
    /// The generation this operation runs under.
    pub fn generation(&self) -> Generation {
        self.guard.generation()
    }

    /// `true` while this operation has not been superseded.
    pub fn is_current(&self) -> bool {
        self.guard.is_current() && !self.cancellation.is_cancelled()
    }

    /// Guard that can be moved into nested work.
    pub fn guard(&self) -> GenerationGuard {
        self.guard.clone()
    }

    /// Completes when this operation is cancelled.
    pub async fn cancelled(&self) {
        self.cancellation.cancelled().await
    }
}

/// Handle to the operation most recently started on a slot.
#[derive(Debug, Clone)]
pub struct TaskTicket {
    generation: Generation,
    cancellation: CancellationToken,
}

impl TaskTicket {
    /// Generation assigned to the operation.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Whether the operation has been cancelled (superseded or stopped).
    #[cfg(test)]
    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}

struct ActiveTask {
    generation: Generation,
    cancellation: CancellationToken,
    handle: JoinHandle<()>,
}

impl ActiveTask {
    fn stop(self) {
        self.cancellation.cancel();
        self.handle.abort();
    }
}

/// Holds at most one in-flight asynchronous operation.
pub struct TaskSlot {
    name: &'static str,
    counter: Arc<AtomicU64>,
    active: Mutex<Option<ActiveTask>>,
}

impl std::fmt::Debug for TaskSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskSlot")
            .field("name", &self.name)
            .field("generation", &self.current_generation())
            .finish_non_exhaustive()
    }
}

impl TaskSlot {
    /// Create an empty slot. The name is only used in log output.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            counter: Arc::new(AtomicU64::new(0)),
            active: Mutex::new(None),
        }
    }

    /// Cancel any previous operation and launch `operation` under a new generation.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start<F, Fut>(&self, operation: F) -> TaskTicket
    where
        F: FnOnce(TaskContext) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut active = self.active.lock();

        // Bump under the lock so two racing starts cannot share a generation
        let generation = Generation::new(self.counter.fetch_add(1, Ordering::AcqRel) + 1);
        if let Some(previous) = active.take() {
            debug!(
                slot = self.name,
                superseded = %previous.generation,
                generation = %generation,
                "Superseding in-flight operation"
            );
            previous.stop();
        }

        let cancellation = CancellationToken::new();
        let ctx = TaskContext {
            guard: GenerationGuard::new(Arc::clone(&self.counter), generation),
            cancellation: cancellation.clone(),
        };
        let handle = tokio::spawn(operation(ctx));

        *active = Some(ActiveTask {
            generation,
            cancellation: cancellation.clone(),
            handle,
        });

        TaskTicket {
            generation,
            cancellation,
        }
    }

    /// Cancel the running operation, if any, and invalidate its generation.
    ///
    /// Returns the new (empty) generation.
    pub fn cancel(&self) -> Generation {
        let mut active = self.active.lock();
        let generation = Generation::new(self.counter.fetch_add(1, Ordering::AcqRel) + 1);
        if let Some(previous) = active.take() {
            debug!(
                slot = self.name,
                cancelled = %previous.generation,
                "Cancelled in-flight operation"
            );
            previous.stop();
        }
        generation
    }

    /// The generation of the most recent `start` or `cancel`.
    pub fn current_generation(&self) -> Generation {
        Generation::new(self.counter.load(Ordering::Acquire))
    }

    /// Guard for an arbitrary generation of this slot.
    pub fn guard(&self, generation: Generation) -> GenerationGuard {
        GenerationGuard::new(Arc::clone(&self.counter), generation)
    }

    /// `true` if an operation was started and has not yet finished or been cancelled.
    #[cfg(test)]
    pub(crate) fn is_running(&self) -> bool {
        self.active
            .lock()
            .as_ref()
            .is_some_and(|task| !task.handle.is_finished())
    }
}

impl Drop for TaskSlot {
    fn drop(&mut self) {
        if let Some(task) = self.active.get_mut().take() {
            task.stop();
        }
    }
}
