//! Generation identifiers and staleness guards.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Monotonic identifier of one operation started through a task slot.
///
/// Generation `0` means "nothing has been started yet".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(u64);

impl Generation {
    /// The generation of a slot that has never started anything.
    pub const INITIAL: Generation = Generation(0);

    /// Wrap a raw counter value.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Raw counter value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Checks whether a particular generation is still the slot's current one.
///
/// Cloned into background work so results can be dropped the moment they
/// become stale, without holding a reference to the slot itself.
#[derive(Debug, Clone)]
pub struct GenerationGuard {
    counter: Arc<AtomicU64>,
    generation: Generation,
}

impl GenerationGuard {
    pub(super) fn new(counter: Arc<AtomicU64>, generation: Generation) -> Self {
        Self {
            counter,
            generation,
        }
    }

    /// The generation this guard was issued for.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// `true` while no newer operation has been started on the slot.
    pub fn is_current(&self) -> bool {
        self.counter.load(Ordering::Acquire) == self.generation.get()
    }

    /// `true` once a newer operation has superseded this one.
    pub fn is_stale(&self) -> bool {
        !self.is_current()
    }
}
