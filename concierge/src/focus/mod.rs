//! Typed map-focus notifications.
//!
//! The map layer owns a [`FocusReceiver`]; everything else holds a cloneable
//! [`FocusNotifier`]. Sending is fire-and-forget: it never blocks and never
//! fails, even when no map is listening.

use tokio::sync::mpsc;
use tracing::trace;

use crate::coord::Coordinate;

/// Request to centre the map on a place.
#[derive(Debug, Clone, PartialEq)]
pub struct FocusEvent {
    pub coordinate: Coordinate,
    pub label: String,
}

/// Sending half, held by the dashboard and anything else that can select a place.
#[derive(Debug, Clone)]
pub struct FocusNotifier {
    tx: mpsc::UnboundedSender<FocusEvent>,
}

/// Receiving half, held by the map layer.
#[derive(Debug)]
pub struct FocusReceiver {
    rx: mpsc::UnboundedReceiver<FocusEvent>,
}

/// Create a connected notifier/receiver pair.
pub fn focus_channel() -> (FocusNotifier, FocusReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (FocusNotifier { tx }, FocusReceiver { rx })
}

impl FocusNotifier {
    /// A notifier with no map attached. Events are dropped.
    pub fn detached() -> Self {
        focus_channel().0
    }

    /// Ask the map to focus `coordinate`.
    pub fn notify_focus(&self, coordinate: Coordinate, label: impl Into<String>) {
        let event = FocusEvent {
            coordinate,
            label: label.into(),
        };
        if self.tx.send(event).is_err() {
            trace!(%coordinate, "No map listening for focus events");
        }
    }
}

impl FocusReceiver {
    /// Next focus request, or `None` once every notifier is gone.
    pub async fn recv(&mut self) -> Option<FocusEvent> {
        self.rx.recv().await
    }

    /// Next focus request if one is already queued.
    pub fn try_recv(&mut self) -> Option<FocusEvent> {
        self.rx.try_recv().ok()
    }
}
