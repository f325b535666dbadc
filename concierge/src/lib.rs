//! Concierge - asynchronous core of a hotel concierge kiosk
//!
//! This library coordinates the kiosk's overlapping background work against a
//! single UI-facing state: debounced place search, per-name distance
//! resolution, ride fare estimates and streamed itinerary generation.
//!
//! Every background operation runs in a [`task_slot::TaskSlot`] and tags its
//! results with a [`task_slot::Generation`]. Results from a superseded
//! generation are dropped, so a slow older request can never overwrite the
//! state produced by a newer one.

pub mod config;
pub mod coord;
pub mod dashboard;
pub mod distance;
pub mod focus;
pub mod generation;
pub mod logging;
pub mod profile;
pub mod provider;
pub mod ride;
pub mod search;
pub mod task_slot;
