//! Accumulation of streamed model text into trip snapshots.

use std::sync::Arc;

use serde_json::Value;

use super::error::GenerationError;
use super::merge::TripMerger;
use super::partial_json;
use super::schema::TripSchema;
use super::trip::{PartialTrip, Trip};

/// Collector for one streaming generation run.
///
/// Processes text deltas, re-interprets the accumulated document after each
/// one and folds the result into a [`TripMerger`].
#[derive(Debug, Default)]
pub struct SnapshotCollector {
    text: String,
    merger: TripMerger,
    snapshots: usize,
}

impl SnapshotCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a text delta and return a snapshot if the trip was refined.
    ///
    /// Prefixes that cannot be closed into valid JSON yet produce no snapshot.
    pub fn process(&mut self, delta: &str) -> Result<Option<Arc<PartialTrip>>, GenerationError> {
        if delta.is_empty() {
            return Ok(None);
        }
        self.text.push_str(delta);

        let Some(closed) = partial_json::close(&self.text) else {
            return Ok(None);
        };
        let Ok(value) = serde_json::from_str::<Value>(&closed) else {
            return Ok(None);
        };

        let partial = TripSchema::interpret(&value)?;
        if !self.merger.fold(partial)? {
            return Ok(None);
        }
        self.snapshots += 1;
        Ok(Some(Arc::new(self.merger.current().clone())))
    }

    /// Number of snapshots emitted so far.
    pub fn snapshots(&self) -> usize {
        self.snapshots
    }

    /// Accumulated raw text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Finish the run once the stream has ended.
    ///
    /// # Errors
    ///
    /// [`GenerationError::SchemaViolation`] if the text is not one complete
    /// JSON document or the trip is missing required fields.
    pub fn finish(mut self) -> Result<Trip, GenerationError> {
        if self.text.trim().is_empty() {
            return Err(GenerationError::SchemaViolation(
                "model returned no output".to_string(),
            ));
        }
        let value: Value = serde_json::from_str(&self.text).map_err(|e| {
            GenerationError::SchemaViolation(format!("output is not complete JSON: {}", e))
        })?;
        self.merger.fold(TripSchema::interpret(&value)?)?;

        self.merger.current().complete().ok_or_else(|| {
            GenerationError::SchemaViolation("trip is missing required fields".to_string())
        })
    }
}
