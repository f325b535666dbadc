//! Monotonic folding of streamed trip snapshots.
//!
//! Each snapshot interpreted from the stream is folded into the run's
//! accumulated [`PartialTrip`] under three rules:
//!
//! - a field absent from the new snapshot keeps its previous value
//! - a string may only be replaced by an extension of itself
//! - arrays only grow; existing items merge position by position
//!
//! Anything else is a contradiction and fails the run with
//! [`GenerationError::SchemaViolation`]. The accumulated value is untouched
//! when a fold fails.

use super::error::GenerationError;
use super::trip::{PartialActivity, PartialDayPlan, PartialSection, PartialTrip};

/// Accumulates the snapshots of one generation run.
#[derive(Debug, Default)]
pub struct TripMerger {
    accumulated: PartialTrip,
}

impl TripMerger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold `next` into the accumulated trip.
    ///
    /// Returns `true` if the accumulated trip changed.
    pub fn fold(&mut self, next: PartialTrip) -> Result<bool, GenerationError> {
        let mut merged = self.accumulated.clone();
        merge_trip(&mut merged, next)?;
        if merged == self.accumulated {
            return Ok(false);
        }
        self.accumulated = merged;
        Ok(true)
    }

    pub fn current(&self) -> &PartialTrip {
        &self.accumulated
    }

    pub fn into_inner(self) -> PartialTrip {
        self.accumulated
    }
}

fn merge_trip(into: &mut PartialTrip, next: PartialTrip) -> Result<(), GenerationError> {
    merge_text(&mut into.destination, next.destination, "destination")?;
    merge_text(&mut into.start_label, next.start_label, "start_label")?;
    merge_text(&mut into.end_label, next.end_label, "end_label")?;
    merge_text(&mut into.traveler_name, next.traveler_name, "traveler_name")?;
    merge_text(&mut into.notes, next.notes, "notes")?;
    merge_list(&mut into.days, next.days, merge_day)
}

fn merge_day(into: &mut PartialDayPlan, next: PartialDayPlan) -> Result<(), GenerationError> {
    merge_text(&mut into.day_label, next.day_label, "day_label")?;
    merge_text(&mut into.summary, next.summary, "summary")?;
    merge_list(&mut into.sections, next.sections, merge_section)
}

fn merge_section(into: &mut PartialSection, next: PartialSection) -> Result<(), GenerationError> {
    merge_text(&mut into.title, next.title, "title")?;
    merge_text(&mut into.description, next.description, "description")?;
    merge_list(&mut into.activities, next.activities, merge_activity)
}

fn merge_activity(into: &mut PartialActivity, next: PartialActivity) -> Result<(), GenerationError> {
    merge_text(&mut into.name, next.name, "name")?;
    merge_text(&mut into.time_label, next.time_label, "time_label")?;
    merge_text(&mut into.location_name, next.location_name, "location_name")?;
    merge_text(&mut into.notes, next.notes, "notes")
}

fn merge_text(
    into: &mut Option<String>,
    next: Option<String>,
    field: &str,
) -> Result<(), GenerationError> {
    let Some(next) = next else {
        return Ok(());
    };
    let Some(current) = into.as_mut() else {
        *into = Some(next);
        return Ok(());
    };
    if next.starts_with(current.as_str()) {
        *current = next;
    } else if current.starts_with(next.as_str()) {
        // A shorter prefix only repeats what we already have
    } else {
        return Err(GenerationError::SchemaViolation(format!(
            "{} changed from {:?} to {:?}",
            field, current, next
        )));
    }
    Ok(())
}

fn merge_list<T>(
    into: &mut Vec<T>,
    next: Vec<T>,
    merge_item: fn(&mut T, T) -> Result<(), GenerationError>,
) -> Result<(), GenerationError> {
    for (index, item) in next.into_iter().enumerate() {
        match into.get_mut(index) {
            Some(existing) => merge_item(existing, item)?,
            None => into.push(item),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::schema::TripSchema;
    use proptest::prelude::*;
    use serde_json::json;

    fn snapshot(value: serde_json::Value) -> PartialTrip {
        TripSchema::interpret(&value).unwrap()
    }

    #[test]
    fn test_absent_fields_are_kept() {
        let mut merger = TripMerger::new();
        merger
            .fold(snapshot(json!({"destination": "Blacksburg, VA"})))
            .unwrap();
        merger.fold(snapshot(json!({"start_label": "Oct 13"}))).unwrap();

        assert_eq!(merger.current().destination.as_deref(), Some("Blacksburg, VA"));
        assert_eq!(merger.current().start_label.as_deref(), Some("Oct 13"));
    }

    #[test]
    fn test_strings_extend() {
        let mut merger = TripMerger::new();
        merger.fold(snapshot(json!({"destination": "Black"}))).unwrap();
        assert!(merger.fold(snapshot(json!({"destination": "Blacksburg"}))).unwrap());
        assert_eq!(merger.current().destination.as_deref(), Some("Blacksburg"));
    }

    #[test]
    fn test_unchanged_snapshot_reports_no_change() {
        let mut merger = TripMerger::new();
        assert!(merger.fold(snapshot(json!({"destination": "Blacksburg"}))).unwrap());
        assert!(!merger.fold(snapshot(json!({"destination": "Black"}))).unwrap());
        assert_eq!(merger.current().destination.as_deref(), Some("Blacksburg"));
    }

    #[test]
    fn test_contradiction_is_violation_and_keeps_state() {
        let mut merger = TripMerger::new();
        merger
            .fold(snapshot(json!({"destination": "Blacksburg", "days": [{"day_label": "Day 1"}]})))
            .unwrap();
        let before = merger.current().clone();

        let result = merger.fold(snapshot(json!({
            "destination": "Blacksburg, VA",
            "days": [{"day_label": "Arrival"}]
        })));
        assert!(matches!(result, Err(GenerationError::SchemaViolation(_))));
        assert_eq!(merger.current(), &before);
    }

    #[test]
    fn test_arrays_only_grow() {
        let mut merger = TripMerger::new();
        merger
            .fold(snapshot(json!({"days": [{"day_label": "Day 1"}, {"day_label": "Day 2"}]})))
            .unwrap();
        merger
            .fold(snapshot(json!({"days": [{"day_label": "Day 1", "summary": "Campus"}]})))
            .unwrap();

        let days = &merger.current().days;
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].summary.as_deref(), Some("Campus"));
        assert_eq!(days[1].day_label.as_deref(), Some("Day 2"));
    }

    fn document() -> String {
        json!({
            "destination": "Blacksburg, VA",
            "start_label": "Oct 13 2025",
            "end_label": "Oct 13 2025",
            "traveler_name": "Jordan Lee",
            "days": [{
                "day_label": "Day 1",
                "summary": "Campus and dining",
                "sections": [
                    {"title": "Morning", "activities": [{"name": "Gillie's", "time_label": "8 AM"}]},
                    {"title": "Evening", "activities": [{"name": "Lyric Theatre"}]}
                ]
            }]
        })
        .to_string()
    }

    proptest! {
        #[test]
        fn prop_streamed_prefixes_refine_monotonically(cuts in proptest::collection::btree_set(1usize..200, 0..12)) {
            let doc = document();
            let mut merger = TripMerger::new();
            let mut previous_fields = 0;

            let mut ends: Vec<usize> = cuts.into_iter().filter(|c| *c < doc.len()).collect();
            ends.push(doc.len());
            for end in ends {
                let Some(closed) = crate::generation::partial_json::close(&doc[..end]) else {
                    continue;
                };
                let value: serde_json::Value = serde_json::from_str(&closed).unwrap();
                let partial = TripSchema::interpret(&value).unwrap();
                prop_assert!(merger.fold(partial).is_ok());
                let fields = merger.current().populated_fields();
                prop_assert!(fields >= previous_fields);
                previous_fields = fields;
            }
            prop_assert!(merger.current().complete().is_some());
        }
    }
}
