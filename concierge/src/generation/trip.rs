//! Itinerary data model: complete [`Trip`]s and in-progress [`PartialTrip`]s.
//!
//! Every entity carries an [`EntityId`] derived from its position in the
//! document (`d0`, `d0.s1`, `d0.s1.a2`). Positions never move during a run
//! because arrays only grow, so ids stay stable across snapshots and can be
//! used for list diffing.

use std::fmt;

use serde::Serialize;

/// Positional identifier of a day, section or activity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn day(day: usize) -> Self {
        Self(format!("d{}", day))
    }

    pub fn section(day: usize, section: usize) -> Self {
        Self(format!("d{}.s{}", day, section))
    }

    pub fn activity(day: usize, section: usize, activity: usize) -> Self {
        Self(format!("d{}.s{}.a{}", day, section, activity))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A fully generated itinerary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trip {
    pub destination: String,
    pub start_label: String,
    pub end_label: String,
    pub traveler_name: Option<String>,
    pub notes: Option<String>,
    pub days: Vec<DayPlan>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayPlan {
    pub id: EntityId,
    pub day_label: String,
    pub summary: Option<String>,
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub id: EntityId,
    pub title: String,
    pub description: Option<String>,
    pub activities: Vec<Activity>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Activity {
    pub id: EntityId,
    pub name: String,
    pub time_label: Option<String>,
    pub location_name: Option<String>,
    pub notes: Option<String>,
}

/// A schema-shaped snapshot of a trip that may still be missing fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PartialTrip {
    pub destination: Option<String>,
    pub start_label: Option<String>,
    pub end_label: Option<String>,
    pub traveler_name: Option<String>,
    pub notes: Option<String>,
    pub days: Vec<PartialDayPlan>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartialDayPlan {
    pub id: EntityId,
    pub day_label: Option<String>,
    pub summary: Option<String>,
    pub sections: Vec<PartialSection>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartialSection {
    pub id: EntityId,
    pub title: Option<String>,
    pub description: Option<String>,
    pub activities: Vec<PartialActivity>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartialActivity {
    pub id: EntityId,
    pub name: Option<String>,
    pub time_label: Option<String>,
    pub location_name: Option<String>,
    pub notes: Option<String>,
}

impl PartialTrip {
    /// `true` if nothing has been populated yet.
    pub fn is_empty(&self) -> bool {
        *self == PartialTrip::default()
    }

    /// Number of populated leaf fields, counting every string that is present.
    pub fn populated_fields(&self) -> usize {
        fn count(fields: &[&Option<String>]) -> usize {
            fields.iter().filter(|f| f.is_some()).count()
        }

        let mut total = count(&[
            &self.destination,
            &self.start_label,
            &self.end_label,
            &self.traveler_name,
            &self.notes,
        ]);
        for day in &self.days {
            total += count(&[&day.day_label, &day.summary]);
            for section in &day.sections {
                total += count(&[&section.title, &section.description]);
                for activity in &section.activities {
                    total += count(&[
                        &activity.name,
                        &activity.time_label,
                        &activity.location_name,
                        &activity.notes,
                    ]);
                }
            }
        }
        total
    }

    /// Convert into a [`Trip`] if every required field is present.
    ///
    /// A complete trip has a destination, both date labels and at least one
    /// day; every day needs a label, every section a title and every activity
    /// a name.
    pub fn complete(&self) -> Option<Trip> {
        if self.days.is_empty() {
            return None;
        }

        let days = self
            .days
            .iter()
            .map(|day| {
                let sections = day
                    .sections
                    .iter()
                    .map(|section| {
                        let activities = section
                            .activities
                            .iter()
                            .map(|activity| {
                                Some(Activity {
                                    id: activity.id.clone(),
                                    name: activity.name.clone()?,
                                    time_label: activity.time_label.clone(),
                                    location_name: activity.location_name.clone(),
                                    notes: activity.notes.clone(),
                                })
                            })
                            .collect::<Option<Vec<_>>>()?;
                        Some(Section {
                            id: section.id.clone(),
                            title: section.title.clone()?,
                            description: section.description.clone(),
                            activities,
                        })
                    })
                    .collect::<Option<Vec<_>>>()?;
                Some(DayPlan {
                    id: day.id.clone(),
                    day_label: day.day_label.clone()?,
                    summary: day.summary.clone(),
                    sections,
                })
            })
            .collect::<Option<Vec<_>>>()?;

        Some(Trip {
            destination: self.destination.clone()?,
            start_label: self.start_label.clone()?,
            end_label: self.end_label.clone()?,
            traveler_name: self.traveler_name.clone(),
            notes: self.notes.clone(),
            days,
        })
    }
}
