//! JSON-Schema description of a [`Trip`](super::Trip) and a validator that
//! interprets streamed JSON values against it.

use serde_json::{json, Map, Value};

use super::error::GenerationError;
use super::trip::{EntityId, PartialActivity, PartialDayPlan, PartialSection, PartialTrip};

/// The trip schema handed to generative models.
pub struct TripSchema;

impl TripSchema {
    /// Schema name used in `response_format`.
    pub const NAME: &'static str = "trip";

    /// JSON-Schema for a complete trip, including field guides for the model.
    pub fn json_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "destination": { "type": "string" },
                "start_label": {
                    "type": "string",
                    "description": "Start date of the trip, as a readable string like 'Oct 13 2025'"
                },
                "end_label": {
                    "type": "string",
                    "description": "End date of the trip, as a readable string like 'Oct 15 2025'"
                },
                "traveler_name": { "type": "string" },
                "notes": { "type": "string" },
                "days": {
                    "type": "array",
                    "minItems": 1,
                    "items": {
                        "type": "object",
                        "properties": {
                            "day_label": {
                                "type": "string",
                                "description": "Readable label for this day, such as 'Day 1' or 'Arrival Day'"
                            },
                            "summary": {
                                "type": "string",
                                "description": "Short summary of the day's theme."
                            },
                            "sections": {
                                "type": "array",
                                "description": "Sections like Morning, Afternoon, Evening.",
                                "items": {
                                    "type": "object",
                                    "properties": {
                                        "title": { "type": "string" },
                                        "description": { "type": "string" },
                                        "activities": {
                                            "type": "array",
                                            "items": {
                                                "type": "object",
                                                "properties": {
                                                    "name": {
                                                        "type": "string",
                                                        "description": "Name of the activity or venue."
                                                    },
                                                    "time_label": {
                                                        "type": "string",
                                                        "description": "Optional time as a readable string like '8 AM' or 'Evening'."
                                                    },
                                                    "location_name": {
                                                        "type": "string",
                                                        "description": "Name of the location, e.g. 'Marriott at VT'."
                                                    },
                                                    "notes": { "type": "string" }
                                                },
                                                "required": ["name"],
                                                "additionalProperties": false
                                            }
                                        }
                                    },
                                    "required": ["title", "activities"],
                                    "additionalProperties": false
                                }
                            }
                        },
                        "required": ["day_label", "sections"],
                        "additionalProperties": false
                    }
                }
            },
            "required": ["destination", "start_label", "end_label", "days"],
            "additionalProperties": false
        })
    }

    /// Interpret a (possibly incomplete) JSON value as a partial trip.
    ///
    /// Missing keys and `null` are treated as "not yet generated". Unknown keys
    /// are ignored.
    ///
    /// # Errors
    ///
    /// [`GenerationError::SchemaViolation`] if a present value has the wrong
    /// JSON type.
    pub fn interpret(value: &Value) -> Result<PartialTrip, GenerationError> {
        let trip = as_object(value, "trip")?;

        let days = array_field(trip, "days", "trip")?
            .iter()
            .enumerate()
            .map(|(d, day)| interpret_day(d, day))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PartialTrip {
            destination: string_field(trip, "destination", "trip")?,
            start_label: string_field(trip, "start_label", "trip")?,
            end_label: string_field(trip, "end_label", "trip")?,
            traveler_name: string_field(trip, "traveler_name", "trip")?,
            notes: string_field(trip, "notes", "trip")?,
            days,
        })
    }
}

fn interpret_day(d: usize, value: &Value) -> Result<PartialDayPlan, GenerationError> {
    let id = EntityId::day(d);
    let day = as_object(value, id.as_str())?;

    let sections = array_field(day, "sections", id.as_str())?
        .iter()
        .enumerate()
        .map(|(s, section)| interpret_section(d, s, section))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(PartialDayPlan {
        day_label: string_field(day, "day_label", id.as_str())?,
        summary: string_field(day, "summary", id.as_str())?,
        sections,
        id,
    })
}

fn interpret_section(d: usize, s: usize, value: &Value) -> Result<PartialSection, GenerationError> {
    let id = EntityId::section(d, s);
    let section = as_object(value, id.as_str())?;

    let activities = array_field(section, "activities", id.as_str())?
        .iter()
        .enumerate()
        .map(|(a, activity)| interpret_activity(d, s, a, activity))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(PartialSection {
        title: string_field(section, "title", id.as_str())?,
        description: string_field(section, "description", id.as_str())?,
        activities,
        id,
    })
}

fn interpret_activity(
    d: usize,
    s: usize,
    a: usize,
    value: &Value,
) -> Result<PartialActivity, GenerationError> {
    let id = EntityId::activity(d, s, a);
    let activity = as_object(value, id.as_str())?;

    Ok(PartialActivity {
        name: string_field(activity, "name", id.as_str())?,
        time_label: string_field(activity, "time_label", id.as_str())?,
        location_name: string_field(activity, "location_name", id.as_str())?,
        notes: string_field(activity, "notes", id.as_str())?,
        id,
    })
}

fn as_object<'a>(value: &'a Value, at: &str) -> Result<&'a Map<String, Value>, GenerationError> {
    value
        .as_object()
        .ok_or_else(|| GenerationError::SchemaViolation(format!("{} is not an object", at)))
}

fn string_field(
    object: &Map<String, Value>,
    key: &str,
    at: &str,
) -> Result<Option<String>, GenerationError> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(GenerationError::SchemaViolation(format!(
            "{}.{} should be a string, got {}",
            at, key, other
        ))),
    }
}

fn array_field<'a>(
    object: &'a Map<String, Value>,
    key: &str,
    at: &str,
) -> Result<&'a [Value], GenerationError> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(items)) => Ok(items),
        Some(other) => Err(GenerationError::SchemaViolation(format!(
            "{}.{} should be an array, got {}",
            at, key, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_requires_core_fields() {
        let schema = TripSchema::json_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();
        assert_eq!(required, vec!["destination", "start_label", "end_label", "days"]);
        assert!(schema["properties"]["days"]["items"]["properties"]["sections"]["description"]
            .as_str()
            .unwrap()
            .contains("Morning"));
    }

    #[test]
    fn test_interpret_partial_document() {
        let value = json!({
            "destination": "Blacksburg",
            "days": [{ "day_label": "Day 1", "sections": [{ "title": "Morn" }] }]
        });
        let partial = TripSchema::interpret(&value).unwrap();

        assert_eq!(partial.destination.as_deref(), Some("Blacksburg"));
        assert!(partial.start_label.is_none());
        assert_eq!(partial.days.len(), 1);
        assert_eq!(partial.days[0].sections[0].id, EntityId::section(0, 0));
        assert_eq!(partial.days[0].sections[0].title.as_deref(), Some("Morn"));
        assert!(partial.days[0].sections[0].activities.is_empty());
    }

    #[test]
    fn test_null_is_absent() {
        let partial = TripSchema::interpret(&json!({ "notes": null, "days": null })).unwrap();
        assert!(partial.is_empty());
    }

    #[test]
    fn test_wrong_type_is_violation() {
        let result = TripSchema::interpret(&json!({ "destination": 42 }));
        assert!(matches!(result, Err(GenerationError::SchemaViolation(_))));

        let result = TripSchema::interpret(&json!({ "days": [{ "sections": "morning" }] }));
        assert!(
            matches!(result, Err(GenerationError::SchemaViolation(ref msg)) if msg.contains("d0.sections"))
        );
    }

    #[test]
    fn test_non_object_root_is_violation() {
        let result = TripSchema::interpret(&json!(["Day 1"]));
        assert!(matches!(result, Err(GenerationError::SchemaViolation(_))));
    }
}
