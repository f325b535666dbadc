//! Guest profile record.

use chrono::NaiveDate;
use serde::Deserialize;

use super::ProfileError;

/// Fallback tier when the record has no elite status.
pub const DEFAULT_TIER: &str = "Member";

/// Fallback travel style when the record has no dining style.
pub const DEFAULT_TRAVEL_STYLE: &str = "Unknown";

/// A guest's loyalty profile as consumed by the itinerary prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub id: String,
    /// First and last name joined, empty parts skipped.
    pub name: String,
    pub tier: String,
    pub points: u64,
    /// `None` when the record's date is missing or not `YYYY-MM-DD`.
    pub member_since: Option<NaiveDate>,
    pub travel_style: String,
    pub interests: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawProfile {
    member_id: String,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    elite_status: Option<String>,
    #[serde(default)]
    points_balance: Option<i64>,
    #[serde(default)]
    member_since: Option<String>,
    #[serde(default)]
    dining_preferences: Option<RawDining>,
    #[serde(default)]
    wellness_preferences: Option<RawWellness>,
}

#[derive(Debug, Default, Deserialize)]
struct RawDining {
    #[serde(default)]
    dining_style: Option<String>,
    #[serde(default)]
    cuisine_preferences: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawWellness {
    #[serde(default)]
    fitness: Option<RawFitness>,
}

#[derive(Debug, Default, Deserialize)]
struct RawFitness {
    #[serde(default)]
    fitness_classes: Vec<String>,
}

impl From<RawProfile> for UserProfile {
    fn from(raw: RawProfile) -> Self {
        let name = [raw.first_name, raw.last_name]
            .into_iter()
            .flatten()
            .map(|part| part.trim().to_string())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        let member_since = raw
            .member_since
            .and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok());

        let dining = raw.dining_preferences.unwrap_or_default();
        let classes = raw
            .wellness_preferences
            .and_then(|w| w.fitness)
            .map(|f| f.fitness_classes)
            .unwrap_or_default();

        let mut interests = dining.cuisine_preferences;
        interests.extend(classes);

        UserProfile {
            id: raw.member_id,
            name,
            tier: raw.elite_status.unwrap_or_else(|| DEFAULT_TIER.to_string()),
            points: raw.points_balance.unwrap_or(0).max(0) as u64,
            member_since,
            travel_style: dining
                .dining_style
                .unwrap_or_else(|| DEFAULT_TRAVEL_STYLE.to_string()),
            interests,
        }
    }
}

impl UserProfile {
    /// Parse a profile record from JSON.
    pub fn from_json(bytes: &[u8]) -> Result<Self, ProfileError> {
        let raw: RawProfile = serde_json::from_slice(bytes)?;
        Ok(raw.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_record() {
        let json = br#"{
            "member_id": "MB789456123",
            "first_name": "Jordan",
            "last_name": "Lee",
            "elite_status": "Platinum Elite",
            "points_balance": 184250,
            "member_since": "2015-03-22",
            "dining_preferences": {
                "dining_style": "Casual upscale",
                "cuisine_preferences": ["Italian", "Thai"]
            },
            "wellness_preferences": { "fitness": { "fitness_classes": ["Yoga"] } }
        }"#;
        let profile = UserProfile::from_json(json).unwrap();

        assert_eq!(profile.id, "MB789456123");
        assert_eq!(profile.name, "Jordan Lee");
        assert_eq!(profile.tier, "Platinum Elite");
        assert_eq!(profile.points, 184250);
        assert_eq!(profile.member_since, NaiveDate::from_ymd_opt(2015, 3, 22));
        assert_eq!(profile.travel_style, "Casual upscale");
        assert_eq!(profile.interests, vec!["Italian", "Thai", "Yoga"]);
    }

    #[test]
    fn test_minimal_record_uses_defaults() {
        let profile = UserProfile::from_json(br#"{"member_id": "X", "last_name": "Lee"}"#).unwrap();
        assert_eq!(profile.name, "Lee");
        assert_eq!(profile.tier, DEFAULT_TIER);
        assert_eq!(profile.points, 0);
        assert_eq!(profile.member_since, None);
        assert_eq!(profile.travel_style, DEFAULT_TRAVEL_STYLE);
        assert!(profile.interests.is_empty());
    }

    #[test]
    fn test_member_since_is_strict() {
        for date in ["03/22/2015", "2015-03-22T00:00:00Z", "2015-13-01"] {
            let json = format!(r#"{{"member_id": "X", "member_since": "{}"}}"#, date);
            let profile = UserProfile::from_json(json.as_bytes()).unwrap();
            assert_eq!(profile.member_since, None, "{} should not parse", date);
        }
    }

    #[test]
    fn test_missing_member_id_is_error() {
        assert!(UserProfile::from_json(br#"{"first_name": "Jordan"}"#).is_err());
    }
}
