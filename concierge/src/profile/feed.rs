//! Per-guest recommendation feed.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};
use serde::Deserialize;

use super::ProfileError;

/// One recommended venue or activity.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeedItem {
    pub name: String,
    pub url: String,
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub best_time: Option<String>,
    #[serde(default)]
    pub dress_code: Option<String>,
    #[serde(default)]
    pub venue_type: Option<String>,
}

/// Items of one recommendation category.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedCategory {
    /// `None` if the timestamp is missing or not RFC 3339.
    pub created_at: Option<DateTime<FixedOffset>>,
    pub items: Vec<FeedItem>,
}

/// Recommendations keyed by category name, in name order.
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationFeed {
    pub member_id: String,
    pub recommendations: BTreeMap<String, FeedCategory>,
}

#[derive(Debug, Deserialize)]
struct RawFeed {
    member_id: String,
    #[serde(default)]
    recommendations: BTreeMap<String, RawCategory>,
}

#[derive(Debug, Deserialize)]
struct RawCategory {
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    items: Vec<FeedItem>,
}

impl RecommendationFeed {
    /// Parse a feed from JSON.
    pub fn from_json(bytes: &[u8]) -> Result<Self, ProfileError> {
        let raw: RawFeed = serde_json::from_slice(bytes)?;
        let recommendations = raw
            .recommendations
            .into_iter()
            .map(|(name, category)| {
                let created_at = category
                    .created_at
                    .and_then(|ts| DateTime::parse_from_rfc3339(&ts).ok());
                (
                    name,
                    FeedCategory {
                        created_at,
                        items: category.items,
                    },
                )
            })
            .collect();

        Ok(Self {
            member_id: raw.member_id,
            recommendations,
        })
    }

    /// All items, category by category.
    pub fn items(&self) -> impl Iterator<Item = &FeedItem> {
        self.recommendations.values().flat_map(|c| c.items.iter())
    }

    /// The first `n` items across all categories.
    pub fn sample(&self, n: usize) -> Vec<&FeedItem> {
        self.items().take(n).collect()
    }

    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.recommendations.keys().map(String::as_str)
    }
}
