//! Local guest data: loyalty profile and recommendation feed.
//!
//! These are boundary inputs. A file that is missing or malformed is logged
//! and reported as `None`, and callers degrade instead of failing.

mod feed;
mod user;

pub use feed::{FeedCategory, FeedItem, RecommendationFeed};
pub use user::{UserProfile, DEFAULT_TIER, DEFAULT_TRAVEL_STYLE};

use std::path::Path;

use thiserror::Error;
use tracing::{info, warn};

/// Why a data file could not be loaded.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Failed to read data file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decode data file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Load a guest profile, or `None` if the file is missing or malformed.
pub fn load_profile(path: &Path) -> Option<UserProfile> {
    match std::fs::read(path)
        .map_err(ProfileError::from)
        .and_then(|bytes| UserProfile::from_json(&bytes))
    {
        Ok(profile) => {
            info!(path = %path.display(), member = %profile.id, "Loaded guest profile");
            Some(profile)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Guest profile unavailable");
            None
        }
    }
}

/// Load a recommendation feed, or `None` if the file is missing or malformed.
pub fn load_feed(path: &Path) -> Option<RecommendationFeed> {
    match std::fs::read(path)
        .map_err(ProfileError::from)
        .and_then(|bytes| RecommendationFeed::from_json(&bytes))
    {
        Ok(feed) => {
            info!(
                path = %path.display(),
                categories = feed.recommendations.len(),
                "Loaded recommendation feed"
            );
            Some(feed)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Recommendation feed unavailable");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_missing_file_is_none() {
        assert!(load_profile(Path::new("/nonexistent/profile.json")).is_none());
        assert!(load_feed(Path::new("/nonexistent/feed.json")).is_none());
    }

    #[test]
    fn test_malformed_file_is_none() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();
        assert!(load_profile(file.path()).is_none());
    }

    #[test]
    fn test_load_profile_from_disk() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"{"member_id": "MB1", "first_name": "Ana"}"#)
            .unwrap();
        let profile = load_profile(file.path()).unwrap();
        assert_eq!(profile.name, "Ana");
    }
}
