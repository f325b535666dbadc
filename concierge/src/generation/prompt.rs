//! Concierge instructions and personalised itinerary prompts.

use super::model::GenerationRequest;
use super::schema::TripSchema;
use crate::profile::{RecommendationFeed, UserProfile};

/// Destination every itinerary is planned for.
pub const DESTINATION: &str = "Blacksburg, VA";

/// Number of feed items quoted in the prompt.
pub const SAMPLE_PLACES: usize = 6;

/// System instructions for the itinerary model.
pub const CONCIERGE_INSTRUCTIONS: &str = "\
You are a Marriott Bonvoy concierge.
Use the user's travel and dining preferences plus local recommendations
to generate a personalized 1-day itinerary.

Include morning, afternoon, and evening activities with dining and relaxation suggestions.
Keep each activity note to one or two short sentences.
Respond only with a JSON object matching the provided schema.";

/// Build the user prompt.
///
/// A missing profile yields a generic guest; a missing or empty feed drops
/// the sample list.
pub fn build_prompt(profile: Option<&UserProfile>, feed: Option<&RecommendationFeed>) -> String {
    let guest = match profile {
        Some(p) if !p.name.is_empty() => {
            let mut line = format!("{}, a Marriott Bonvoy {} member", p.name, p.tier);
            if !p.interests.is_empty() {
                line.push_str(&format!(" who enjoys {}", p.interests.join(", ")));
            }
            line
        }
        Some(p) => format!("a Marriott Bonvoy {} member", p.tier),
        None => "a hotel guest".to_string(),
    };

    let mut prompt = format!("Create a 1-day itinerary in {} for {}.\n", DESTINATION, guest);

    if let Some(style) = profile
        .map(|p| p.travel_style.as_str())
        .filter(|s| *s != crate::profile::DEFAULT_TRAVEL_STYLE)
    {
        prompt.push_str(&format!("Their dining style is {}.\n", style));
    }

    let sample = feed.map(|f| f.sample(SAMPLE_PLACES)).unwrap_or_default();
    if !sample.is_empty() {
        prompt.push_str("\nSample local places they might like:\n");
        for item in sample {
            prompt.push_str(&format!("• {}\n", item.name));
        }
    }

    prompt.push_str("\nInclude breakfast, midday activity, dinner, and one evening recommendation.");
    prompt
}

/// Complete generation request for the guest.
pub fn itinerary_request(
    profile: Option<&UserProfile>,
    feed: Option<&RecommendationFeed>,
) -> GenerationRequest {
    GenerationRequest {
        instructions: CONCIERGE_INSTRUCTIONS.to_string(),
        prompt: build_prompt(profile, feed),
        schema: TripSchema::json_schema(),
    }
}
