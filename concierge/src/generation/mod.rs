//! Schema-constrained itinerary generation.
//!
//! ```text
//! profile + feed ──► prompt ──► GenerativeModel ──► text deltas
//!                                                       │
//!                         partial_json::close ◄─────────┘
//!                                 │
//!                     TripSchema::interpret ──► TripMerger ──► PartialTrip snapshots
//!                                                                  │
//!                                    GenerationStream ◄────────────┘ ──► Trip
//! ```
//!
//! - [`ItineraryGenerationSession`]: one cancellable run at a time
//! - [`ChatCompletionsModel`]: OpenAI-compatible HTTP streaming
//! - [`ScriptedModel`]: replays canned output (offline mode, tests)

mod chat;
mod collector;
mod error;
mod merge;
mod model;
pub mod partial_json;
mod prompt;
mod schema;
mod session;
mod trip;

pub use chat::{ChatCompletionsModel, SseDecoder, DEFAULT_ENDPOINT, DEFAULT_MODEL};
pub use collector::SnapshotCollector;
pub use error::{GenerationError, ModelError};
pub use merge::TripMerger;
pub use model::{GenerationRequest, GenerativeModel, ModelStream, ScriptedModel};
pub use prompt::{
    build_prompt, itinerary_request, CONCIERGE_INSTRUCTIONS, DESTINATION, SAMPLE_PLACES,
};
pub use schema::TripSchema;
pub use session::{
    GenerationEvent, GenerationState, GenerationStatus, GenerationStream,
    ItineraryGenerationSession,
};
pub use trip::{
    Activity, DayPlan, EntityId, PartialActivity, PartialDayPlan, PartialSection, PartialTrip,
    Section, Trip,
};
