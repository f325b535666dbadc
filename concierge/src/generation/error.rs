//! Generation error types.

use thiserror::Error;

/// Terminal failure of one itinerary generation run.
///
/// Cancellation is deliberately absent: a superseded or stopped run simply
/// ends without an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// The model produced output that cannot be interpreted as a trip.
    #[error("Schema violation: {0}")]
    SchemaViolation(String),

    /// The generative service could not be reached or refused the request.
    #[error("Generation service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// Transport-level failure of a [`GenerativeModel`](super::GenerativeModel).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// Request could not be sent or the connection dropped
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Server answered with a non-success status
    #[error("Unexpected HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    /// Server is overloaded or rate limiting
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// A stream frame could not be decoded
    #[error("Malformed stream frame: {0}")]
    Stream(String),
}

impl From<ModelError> for GenerationError {
    fn from(err: ModelError) -> Self {
        GenerationError::ServiceUnavailable(err.to_string())
    }
}
