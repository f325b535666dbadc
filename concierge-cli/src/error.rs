//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;

use concierge::config::ConfigFileError;
use concierge::coord::CoordError;
use concierge::generation::{GenerationError, ModelError};
use concierge::provider::LookupError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Config file could not be read or written
    ConfigFile(ConfigFileError),
    /// Failed to build the place lookup client
    Lookup(LookupError),
    /// Failed to build the generative model client
    Model(ModelError),
    /// Itinerary generation failed
    Generation(GenerationError),
    /// A coordinate argument could not be parsed
    Coordinate(CoordError),
    /// Failed to read an input file
    FileRead { path: String, error: std::io::Error },
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Model(_) | CliError::Generation(GenerationError::ServiceUnavailable(_)) => {
                eprintln!();
                eprintln!("Itinerary generation needs a reachable model endpoint:");
                eprintln!("  1. Export the API key named by [generation] api_key_env");
                eprintln!("  2. Or replay a saved itinerary with --script <file>");
            }
            CliError::Lookup(_) => {
                eprintln!();
                eprintln!("Use --offline to search the built-in place catalog instead.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::ConfigFile(e) => write!(f, "{}", e),
            CliError::Lookup(e) => write!(f, "Failed to create place lookup: {}", e),
            CliError::Model(e) => write!(f, "Failed to create model client: {}", e),
            CliError::Generation(e) => write!(f, "Couldn't generate an itinerary: {}", e),
            CliError::Coordinate(e) => write!(f, "Invalid coordinate: {}", e),
            CliError::FileRead { path, error } => {
                write!(f, "Failed to read file '{}': {}", path, error)
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::ConfigFile(e) => Some(e),
            CliError::Lookup(e) => Some(e),
            CliError::Model(e) => Some(e),
            CliError::Generation(e) => Some(e),
            CliError::Coordinate(e) => Some(e),
            CliError::FileRead { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::ConfigFile(e)
    }
}

impl From<CoordError> for CliError {
    fn from(e: CoordError) -> Self {
        CliError::Coordinate(e)
    }
}
