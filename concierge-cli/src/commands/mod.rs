//! Command handlers, one module per subcommand.

pub mod config;
pub mod distance;
pub mod itinerary;
pub mod ride;
pub mod search;
