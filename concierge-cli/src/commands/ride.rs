//! Ride command - quote a fare between two coordinates.

use concierge::coord::{distance_meters, format_imperial, Coordinate};

use crate::error::CliError;
use crate::runner::CliRunner;

/// Run the ride command. `from` defaults to the hotel.
pub fn run(runner: &CliRunner, from: Option<&str>, to: &str) -> Result<(), CliError> {
    let from: Coordinate = match from {
        Some(text) => text.parse()?,
        None => runner.config().location.hotel,
    };
    let to: Coordinate = to.parse()?;

    let estimate = runner.config().ride.estimate_between(&from, &to);
    println!("From {} to {}", from, to);
    println!("  Distance: {}", format_imperial(distance_meters(&from, &to)));
    println!("  Fare:     {}", estimate);
    println!("  {}", estimate.bucket().label());
    Ok(())
}
