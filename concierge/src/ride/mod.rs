//! Ride-cost estimation.
//!
//! A pure pricing model: no state, no I/O, no error conditions.
//!
//! ```text
//! price = (base + per_mile × max(distance, 0)) × factor,  factor ∈ {low_factor, high_factor}
//! ```

use std::fmt;

use crate::coord::{distance_meters, meters_to_miles, Coordinate};

/// Immutable pricing configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingModel {
    /// Flat fare in dollars.
    pub base: f64,
    /// Dollars per mile.
    pub per_mile: f64,
    /// Multiplier for the low end of the range.
    pub low_factor: f64,
    /// Multiplier for the high end of the range.
    pub high_factor: f64,
}

impl Default for PricingModel {
    /// UberX-like rates around Blacksburg.
    fn default() -> Self {
        Self {
            base: 3.50,
            per_mile: 2.25,
            low_factor: 0.9,
            high_factor: 1.1,
        }
    }
}

/// Qualitative cost bucket for a trip length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RideBucket {
    /// Under 1 mile.
    ShortHop,
    /// 1 to 3 miles.
    MidRange,
    /// 3 miles or more.
    Longer,
}

impl RideBucket {
    /// Classify a distance in miles.
    pub fn for_distance(miles: f64) -> Self {
        if miles < 1.0 {
            RideBucket::ShortHop
        } else if miles < 3.0 {
            RideBucket::MidRange
        } else {
            RideBucket::Longer
        }
    }

    /// Regional-average description shown next to the estimate.
    pub fn label(&self) -> &'static str {
        match self {
            RideBucket::ShortHop => "Short hop — around $8 avg",
            RideBucket::MidRange => "Mid-range — about $15 avg",
            RideBucket::Longer => "Longer trip — roughly $25–30 avg",
        }
    }
}

/// Low/high fare for one trip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RideEstimate {
    pub distance_miles: f64,
    pub low: f64,
    pub high: f64,
}

impl RideEstimate {
    /// Bucket for this trip's distance.
    pub fn bucket(&self) -> RideBucket {
        RideBucket::for_distance(self.distance_miles)
    }
}

impl fmt::Display for RideEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2} - ${:.2}", self.low, self.high)
    }
}

impl PricingModel {
    /// Price range for a trip of `distance_miles`.
    pub fn estimate(&self, distance_miles: f64) -> RideEstimate {
        let distance = if distance_miles.is_finite() {
            distance_miles.max(0.0)
        } else {
            0.0
        };
        let cost = self.base + self.per_mile * distance;
        RideEstimate {
            distance_miles: distance,
            low: cost * self.low_factor,
            high: cost * self.high_factor,
        }
    }

    /// Price range for the straight-line trip between two coordinates.
    pub fn estimate_between(&self, origin: &Coordinate, destination: &Coordinate) -> RideEstimate {
        self.estimate(meters_to_miles(distance_meters(origin, destination)))
    }
}

/// Bucket label for a distance in miles.
pub fn bucket(distance_miles: f64) -> &'static str {
    RideBucket::for_distance(distance_miles).label()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_zero_distance_is_base_fare_band() {
        let model = PricingModel::default();
        let estimate = model.estimate(0.0);
        assert!((estimate.low - 3.50 * 0.9).abs() < 1e-9);
        assert!((estimate.high - 3.50 * 1.1).abs() < 1e-9);
    }

    #[test]
    fn test_negative_distance_clamps() {
        let model = PricingModel::default();
        assert_eq!(model.estimate(-4.0), model.estimate(0.0));
        assert_eq!(model.estimate(f64::NAN), model.estimate(0.0));
    }

    #[test]
    fn test_estimate_text() {
        let model = PricingModel::default();
        // cost = 3.50 + 2 × 2.25 = 8.00
        assert_eq!(model.estimate(2.0).to_string(), "$7.20 - $8.80");
    }

    #[test]
    fn test_bucket_thresholds() {
        assert_eq!(bucket(0.0), "Short hop — around $8 avg");
        assert_eq!(bucket(0.99), "Short hop — around $8 avg");
        assert_eq!(bucket(1.0), "Mid-range — about $15 avg");
        assert_eq!(bucket(2.99), "Mid-range — about $15 avg");
        assert_eq!(bucket(3.0), "Longer trip — roughly $25–30 avg");
    }

    #[test]
    fn test_estimate_between_coordinates() {
        let model = PricingModel::default();
        let hotel = Coordinate::new(37.2309, -80.4236);
        let same = model.estimate_between(&hotel, &hotel);
        assert_eq!(same, model.estimate(0.0));

        let coliseum = Coordinate::new(37.22268, -80.41902);
        let trip = model.estimate_between(&hotel, &coliseum);
        assert_eq!(trip.bucket(), RideBucket::ShortHop);
        assert!(trip.low > same.low);
    }

    proptest! {
        #[test]
        fn prop_estimate_is_monotonic(a in 0.0f64..500.0, b in 0.0f64..500.0) {
            let model = PricingModel::default();
            let (near, far) = if a <= b { (a, b) } else { (b, a) };
            let near = model.estimate(near);
            let far = model.estimate(far);
            prop_assert!(near.low <= far.low);
            prop_assert!(near.high <= far.high);
            prop_assert!(far.low <= far.high);
        }
    }
}
