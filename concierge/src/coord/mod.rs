//! Coordinate module
//!
//! Provides geographic coordinates, search regions around a reference point,
//! great-circle distances and the imperial formatting used for distance labels.

mod types;

pub use types::{
    BoundingBox, CoordError, Coordinate, RegionExtent, SearchRegion, MAX_LAT, MAX_LON, MIN_LAT,
    MIN_LON,
};

/// Mean Earth radius in metres.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Metres in one statute mile.
pub const METERS_PER_MILE: f64 = 1609.34;

/// Metres per foot.
pub const METERS_PER_FOOT: f64 = 0.3048;

/// Approximate metres per degree of latitude.
pub const METERS_PER_DEGREE_LAT: f64 = 111_320.0;

/// Great-circle distance between two coordinates in metres (haversine).
#[inline]
pub fn distance_meters(a: &Coordinate, b: &Coordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lat = lat2 - lat1;
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_METERS * h.sqrt().min(1.0).asin()
}

/// Converts metres to statute miles.
#[inline]
pub fn meters_to_miles(meters: f64) -> f64 {
    meters / METERS_PER_MILE
}

/// Formats a distance for display using imperial units.
///
/// - Under 0.1 mi: feet, rounded to the nearest 10 (`"450 ft"`)
/// - Under 10 mi: miles with one decimal (`"2.4 mi"`)
/// - Otherwise: whole miles (`"12 mi"`)
pub fn format_imperial(meters: f64) -> String {
    let meters = meters.max(0.0);
    let miles = meters_to_miles(meters);

    if miles < 0.1 {
        let feet = (meters / METERS_PER_FOOT / 10.0).round() * 10.0;
        format!("{} ft", feet as u64)
    } else if miles < 10.0 {
        format!("{:.1} mi", miles)
    } else {
        format!("{:.0} mi", miles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOTEL: Coordinate = Coordinate::new(37.2309, -80.4236);
    const GUEST: Coordinate = Coordinate::new(37.19928, -80.40117);

    #[test]
    fn test_distance_to_self_is_zero() {
        assert_eq!(distance_meters(&HOTEL, &HOTEL), 0.0);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let ab = distance_meters(&HOTEL, &GUEST);
        let ba = distance_meters(&GUEST, &HOTEL);
        assert!((ab - ba).abs() < 1e-6);
    }

    #[test]
    fn test_hotel_to_guest_distance() {
        // Roughly 4 km between the two Blacksburg reference points
        let meters = distance_meters(&HOTEL, &GUEST);
        assert!(
            (3_800.0..4_200.0).contains(&meters),
            "expected ~4km, got {}",
            meters
        );
    }

    #[test]
    fn test_one_degree_of_latitude() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(1.0, 0.0);
        let meters = distance_meters(&a, &b);
        assert!((meters - 111_195.0).abs() < 100.0);
    }

    #[test]
    fn test_format_imperial_feet() {
        assert_eq!(format_imperial(137.0), "450 ft");
        assert_eq!(format_imperial(0.0), "0 ft");
    }

    #[test]
    fn test_format_imperial_miles() {
        assert_eq!(format_imperial(METERS_PER_MILE * 2.44), "2.4 mi");
        assert_eq!(format_imperial(METERS_PER_MILE * 12.3), "12 mi");
    }

    #[test]
    fn test_format_imperial_negative_clamps() {
        assert_eq!(format_imperial(-50.0), "0 ft");
    }

    #[test]
    fn test_try_new_rejects_out_of_range() {
        assert!(matches!(
            Coordinate::try_new(91.0, 0.0),
            Err(CoordError::InvalidLatitude(_))
        ));
        assert!(matches!(
            Coordinate::try_new(0.0, -181.0),
            Err(CoordError::InvalidLongitude(_))
        ));
    }

    #[test]
    fn test_parse_coordinate() {
        let coord: Coordinate = "37.2309, -80.4236".parse().unwrap();
        assert_eq!(coord, HOTEL);
        assert!("37.2309".parse::<Coordinate>().is_err());
        assert!("abc,def".parse::<Coordinate>().is_err());
    }

    #[test]
    fn test_radius_region_contains_nearby_point() {
        let region = SearchRegion::radius(HOTEL, 5000.0);
        let bbox = region.bounding_box();
        assert!(bbox.contains(&HOTEL));
        assert!(bbox.contains(&GUEST));
        assert!(!bbox.contains(&Coordinate::new(38.0, -80.4236)));
    }

    #[test]
    fn test_span_region_is_centered() {
        let region = SearchRegion::span(GUEST, 0.05);
        let bbox = region.bounding_box();
        assert!((bbox.max_lat - bbox.min_lat - 0.05).abs() < 1e-9);
        assert!((bbox.max_lon - bbox.min_lon - 0.05).abs() < 1e-9);
        assert!(bbox.contains(&GUEST));
    }
}
