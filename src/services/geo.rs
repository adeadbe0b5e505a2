//! Geographic calculations

use crate::types::Coordinates;

/// Earth radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Average speed in km/h for driving time estimation
const AVERAGE_SPEED_KMH: f64 = 50.0;

/// Calculate Haversine distance between two points in kilometers.
///
/// Coincident points return exactly 0 and antipodal points return half the
/// circumference. Non-finite input yields NaN; callers validate coordinates.
pub fn haversine_distance(from: &Coordinates, to: &Coordinates) -> f64 {
    if from.lat == to.lat && from.lng == to.lng {
        return 0.0;
    }

    let d_lat = (to.lat - from.lat).to_radians();
    let d_lon = (to.lng - from.lng).to_radians();

    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);

    // rounding can push `a` just past 1 near the antipode; clamp keeps NaN
    let c = 2.0 * a.clamp(0.0, 1.0).sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// Estimate driving time in minutes from straight-line distance
pub fn estimate_driving_minutes(from: &Coordinates, to: &Coordinates) -> f64 {
    haversine_distance(from, to) / AVERAGE_SPEED_KMH * 60.0
}

/// Format minutes as `"1h 5min"` or `"45min"`
pub fn format_driving_time(minutes: f64) -> String {
    let hours = (minutes / 60.0).floor() as i64;
    let rest = (minutes % 60.0).round() as i64;

    if hours > 0 {
        format!("{}h {}min", hours, rest)
    } else {
        format!("{}min", rest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_haversine_prague_brno() {
        let prague = Coordinates { lat: 50.0755, lng: 14.4378 };
        let brno = Coordinates { lat: 49.1951, lng: 16.6068 };

        let distance = haversine_distance(&prague, &brno);

        // Prague to Brno is approximately 185 km
        assert!((distance - 185.0).abs() < 5.0);
    }

    #[test]
    fn test_haversine_same_point_is_exactly_zero() {
        let point = Coordinates { lat: 50.0, lng: 14.0 };
        assert_eq!(haversine_distance(&point, &point), 0.0);
    }

    #[test]
    fn test_haversine_antipodal_is_half_circumference() {
        let a = Coordinates { lat: 0.0, lng: 0.0 };
        let b = Coordinates { lat: 0.0, lng: 180.0 };

        let distance = haversine_distance(&a, &b);

        assert!(distance.is_finite());
        assert!((distance - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }

    #[test]
    fn test_haversine_poles() {
        let north = Coordinates { lat: 90.0, lng: 0.0 };
        let south = Coordinates { lat: -90.0, lng: 0.0 };

        let distance = haversine_distance(&north, &south);
        assert!((distance - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }

    #[test]
    fn test_haversine_non_finite_propagates_nan() {
        let a = Coordinates { lat: f64::NAN, lng: 14.0 };
        let b = Coordinates { lat: 50.0, lng: 14.0 };

        assert!(haversine_distance(&a, &b).is_nan());
        assert!(haversine_distance(&a, &a).is_nan());
    }

    #[test]
    fn test_driving_time_at_fifty_kmh() {
        // one degree of longitude on the equator ~ 111.2 km ~ 133 minutes
        let from = Coordinates { lat: 0.0, lng: 0.0 };
        let to = Coordinates { lat: 0.0, lng: 1.0 };

        let minutes = estimate_driving_minutes(&from, &to);
        assert!((minutes - 133.4).abs() < 0.5);
    }

    #[test]
    fn test_format_driving_time() {
        assert_eq!(format_driving_time(45.0), "45min");
        assert_eq!(format_driving_time(65.0), "1h 5min");
        assert_eq!(format_driving_time(120.0), "2h 0min");
        assert_eq!(format_driving_time(0.2), "0min");
    }

    proptest! {
        #[test]
        fn prop_haversine_reflexive(lat in -90.0f64..=90.0, lng in -180.0f64..=180.0) {
            let p = Coordinates { lat, lng };
            prop_assert_eq!(haversine_distance(&p, &p), 0.0);
        }

        #[test]
        fn prop_haversine_symmetric(
            lat1 in -90.0f64..=90.0, lng1 in -180.0f64..=180.0,
            lat2 in -90.0f64..=90.0, lng2 in -180.0f64..=180.0,
        ) {
            let a = Coordinates { lat: lat1, lng: lng1 };
            let b = Coordinates { lat: lat2, lng: lng2 };

            let ab = haversine_distance(&a, &b);
            let ba = haversine_distance(&b, &a);

            prop_assert!(ab >= 0.0);
            prop_assert!(ab <= std::f64::consts::PI * EARTH_RADIUS_KM + 1e-6);
            prop_assert!((ab - ba).abs() < 1e-9);
        }
    }
}
