use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Earth's mean radius in meters
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A geographic point in degrees. Immutable value type, freely copied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Both axes must be finite and within geographic range
    pub fn validate(&self) -> AppResult<()> {
        if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
            return Err(AppError::InvalidCoordinate(format!(
                "latitude must be a finite number in [-90, 90], got {}",
                self.lat
            )));
        }
        if !self.lng.is_finite() || !(-180.0..=180.0).contains(&self.lng) {
            return Err(AppError::InvalidCoordinate(format!(
                "longitude must be a finite number in [-180, 180], got {}",
                self.lng
            )));
        }
        Ok(())
    }
}

/// Calculate distance between two coordinates using Haversine formula
/// Returns distance in meters
pub fn distance_meters(a: Coordinate, b: Coordinate) -> AppResult<f64> {
    a.validate()?;
    b.validate()?;
    Ok(haversine_m(a, b))
}

fn haversine_m(a: Coordinate, b: Coordinate) -> f64 {
    let lat1_rad = a.lat.to_radians();
    let lat2_rad = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lng = (b.lng - a.lng).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().asin();

    EARTH_RADIUS_M * c
}

/// Check whether a user is within the allowed radius of a target location
pub fn is_within_radius(user: Coordinate, target: Coordinate, radius_m: f64) -> AppResult<bool> {
    if !radius_m.is_finite() || radius_m < 0.0 {
        return Err(AppError::InvalidInput(format!(
            "radius must be a finite non-negative number, got {}",
            radius_m
        )));
    }
    Ok(distance_meters(user, target)? <= radius_m)
}

/// Order stops by repeatedly visiting the nearest unvisited one.
///
/// Greedy approximation, not an optimal tour; ties go to the earliest stop
/// in the input. O(n^2) in the number of stops.
pub fn nearest_neighbor_route(
    points: &[Coordinate],
    start: Coordinate,
) -> AppResult<Vec<Coordinate>> {
    start.validate()?;
    for point in points {
        point.validate()?;
    }

    let mut remaining = points.to_vec();
    let mut route = Vec::with_capacity(remaining.len());
    let mut current = start;

    while !remaining.is_empty() {
        let mut nearest = 0;
        let mut nearest_dist = haversine_m(current, remaining[0]);
        for (i, point) in remaining.iter().enumerate().skip(1) {
            let dist = haversine_m(current, *point);
            if dist < nearest_dist {
                nearest = i;
                nearest_dist = dist;
            }
        }
        current = remaining.remove(nearest);
        route.push(current);
    }

    Ok(route)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACCRA: Coordinate = Coordinate { lat: 5.6037, lng: -0.1870 };
    const KUMASI: Coordinate = Coordinate { lat: 6.6885, lng: -1.6244 };
    const TEMA: Coordinate = Coordinate { lat: 5.6698, lng: -0.0166 };
    const CAPE_COAST: Coordinate = Coordinate { lat: 5.1053, lng: -1.2466 };

    #[test]
    fn test_haversine_accra_kumasi() {
        let distance = distance_meters(ACCRA, KUMASI).unwrap();
        // Should be approximately 200 km
        assert!(distance > 180_000.0 && distance < 220_000.0, "got {}", distance);
    }

    #[test]
    fn test_same_point_zero_distance() {
        let distance = distance_meters(ACCRA, ACCRA).unwrap();
        assert!(distance.abs() < 1e-9);
    }

    #[test]
    fn test_symmetry() {
        let there = distance_meters(ACCRA, KUMASI).unwrap();
        let back = distance_meters(KUMASI, ACCRA).unwrap();
        assert!((there - back).abs() < 1e-6);
    }

    #[test]
    fn test_out_of_range_latitude_rejected() {
        let bad = Coordinate::new(95.0, 0.0);
        let err = distance_meters(bad, ACCRA).unwrap_err();
        assert!(matches!(err, AppError::InvalidCoordinate(_)));
    }

    #[test]
    fn test_nan_coordinate_rejected() {
        let bad = Coordinate::new(f64::NAN, -0.1870);
        let err = distance_meters(ACCRA, bad).unwrap_err();
        assert!(matches!(err, AppError::InvalidCoordinate(_)));

        let bad = Coordinate::new(5.6037, f64::INFINITY);
        let err = distance_meters(ACCRA, bad).unwrap_err();
        assert!(matches!(err, AppError::InvalidCoordinate(_)));
    }

    #[test]
    fn test_within_radius() {
        let nearby = Coordinate::new(5.6040, -0.1872);
        assert!(is_within_radius(nearby, ACCRA, 50.0).unwrap());
        assert!(!is_within_radius(TEMA, ACCRA, 50.0).unwrap());
    }

    #[test]
    fn test_radius_boundary_inclusive() {
        let distance = distance_meters(ACCRA, TEMA).unwrap();
        assert!(is_within_radius(ACCRA, TEMA, distance).unwrap());
        assert!(!is_within_radius(ACCRA, TEMA, distance - 1.0).unwrap());
    }

    #[test]
    fn test_negative_radius_rejected() {
        let err = is_within_radius(ACCRA, TEMA, -1.0).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn test_route_empty() {
        let route = nearest_neighbor_route(&[], ACCRA).unwrap();
        assert!(route.is_empty());
    }

    #[test]
    fn test_route_single_stop() {
        let route = nearest_neighbor_route(&[KUMASI], ACCRA).unwrap();
        assert_eq!(route, vec![KUMASI]);
    }

    #[test]
    fn test_route_orders_by_proximity() {
        // From Accra: Tema is closest, then Cape Coast, then Kumasi
        let stops = [KUMASI, TEMA, CAPE_COAST];
        let route = nearest_neighbor_route(&stops, ACCRA).unwrap();
        assert_eq!(route, vec![TEMA, CAPE_COAST, KUMASI]);
    }

    #[test]
    fn test_route_keeps_all_stops() {
        let stops = [KUMASI, TEMA, CAPE_COAST, TEMA];
        let route = nearest_neighbor_route(&stops, ACCRA).unwrap();
        assert_eq!(route.len(), stops.len());
        for stop in &stops {
            assert!(route.contains(stop));
        }
    }

    #[test]
    fn test_route_tie_breaks_by_input_order() {
        let start = Coordinate::new(0.0, 0.0);
        let east = Coordinate::new(0.0, 0.001);
        let west = Coordinate::new(0.0, -0.001);
        // Equidistant from the start; the first listed stop wins
        let route = nearest_neighbor_route(&[west, east], start).unwrap();
        assert_eq!(route[0], west);
        let route = nearest_neighbor_route(&[east, west], start).unwrap();
        assert_eq!(route[0], east);
    }

    #[test]
    fn test_route_rejects_invalid_stop() {
        let stops = [TEMA, Coordinate::new(0.0, 200.0)];
        let err = nearest_neighbor_route(&stops, ACCRA).unwrap_err();
        assert!(matches!(err, AppError::InvalidCoordinate(_)));
    }
}
