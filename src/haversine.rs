//! Great-circle distance over coordinate sequences.
//!
//! Fills in route metrics when a backend returns geometry only. Durations
//! derived here assume a fixed average speed and are estimates, not
//! measurements.

use crate::model::Coordinate;

/// Average driving speed assumed when the backend reports no duration.
pub const DEFAULT_SPEED_KMH: f64 = 50.0;

/// Earth mean radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine distance between two points in meters.
pub fn haversine_m(from: Coordinate, to: Coordinate) -> f64 {
    let lat1_rad = from.lat.to_radians();
    let lat2_rad = to.lat.to_radians();
    let delta_lat = (to.lat - from.lat).to_radians();
    let delta_lon = (to.lon - from.lon).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    // Rounding can push `a` a hair above 1 for antipodal points.
    let c = 2.0 * a.min(1.0).sqrt().asin();

    EARTH_RADIUS_M * c
}

/// Total length of a path in meters. Fewer than two points is a zero-length path.
pub fn path_distance_m(points: &[Coordinate]) -> f64 {
    points
        .windows(2)
        .map(|pair| haversine_m(pair[0], pair[1]))
        .sum()
}

/// Converts distances into travel-time estimates at a fixed speed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedEstimate {
    /// Assumed average driving speed in km/h.
    pub speed_kmh: f64,
}

impl Default for SpeedEstimate {
    fn default() -> Self {
        Self {
            speed_kmh: DEFAULT_SPEED_KMH,
        }
    }
}

impl SpeedEstimate {
    pub fn new(speed_kmh: f64) -> Self {
        Self { speed_kmh }
    }

    /// Estimated travel time in seconds for a distance in meters.
    pub fn duration_s(&self, distance_m: f64) -> f64 {
        let hours = distance_m / 1000.0 / self.speed_kmh;
        hours * 3600.0
    }
}
