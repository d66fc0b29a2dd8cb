//! # Radio Horizon Estimates
//!
//! Curvature-limited line-of-sight estimates for antennas above the
//! mean-radius sphere. The right-triangle relation `d = sqrt((r+h)^2 - r^2)`
//! gives the straight-line distance to the horizon, converted to a
//! geocentric angle and then an arc length along the surface.
//!
//! These are deliberately spherical approximations; ellipsoidal precision is
//! not warranted for link-budget style visibility checks.

use super::{
    arc_length, central_angle, euclidian_distance, Coordinate, MEAN_EARTH_RADIUS,
};

/// Angle in degrees by which the geometric horizon dips below the local
/// horizontal plane for an observer at height `h` meters. Heights below the
/// sphere surface are treated as 0.
pub fn angle_to_horizon(h: f64) -> f64 {
    let h = h.max(0.0);
    let r = MEAN_EARTH_RADIUS;
    (r / (r + h)).acos().to_degrees()
}

/// Surface arc distance in meters from an observer at height `h` meters to
/// its geometric horizon
pub fn distance_to_horizon(h: f64) -> f64 {
    arc_length(angle_to_horizon(h).to_radians(), MEAN_EARTH_RADIUS)
}

/// Straight-line distance in meters from an antenna at height `h` meters to
/// the horizon point, via the right-triangle relation
pub fn euclidian_horizon_distance(h: f64) -> f64 {
    let h = h.max(0.0);
    let r = MEAN_EARTH_RADIUS;
    ((r + h) * (r + h) - r * r).sqrt()
}

/// Surface arc in meters corresponding to the straight-line horizon
/// distance for an antenna at height `h` meters
pub fn euclidian_horizon_arc(h: f64) -> f64 {
    let d = euclidian_horizon_distance(h);
    arc_length(d.atan2(MEAN_EARTH_RADIUS), MEAN_EARTH_RADIUS)
}

/// Radio horizon in meters for an antenna at height `h` meters: the maximum
/// ground distance at which the antenna can see the surface
pub fn radio_horizon(h: f64) -> f64 {
    euclidian_horizon_arc(h)
}

/// Mutual radio visibility verdict for two stations
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SharedHorizon {
    /// Radio horizon of the first station in meters
    pub horizon1: f64,

    /// Radio horizon of the second station in meters
    pub horizon2: f64,

    /// Sum of the two horizons in meters
    pub combined: f64,

    /// Whether the stations can see each other over the curvature
    pub within: bool,

    /// Ground distance between the stations' surface projections in meters
    pub geodesic_distance: f64,

    /// Raw antenna-to-antenna straight-line distance in meters
    pub antenna_distance: f64,
}

/// Whether two stations, each with its own antenna height (the coordinate
/// altitude), share a radio horizon: true when the sum of their individual
/// horizons covers the ground distance between their surface projections.
pub fn shared_radio_horizon(c1: Coordinate, c2: Coordinate) -> SharedHorizon {
    let horizon1 = radio_horizon(c1.altitude);
    let horizon2 = radio_horizon(c2.altitude);
    let combined = horizon1 + horizon2;

    let geodesic_distance = arc_length(
        central_angle(c1.ground(), c2.ground()),
        MEAN_EARTH_RADIUS,
    );
    let antenna_distance = euclidian_distance(c1, c2, false);

    SharedHorizon {
        horizon1,
        horizon2,
        combined,
        within: combined >= geodesic_distance,
        geodesic_distance,
        antenna_distance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radio_horizon_zero_height() {
        assert_eq!(radio_horizon(0.0), 0.0);
        assert_eq!(radio_horizon(-5.0), 0.0);
    }

    #[test]
    fn test_radio_horizon_strictly_increasing() {
        let mut previous = radio_horizon(0.0);
        for h in [0.5, 1.0, 2.0, 10.0, 100.0, 1_000.0, 10_000.0] {
            let rh = radio_horizon(h);
            assert!(rh > previous, "radio_horizon({}) = {} <= {}", h, rh, previous);
            previous = rh;
        }
    }

    #[test]
    fn test_mast_height_ballpark() {
        // A 10 m mast sees roughly 11 km to the horizon.
        let rh = radio_horizon(10.0);
        assert!((rh - 11_300.0).abs() < 200.0, "got {}", rh);
    }

    #[test]
    fn test_straight_line_exceeds_arc() {
        // arc = r * atan(d / r) < d for any positive height
        let h = 100.0;
        let d = euclidian_horizon_distance(h);
        let arc = euclidian_horizon_arc(h);
        assert!(d > arc);
    }

    #[test]
    fn test_shared_horizon_coincident_ground_stations() {
        let c = Coordinate::new(40.0, -3.0);
        let sh = shared_radio_horizon(c, c);
        assert!(sh.within);
        assert_eq!(sh.geodesic_distance, 0.0);
        assert_eq!(sh.combined, 0.0);
    }

    #[test]
    fn test_shared_horizon_ground_stations_apart() {
        // Two antennas on the ground a few km apart cannot see each other.
        let c1 = Coordinate::new(40.0, -3.0);
        let c2 = Coordinate::new(40.0, -2.9);
        let sh = shared_radio_horizon(c1, c2);
        assert!(!sh.within);
        assert!(sh.geodesic_distance > 8_000.0);
        assert_eq!(sh.combined, 0.0);
    }

    #[test]
    fn test_shared_horizon_tall_masts() {
        // Two 100 m masts roughly 60 km apart can see each other.
        let c1 = Coordinate::with_altitude(40.0, -3.0, 100.0);
        let c2 = Coordinate::with_altitude(40.0, -2.3, 100.0);
        let sh = shared_radio_horizon(c1, c2);
        assert!(sh.within, "combined {} vs distance {}", sh.combined, sh.geodesic_distance);
        assert!(sh.antenna_distance > 0.0);
        assert!((sh.combined - (sh.horizon1 + sh.horizon2)).abs() < 1e-9);
    }
}
