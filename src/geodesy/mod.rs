//! # Geodesy Kernel
//!
//! Stateless earth-model math over an oblate spheroid and a mean-radius
//! sphere.
//!
//! This module handles:
//! - Geodetic/geocentric latitude conversions
//! - Earth-centered Cartesian points with surface normals
//! - Chord (euclidian) and great-circle (spherical) distances
//! - Ellipsoidal geodesic distance (Vincenty's inverse formula)
//! - Azimuth/altitude look angles between coordinates
//! - Radio-horizon estimates for antenna line-of-sight
//!
//! Ellipsoidal functions are accurate to sub-meter; the spherical functions
//! are intentionally cheaper approximations used for horizon estimates.

pub mod azalt;
pub mod horizon;
pub mod vincenty;

pub use azalt::{azalt, rotate_globe, AzAlt};
pub use horizon::{
    angle_to_horizon, distance_to_horizon, euclidian_horizon_arc, euclidian_horizon_distance,
    radio_horizon, shared_radio_horizon, SharedHorizon,
};
pub use vincenty::{ellipsoid_distance, NotConverged};

use serde::{Deserialize, Serialize};

/// Equatorial radius of the reference ellipsoid in meters
pub const EQUATORIAL_RADIUS: f64 = 6_378_137.0;

/// Polar radius of the reference ellipsoid in meters
pub const POLAR_RADIUS: f64 = 6_356_752.3142;

/// Flattening of the reference ellipsoid
pub const ELLIPSOID_FLATTENING: f64 = 1.0 - POLAR_RADIUS / EQUATORIAL_RADIUS;

/// First eccentricity squared of the reference ellipsoid
pub const ECCENTRICITY_SQUARED: f64 =
    2.0 * ELLIPSOID_FLATTENING - ELLIPSOID_FLATTENING * ELLIPSOID_FLATTENING;

/// Arithmetic mean earth radius in meters
pub const MEAN_EARTH_RADIUS: f64 = (2.0 * EQUATORIAL_RADIUS + POLAR_RADIUS) / 3.0;

/// Geodetic coordinate: latitude/longitude in degrees, altitude in meters
/// above the reference ellipsoid.
///
/// Out-of-range latitudes and longitudes are clamped on construction, never
/// rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees (-90 to +90)
    pub latitude: f64,

    /// Longitude in degrees (-180 to +180)
    pub longitude: f64,

    /// Altitude above the reference ellipsoid in meters
    pub altitude: f64,
}

impl Coordinate {
    /// Create a coordinate at zero altitude, clamping latitude to
    /// [-90, 90] and longitude to [-180, 180].
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self::with_altitude(latitude, longitude, 0.0)
    }

    /// Create a coordinate with an altitude, clamping latitude and longitude
    /// to their valid ranges.
    pub fn with_altitude(latitude: f64, longitude: f64, altitude: f64) -> Self {
        Self {
            latitude: latitude.clamp(-90.0, 90.0),
            longitude: longitude.clamp(-180.0, 180.0),
            altitude,
        }
    }

    /// The same coordinate projected to the surface (altitude 0)
    pub fn ground(&self) -> Self {
        Self {
            altitude: 0.0,
            ..*self
        }
    }
}

/// Earth-centered Cartesian point with the outward surface normal at the
/// corresponding geodetic coordinate. All components in meters (normals are
/// unit-length).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EuclidianPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub nx: f64,
    pub ny: f64,
    pub nz: f64,
}

impl EuclidianPoint {
    /// Position components as an array
    pub fn position(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Surface normal components as an array
    pub fn normal(&self) -> [f64; 3] {
        [self.nx, self.ny, self.nz]
    }
}

/// Convert a geodetic latitude (degrees) to geocentric latitude (degrees)
pub fn geocentric_latitude(geodetic_latitude: f64) -> f64 {
    let lat = geodetic_latitude.to_radians();
    ((1.0 - ECCENTRICITY_SQUARED) * lat.tan()).atan().to_degrees()
}

/// Convert a geocentric latitude (degrees) to geodetic latitude (degrees)
pub fn geodetic_latitude(geocentric_latitude: f64) -> f64 {
    let lat = geocentric_latitude.to_radians();
    ((1.0 / (1.0 - ECCENTRICITY_SQUARED)) * lat.tan())
        .atan()
        .to_degrees()
}

/// Radius of the reference ellipsoid at a geodetic latitude (degrees)
pub fn ellipsoid_radius_at(latitude: f64) -> f64 {
    let lat = latitude.to_radians();
    let a = EQUATORIAL_RADIUS;
    let b = POLAR_RADIUS;
    let a2 = a * a;
    let b2 = b * b;
    let (sin_lat, cos_lat) = lat.sin_cos();

    (((a2 * cos_lat).powi(2) + (b2 * sin_lat).powi(2))
        / ((a * cos_lat).powi(2) + (b * sin_lat).powi(2)))
    .sqrt()
}

/// Earth-centered Cartesian position and surface normal for a coordinate.
///
/// With `ellipsoid` set, the point is placed at the ellipsoid radius for the
/// coordinate's latitude and the geocentric latitude correction is applied;
/// otherwise the latitude is used directly on the mean-radius sphere.
/// Altitude is added along the surface normal.
pub fn euclidian_point(c: Coordinate, ellipsoid: bool) -> EuclidianPoint {
    let lat = c.latitude.to_radians();
    let lon = c.longitude.to_radians();
    let r = if ellipsoid {
        ellipsoid_radius_at(c.latitude)
    } else {
        MEAN_EARTH_RADIUS
    };

    let gclat = if ellipsoid {
        geocentric_latitude(c.latitude).to_radians()
    } else {
        lat
    };

    let mut x = lat.cos() * lon.cos() * r;
    let mut y = gclat.cos() * lon.sin() * r;
    let mut z = gclat.sin() * r;

    let nx = lat.cos() * lon.cos();
    let ny = lat.cos() * lon.sin();
    let nz = lat.sin();

    if c.altitude != 0.0 {
        x += c.altitude * nx;
        y += c.altitude * ny;
        z += c.altitude * nz;
    }

    EuclidianPoint {
        x,
        y,
        z,
        nx,
        ny,
        nz,
    }
}

/// Euclidean 3-space distance between two Cartesian points in meters
pub fn distance(p1: &EuclidianPoint, p2: &EuclidianPoint) -> f64 {
    let dx = p1.x - p2.x;
    let dy = p1.y - p2.y;
    let dz = p1.z - p2.z;
    (dx * dx + dy * dy + dz * dz).sqrt()
}

/// Straight-line (chord) distance between two coordinates in meters
pub fn euclidian_distance(c1: Coordinate, c2: Coordinate, ellipsoid: bool) -> f64 {
    distance(
        &euclidian_point(c1, ellipsoid),
        &euclidian_point(c2, ellipsoid),
    )
}

/// Great-circle central angle between two coordinates in radians, via the
/// spherical law of cosines. Altitude is ignored.
pub fn central_angle(c1: Coordinate, c2: Coordinate) -> f64 {
    let lat1 = c1.latitude.to_radians();
    let lat2 = c2.latitude.to_radians();
    let d_lon = (c1.longitude.to_radians() - c2.longitude.to_radians()).abs();

    let cos_ca = lat1.sin() * lat2.sin() + lat1.cos() * lat2.cos() * d_lon.cos();

    // Floating-point rounding can push the cosine marginally out of the
    // acos domain for near-identical coordinates.
    cos_ca.clamp(-1.0, 1.0).acos()
}

/// Arc length on a sphere of radius `r` subtended by `angle` radians
pub fn arc_length(angle: f64, r: f64) -> f64 {
    r * angle
}

/// Surface distance between two coordinates on the mean-radius sphere
pub fn spherical_distance(c1: Coordinate, c2: Coordinate) -> f64 {
    arc_length(central_angle(c1, c2), MEAN_EARTH_RADIUS)
}

/// Shortest surface-path distance between two coordinates in meters.
///
/// Dispatches to the ellipsoidal geodesic solver or the spherical
/// approximation. Returns `None` if the ellipsoidal solver fails to
/// converge; callers treat an unknown distance as a normal, displayable
/// state.
pub fn orthodromic_distance(c1: Coordinate, c2: Coordinate, ellipsoid: bool) -> Option<f64> {
    if ellipsoid {
        ellipsoid_distance(c1, c2).ok()
    } else {
        Some(spherical_distance(c1, c2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_planetary_metrics() {
        assert!((ELLIPSOID_FLATTENING - 1.0 / 298.257).abs() < 1e-5);
        assert!((ECCENTRICITY_SQUARED - 0.00669438).abs() < 1e-7);
        assert!((MEAN_EARTH_RADIUS - 6_371_008.77).abs() < 1.0);
    }

    #[test]
    fn test_coordinate_clamping() {
        let c = Coordinate::with_altitude(95.0, -190.0, 10.0);
        assert_eq!(c.latitude, 90.0);
        assert_eq!(c.longitude, -180.0);
        assert_eq!(c.altitude, 10.0);
    }

    #[test]
    fn test_latitude_conversions_inverse() {
        for lat in [-89.0, -45.0, -10.0, 0.0, 10.0, 45.0, 89.0] {
            let gc = geocentric_latitude(lat);
            let back = geodetic_latitude(gc);
            assert!((back - lat).abs() < 1e-9, "lat {} round-tripped to {}", lat, back);
        }
    }

    #[test]
    fn test_geocentric_latitude_pulls_toward_equator() {
        // The geocentric latitude is always smaller in magnitude than the
        // geodetic latitude, except at the equator and poles.
        assert!(geocentric_latitude(45.0) < 45.0);
        assert!(geocentric_latitude(-45.0) > -45.0);
        assert!((geocentric_latitude(0.0)).abs() < 1e-12);
    }

    #[test]
    fn test_ellipsoid_radius_bounds() {
        assert!((ellipsoid_radius_at(0.0) - EQUATORIAL_RADIUS).abs() < 1e-3);
        assert!((ellipsoid_radius_at(90.0) - POLAR_RADIUS).abs() < 1e-3);
        let mid = ellipsoid_radius_at(45.0);
        assert!(mid < EQUATORIAL_RADIUS && mid > POLAR_RADIUS);
    }

    #[test]
    fn test_euclidian_point_altitude_along_normal() {
        let ground = euclidian_point(Coordinate::new(30.0, 60.0), true);
        let raised = euclidian_point(Coordinate::with_altitude(30.0, 60.0, 100.0), true);
        let d = distance(&ground, &raised);
        assert!((d - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_euclidian_distance_identity() {
        let c = Coordinate::with_altitude(51.5, -0.12, 35.0);
        assert_eq!(euclidian_distance(c, c, true), 0.0);
        assert_eq!(euclidian_distance(c, c, false), 0.0);
    }

    #[test]
    fn test_central_angle_quarter_turn() {
        let equator = Coordinate::new(0.0, 0.0);
        let pole = Coordinate::new(90.0, 0.0);
        let ca = central_angle(equator, pole);
        assert!((ca - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_spherical_distance_meridian() {
        // A quarter turn along a meridian on the mean sphere.
        let d = spherical_distance(Coordinate::new(0.0, 0.0), Coordinate::new(90.0, 0.0));
        let expected = MEAN_EARTH_RADIUS * std::f64::consts::FRAC_PI_2;
        assert!((d - expected).abs() < 1e-6);
    }

    #[test]
    fn test_orthodromic_dispatch() {
        let c1 = Coordinate::new(57.758793, 22.605194);
        let c2 = Coordinate::new(43.048838, -9.241343);
        let spherical = orthodromic_distance(c1, c2, false).unwrap();
        let ellipsoidal = orthodromic_distance(c1, c2, true).unwrap();
        // Both in the same ballpark for a ~2900 km leg, but not equal.
        assert!((spherical - ellipsoidal).abs() < 15_000.0);
        assert!(spherical != ellipsoidal);
    }
}
