//! # Azimuth / Altitude Look Angles
//!
//! Computes the direction from an observer coordinate toward a target
//! coordinate: azimuth clockwise from north and the elevation angle above
//! the observer's local horizontal plane.
//!
//! The azimuth is obtained by rotating the globe so the observer sits at
//! the local "up" pole and taking the 2D bearing of the rotated target; the
//! elevation comes from the dot product of the normalized displacement
//! vector and the observer's surface normal.

use super::{euclidian_point, geocentric_latitude, Coordinate};

/// Look angle from an observer toward a target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AzAlt {
    /// Azimuth in degrees, 0-360, clockwise from north
    pub azimuth: f64,

    /// Elevation angle in degrees above the observer's local horizontal
    /// plane; negative when the target is below it
    pub altitude: f64,
}

/// Express `c2` in a coordinate frame where `c1` maps to the local "up"
/// pole: translate `c2` to be longitude-relative to `c1`, convert to
/// Cartesian, then rotate by `c1`'s latitude (geocentric when `ellipsoid`
/// is set).
pub fn rotate_globe(c1: Coordinate, c2: Coordinate, ellipsoid: bool) -> [f64; 3] {
    let translated = Coordinate {
        latitude: c2.latitude,
        longitude: c2.longitude - c1.longitude,
        altitude: c2.altitude,
    };
    let p = euclidian_point(translated, ellipsoid);

    let rotation = if ellipsoid {
        -geocentric_latitude(c1.latitude)
    } else {
        -c1.latitude
    }
    .to_radians();
    let (sin_rot, cos_rot) = rotation.sin_cos();

    [
        p.x * cos_rot - p.z * sin_rot,
        p.y,
        p.x * sin_rot + p.z * cos_rot,
    ]
}

/// Azimuth and elevation from observer `c1` toward target `c2`.
///
/// When the rotated target is too close to the pole axis for a meaningful
/// bearing, or the two points coincide, the corresponding angle is 0.
pub fn azalt(c1: Coordinate, c2: Coordinate, ellipsoid: bool) -> AzAlt {
    let p1 = euclidian_point(c1, ellipsoid);
    let p2 = euclidian_point(c2, ellipsoid);

    let rotated = rotate_globe(c1, c2, ellipsoid);
    let azimuth = if rotated[1] * rotated[1] + rotated[2] * rotated[2] > 1e-6 {
        let theta = rotated[2].atan2(rotated[1]).to_degrees();
        let mut az = 90.0 - theta;
        if az < 0.0 {
            az += 360.0;
        }
        if az > 360.0 {
            az -= 360.0;
        }
        az
    } else {
        0.0
    };

    let dx = p2.x - p1.x;
    let dy = p2.y - p1.y;
    let dz = p2.z - p1.z;
    let length = (dx * dx + dy * dy + dz * dz).sqrt();
    let altitude = if length > 0.0 {
        let cos_angle = (dx * p1.nx + dy * p1.ny + dz * p1.nz) / length;
        90.0 - cos_angle.clamp(-1.0, 1.0).acos().to_degrees()
    } else {
        0.0
    };

    AzAlt { azimuth, altitude }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_azimuth_cardinal_directions_at_equator() {
        let observer = Coordinate::new(0.0, 0.0);

        let north = azalt(observer, Coordinate::new(1.0, 0.0), true);
        assert!(north.azimuth < 0.1 || north.azimuth > 359.9, "north: {}", north.azimuth);

        let east = azalt(observer, Coordinate::new(0.0, 1.0), true);
        assert!((east.azimuth - 90.0).abs() < 0.1, "east: {}", east.azimuth);

        let south = azalt(observer, Coordinate::new(-1.0, 0.0), true);
        assert!((south.azimuth - 180.0).abs() < 0.1, "south: {}", south.azimuth);

        let west = azalt(observer, Coordinate::new(0.0, -1.0), true);
        assert!((west.azimuth - 270.0).abs() < 0.1, "west: {}", west.azimuth);
    }

    #[test]
    fn test_azimuth_mid_latitude_initial_bearing() {
        // Due "east" along the 45th parallel: the initial great-circle
        // bearing is about 54.7 degrees, not 90.
        let a = azalt(Coordinate::new(45.0, 0.0), Coordinate::new(45.0, 90.0), false);
        assert!((a.azimuth - 54.7).abs() < 0.5, "got {}", a.azimuth);
    }

    #[test]
    fn test_surface_target_sits_below_horizontal() {
        // Curvature drops a distant surface target below the observer's
        // local horizontal plane.
        let a = azalt(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 1.0), true);
        assert!(a.altitude < 0.0, "got {}", a.altitude);
        assert!(a.altitude > -2.0, "got {}", a.altitude);
    }

    #[test]
    fn test_target_straight_up() {
        let observer = Coordinate::new(30.0, 60.0);
        let overhead = Coordinate::with_altitude(30.0, 60.0, 1000.0);
        let a = azalt(observer, overhead, true);
        assert!((a.altitude - 90.0).abs() < 1e-6, "got {}", a.altitude);
    }

    #[test]
    fn test_coincident_points_are_zeroed() {
        let c = Coordinate::new(12.0, 34.0);
        let a = azalt(c, c, true);
        assert_eq!(a.azimuth, 0.0);
        assert_eq!(a.altitude, 0.0);
    }

    #[test]
    fn test_rotate_globe_moves_observer_to_pole() {
        // The observer's own coordinate lands on the rotation pole axis.
        let c = Coordinate::new(45.0, 20.0);
        let rotated = rotate_globe(c, c, false);
        assert!(rotated[1].abs() < 1e-6);
        assert!(rotated[2].abs() < 1e-6);
        assert!(rotated[0] > 6_000_000.0);
    }
}
