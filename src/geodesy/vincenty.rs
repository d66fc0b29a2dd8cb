//! # Ellipsoidal Geodesic Distance
//!
//! Vincenty's inverse formula: an iterative solver for the geodesic distance
//! between two coordinates on the oblate spheroid.
//!
//! The solver is bounded by both a hard iteration cap and a wall-clock
//! deadline; exhausting either yields [`NotConverged`] rather than a panic
//! or an error, and callers treat the unknown distance as a normal state.

use std::time::{Duration, Instant};

use super::{Coordinate, ELLIPSOID_FLATTENING, EQUATORIAL_RADIUS};

/// Convergence tolerance on the longitude difference term
const TOLERANCE: f64 = 1e-9;

/// Hard iteration cap
const MAX_ITERATIONS: u32 = 10_000;

/// Wall-clock deadline for the iteration
const TIMEOUT: Duration = Duration::from_secs(1);

/// Iterations between cap/deadline checks
const CHECK_INTERVAL: u32 = 1_000;

/// Why the solver aborted without a distance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotConverged {
    /// The iteration cap was reached
    IterationLimit,

    /// The wall-clock deadline passed
    Deadline,
}

impl std::fmt::Display for NotConverged {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotConverged::IterationLimit => write!(f, "iteration limit reached"),
            NotConverged::Deadline => write!(f, "deadline exceeded"),
        }
    }
}

/// Geodesic distance between two coordinates on the oblate spheroid, in
/// meters, via Vincenty's inverse formula. Altitude is ignored.
///
/// Identical surface coordinates short-circuit to a zero distance before
/// iterating. A `c1` latitude of exactly 0 is substituted with 1e-6 degrees
/// to avoid a division by zero in the reduced-latitude term.
pub fn ellipsoid_distance(c1: Coordinate, c2: Coordinate) -> Result<f64, NotConverged> {
    if c1.latitude == c2.latitude && c1.longitude == c2.longitude {
        return Ok(0.0);
    }

    let lat1 = if c1.latitude == 0.0 { 1e-6 } else { c1.latitude };

    let a = EQUATORIAL_RADIUS;
    let f = ELLIPSOID_FLATTENING;
    let b = (1.0 - f) * a; // polar radius

    let phi1 = lat1.to_radians();
    let phi2 = c2.latitude.to_radians();
    let u1 = ((1.0 - f) * phi1.tan()).atan();
    let u2 = ((1.0 - f) * phi2.tan()).atan();
    let l = c2.longitude.to_radians() - c1.longitude.to_radians();

    let (sin_u1, cos_u1) = u1.sin_cos();
    let (sin_u2, cos_u2) = u2.sin_cos();

    let mut lambda_old = l;
    let mut iteration: u32 = 0;
    let started = Instant::now();

    let (sin_sigma, cos_sigma, sigma, cos_sq_alpha, cos_2sigma_m) = loop {
        iteration += 1;

        let mut t = (cos_u2 * lambda_old.sin()).powi(2);
        t += (cos_u1 * sin_u2 - sin_u1 * cos_u2 * lambda_old.cos()).powi(2);
        let sin_sigma = t.sqrt();
        let cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * lambda_old.cos();
        let sigma = sin_sigma.atan2(cos_sigma);

        let sin_alpha = cos_u1 * cos_u2 * lambda_old.sin() / sin_sigma;
        let cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
        let cos_2sigma_m = cos_sigma - 2.0 * sin_u1 * sin_u2 / cos_sq_alpha;
        let c = f * cos_sq_alpha * (4.0 + f * (4.0 - 3.0 * cos_sq_alpha)) / 16.0;

        let t = sigma
            + c * sin_sigma
                * (cos_2sigma_m + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m));
        let lambda_new = l + (1.0 - c) * f * sin_alpha * t;

        if (lambda_new - lambda_old).abs() <= TOLERANCE {
            break (sin_sigma, cos_sigma, sigma, cos_sq_alpha, cos_2sigma_m);
        }
        lambda_old = lambda_new;

        if iteration % CHECK_INTERVAL == 0 {
            if iteration >= MAX_ITERATIONS {
                return Err(NotConverged::IterationLimit);
            }
            if started.elapsed() > TIMEOUT {
                return Err(NotConverged::Deadline);
            }
        }
    };

    // Second-order ellipsoidal correction.
    let u_sq = cos_sq_alpha * ((a * a - b * b) / (b * b));
    let big_a =
        1.0 + (u_sq / 16384.0) * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
    let big_b = (u_sq / 1024.0) * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
    let mut t = cos_2sigma_m
        + 0.25 * big_b * (cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m));
    t -= (big_b / 6.0)
        * cos_2sigma_m
        * (-3.0 + 4.0 * sin_sigma * sin_sigma)
        * (-3.0 + 4.0 * cos_2sigma_m * cos_2sigma_m);
    let delta_sigma = big_b * sin_sigma * t;

    Ok(b * big_a * (sigma - delta_sigma))
}
