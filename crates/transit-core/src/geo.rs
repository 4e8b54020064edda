//! Geographic coordinates and great-circle distance.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A point on the globe, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Great-circle distance between two points in meters.
///
/// Uses the spherical law of cosines. Identical points are exactly 0.
pub fn compute_distance(from: Coordinates, to: Coordinates) -> f64 {
    if from == to {
        return 0.0;
    }

    let dr = std::f64::consts::PI / 180.0;
    let cos_angle = (from.lat * dr).sin() * (to.lat * dr).sin()
        + (from.lat * dr).cos() * (to.lat * dr).cos() * ((from.lng - to.lng).abs() * dr).cos();

    // rounding can push the cosine just outside [-1, 1]
    cos_angle.clamp(-1.0, 1.0).acos() * EARTH_RADIUS_M
}
