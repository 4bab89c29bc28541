//! Great-circle helpers and the compass-to-engine heading conversion. All
//! coordinates are WGS84 degrees.

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::f64::consts::PI;

/// Mean earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Meters spanned by one degree of latitude on the mean sphere.
const METERS_PER_DEGREE: f64 = EARTH_RADIUS_M * PI / 180.0;

pub type Meters = f64;
pub type Degrees = f64;

/// A latitude/longitude pair. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: Degrees,
    pub lon: Degrees,
}

impl Coordinate {
    pub const fn new(lat: Degrees, lon: Degrees) -> Self {
        Self { lat, lon }
    }

    /// True when both components are finite and inside the WGS84 ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    /// Linear interpolation in degree space, `t` clamped to `[0, 1]`. Good
    /// enough over the few hundred meters between route waypoints.
    pub fn lerp(&self, other: &Coordinate, t: f64) -> Coordinate {
        let t = t.clamp(0.0, 1.0);
        Coordinate {
            lat: self.lat + (other.lat - self.lat) * t,
            lon: self.lon + (other.lon - self.lon) * t,
        }
    }

    /// Shift by a local north/east displacement (flat-earth approximation).
    pub fn offset(&self, north: Meters, east: Meters) -> Coordinate {
        let lat = self.lat + north / METERS_PER_DEGREE;
        let lon = self.lon + east / (METERS_PER_DEGREE * self.lat.to_radians().cos());
        Coordinate { lat, lon }
    }
}

impl Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

/// Great-circle distance between `a` and `b`, in meters.
///
/// Symmetric, and zero when the two coordinates are equal.
pub fn distance(a: &Coordinate, b: &Coordinate) -> Meters {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);

    // h can creep past 1.0 for antipodal points
    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

/// Initial great-circle bearing from `a` towards `b`, clockwise from true
/// north, in `[0, 360)`.
pub fn bearing(a: &Coordinate, b: &Coordinate) -> Degrees {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let y = dlon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();
    y.atan2(x).to_degrees().rem_euclid(360.0)
}

/// Converts a compass true heading into the audio engine's yaw, which faces
/// along +x instead of north. Result is in `(-180, 180]`.
pub fn normalize_heading(raw: Degrees) -> Degrees {
    let shifted = (raw + 90.0).rem_euclid(360.0);
    if shifted > 180.0 {
        shifted - 360.0
    } else {
        shifted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: Coordinate = Coordinate::new(51.5007, -0.1246);

    #[test]
    fn distance_is_zero_for_same_point() {
        assert_eq!(distance(&ORIGIN, &ORIGIN), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let other = Coordinate::new(51.5033, -0.1195);
        let there = distance(&ORIGIN, &other);
        let back = distance(&other, &ORIGIN);
        assert!((there - back).abs() < 1e-9);
        assert!(there > 0.0);
    }

    /// One degree of latitude along a meridian is ~111.195 km on the mean sphere
    #[test]
    fn one_degree_of_latitude() {
        let a = Coordinate::new(10.0, 20.0);
        let b = Coordinate::new(11.0, 20.0);
        assert!((distance(&a, &b) - 111_195.08).abs() < 1.0);
    }

    #[test]
    fn offset_round_trips_through_distance() {
        let north = ORIGIN.offset(35.0, 0.0);
        assert!((distance(&ORIGIN, &north) - 35.0).abs() < 0.01);

        let east = ORIGIN.offset(0.0, 20.0);
        assert!((distance(&ORIGIN, &east) - 20.0).abs() < 0.01);
    }

    #[test]
    fn lerp_clamps() {
        let b = Coordinate::new(52.0, 0.0);
        assert_eq!(ORIGIN.lerp(&b, -1.0), ORIGIN);
        assert_eq!(ORIGIN.lerp(&b, 2.0), b);
        let mid = ORIGIN.lerp(&b, 0.5);
        assert!((mid.lat - 51.75035).abs() < 1e-9);
    }

    #[test]
    fn bearing_points_the_right_way() {
        let north = ORIGIN.offset(100.0, 0.0);
        let east = ORIGIN.offset(0.0, 100.0);
        let south = ORIGIN.offset(-100.0, 0.0);
        assert!(bearing(&ORIGIN, &north) < 0.01 || bearing(&ORIGIN, &north) > 359.99);
        assert!((bearing(&ORIGIN, &east) - 90.0).abs() < 0.01);
        assert!((bearing(&ORIGIN, &south) - 180.0).abs() < 0.01);
    }

    #[test]
    fn heading_wraps_past_180() {
        assert_eq!(normalize_heading(100.0), -170.0);
        assert_eq!(normalize_heading(45.0), 135.0);
        assert_eq!(normalize_heading(90.0), 180.0);
        assert_eq!(normalize_heading(270.0), 0.0);
        assert_eq!(normalize_heading(359.0), 89.0);
    }

    #[test]
    fn validity() {
        assert!(ORIGIN.is_valid());
        assert!(!Coordinate::new(91.0, 0.0).is_valid());
        assert!(!Coordinate::new(f64::NAN, 0.0).is_valid());
    }
}
