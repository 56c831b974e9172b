//! Closed-form distance, heading, and speed helpers.
//!
//! Planar checks (`is_within_*`, [`compute_magnitude_angle`],
//! [`distance_vehicle`]) ignore height; [`vector`] and
//! [`compute_distance`] are 3D. Angles are in degrees.

use crate::types::{Location, Transform, Vector3};

/// Targets closer than this (meters) count as within any distance and
/// angle window.
pub const MIN_SEPARATION: f64 = 0.001;

/// Speed of a velocity vector in km/h.
#[must_use]
pub fn get_speed(velocity: Vector3) -> f64 {
    3.6 * velocity.norm()
}

/// Angle (degrees, 0 to 180) between a planar heading and a planar
/// offset of length `norm`.
fn heading_angle(forward: (f64, f64), offset: (f64, f64), norm: f64) -> f64 {
    let cos = forward.0.mul_add(offset.0, forward.1 * offset.1) / norm;
    cos.clamp(-1.0, 1.0).acos().to_degrees()
}

/// Unit heading on the ground plane for a yaw in degrees.
fn planar_heading(orientation: f64) -> (f64, f64) {
    let (sin, cos) = orientation.to_radians().sin_cos();
    (cos, sin)
}

/// Whether `target` lies ahead of `current` (within 90 degrees of its
/// forward vector) and no farther than `max_distance`.
#[must_use]
pub fn is_within_distance_ahead(target: &Transform, current: &Transform, max_distance: f64) -> bool {
    let offset = (
        target.location.x - current.location.x,
        target.location.y - current.location.y,
    );
    let norm = offset.0.hypot(offset.1);

    if norm < MIN_SEPARATION {
        return true;
    }
    if norm > max_distance {
        return false;
    }

    let fwd = current.forward_vector();
    heading_angle((fwd.x, fwd.y), offset, norm) < 90.0
}

/// Whether `target` is within `max_distance` of `current` and its
/// bearing relative to `orientation` (yaw, degrees) lies strictly
/// between `angle_low` and `angle_high`.
///
/// A vehicle straight ahead is near 0 degrees, one behind near 180.
#[must_use]
pub fn is_within_distance(
    target: Location,
    current: Location,
    orientation: f64,
    max_distance: f64,
    angle_high: f64,
    angle_low: f64,
) -> bool {
    let offset = (target.x - current.x, target.y - current.y);
    let norm = offset.0.hypot(offset.1);

    if norm < MIN_SEPARATION {
        return true;
    }
    if norm > max_distance {
        return false;
    }

    let angle = heading_angle(planar_heading(orientation), offset, norm);
    angle_low < angle && angle < angle_high
}

/// Planar distance from `current` to `target` and the bearing (degrees)
/// relative to `orientation`.
///
/// Coincident locations give a `NaN` angle.
#[must_use]
pub fn compute_magnitude_angle(target: Location, current: Location, orientation: f64) -> (f64, f64) {
    let offset = (target.x - current.x, target.y - current.y);
    let norm = offset.0.hypot(offset.1);
    (norm, heading_angle(planar_heading(orientation), offset, norm))
}

/// Planar distance between a waypoint location and a vehicle.
#[must_use]
pub fn distance_vehicle(waypoint: Location, vehicle: &Transform) -> f64 {
    waypoint.distance_2d(vehicle.location)
}

/// Unit vector from `from` to `to`.
///
/// The norm is biased by machine epsilon so coincident points give a
/// zero vector rather than `NaN`.
#[must_use]
pub fn vector(from: Location, to: Location) -> Vector3 {
    let d = Vector3::new(to.x - from.x, to.y - from.y, to.z - from.z);
    let norm = d.norm() + f64::EPSILON;
    Vector3::new(d.x / norm, d.y / norm, d.z / norm)
}

/// Euclidean distance between two 3D points, biased by machine epsilon.
#[must_use]
pub fn compute_distance(a: Location, b: Location) -> f64 {
    a.distance(b) + f64::EPSILON
}

/// `value` if positive, else zero.
#[must_use]
pub const fn positive(value: f64) -> f64 {
    if value > 0.0 { value } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Rotation;

    fn facing(x: f64, y: f64, yaw: f64) -> Transform {
        Transform {
            location: Location::planar(x, y),
            rotation: Rotation {
                yaw,
                ..Rotation::default()
            },
        }
    }

    #[test]
    fn speed_in_kmh() {
        assert!((get_speed(Vector3::new(3.0, 4.0, 0.0)) - 18.0).abs() < 1e-9);
        assert!(get_speed(Vector3::default()).abs() < f64::EPSILON);
    }

    #[test]
    fn ahead_within_range() {
        let me = facing(0.0, 0.0, 0.0);
        assert!(is_within_distance_ahead(&facing(5.0, 1.0, 0.0), &me, 10.0));
        assert!(!is_within_distance_ahead(&facing(-5.0, 0.0, 0.0), &me, 10.0));
        assert!(!is_within_distance_ahead(&facing(50.0, 0.0, 0.0), &me, 10.0));
    }

    #[test]
    fn coincident_counts_as_ahead() {
        let me = facing(1.0, 1.0, 45.0);
        assert!(is_within_distance_ahead(&facing(1.0, 1.0, 0.0), &me, 0.0));
        assert!(is_within_distance(
            Location::planar(1.0, 1.0),
            Location::planar(1.0, 1.0),
            0.0,
            0.0,
            10.0,
            0.0,
        ));
    }

    #[test]
    fn angle_window_is_exclusive() {
        let origin = Location::planar(0.0, 0.0);
        // Directly behind a vehicle facing +x: 180 degrees.
        let behind = Location::planar(-3.0, 0.0);
        assert!(is_within_distance(behind, origin, 0.0, 5.0, 181.0, 90.0));
        assert!(!is_within_distance(behind, origin, 0.0, 5.0, 180.0, 90.0));
        // Left side, 90 degrees, excluded by the lower bound.
        let side = Location::planar(0.0, 3.0);
        assert!(!is_within_distance(side, origin, 0.0, 5.0, 180.0, 90.0));
    }

    #[test]
    fn magnitude_and_angle() {
        let (dist, angle) =
            compute_magnitude_angle(Location::planar(0.0, 2.0), Location::planar(0.0, 0.0), 0.0);
        assert!((dist - 2.0).abs() < 1e-12);
        assert!((angle - 90.0).abs() < 1e-9);
    }

    #[test]
    fn vehicle_distance_is_planar() {
        let car = facing(3.0, 0.0, 0.0);
        assert!((distance_vehicle(Location::new(0.0, 4.0, 100.0), &car) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn unit_vector_and_distance() {
        let v = vector(Location::new(1.0, 1.0, 1.0), Location::new(1.0, 1.0, 3.0));
        assert!((v.z - 1.0).abs() < 1e-9);
        assert!(v.x.abs() < f64::EPSILON);
        let zero = vector(Location::default(), Location::default());
        assert_eq!(zero, Vector3::default());
        assert!((compute_distance(Location::default(), Location::new(0.0, 0.0, 2.0)) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn positive_clamps() {
        assert!((positive(2.5) - 2.5).abs() < f64::EPSILON);
        assert!(positive(-1.0).abs() < f64::EPSILON);
        assert!(positive(0.0).abs() < f64::EPSILON);
    }
}
