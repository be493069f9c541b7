//! Geometry primitives over landmark positions.
//!
//! Every function here is pure and guards its own numeric edge cases: a
//! degenerate input produces a neutral value instead of NaN.

use glam::Vec3;

/// Replace a non-finite value with the neutral value 0.
#[inline]
pub fn finite_or_zero(value: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Clamp a length to a finite value: overflow saturates to `f32::MAX`, NaN is 0.
#[inline]
fn saturate_length(length: f32) -> f32 {
    if length.is_nan() {
        0.0
    } else {
        length.min(f32::MAX)
    }
}

/// Euclidean distance between two points.
pub fn distance_3d(p1: Vec3, p2: Vec3) -> f32 {
    saturate_length(p1.distance(p2))
}

/// Euclidean distance in the image plane; depth is ignored.
pub fn distance_2d(p1: Vec3, p2: Vec3) -> f32 {
    saturate_length(p1.truncate().distance(p2.truncate()))
}

/// Angle in degrees at `center` between the rays towards `p1` and `p2`.
///
/// Returns a value in `[0, 180]`. A zero-length ray has no direction, so the
/// angle is reported as 0.
pub fn angle_between_points(p1: Vec3, center: Vec3, p2: Vec3) -> f32 {
    let v1 = p1 - center;
    let v2 = p2 - center;

    let magnitudes = v1.length() * v2.length();
    if !magnitudes.is_finite() || magnitudes <= f32::EPSILON {
        return 0.0;
    }

    // Rounding can push the cosine slightly past +-1
    let cos_angle = (v1.dot(v2) / magnitudes).clamp(-1.0, 1.0);
    finite_or_zero(cos_angle.acos().to_degrees())
}

/// Map `value` from `[min, max]` onto `[0, 1]`, saturating at both ends.
///
/// An empty range (`max == min`) is a step at `min`: 1 at or above it, 0 below.
pub fn normalize(value: f32, min: f32, max: f32) -> f32 {
    if value.is_nan() {
        return 0.0;
    }

    let range = max - min;
    if !range.is_finite() || range.abs() <= f32::EPSILON {
        return if value >= min { 1.0 } else { 0.0 };
    }

    if range > 0.0 {
        if value <= min {
            return 0.0;
        }
        if value >= max {
            return 1.0;
        }
    }

    finite_or_zero((value - min) / range).clamp(0.0, 1.0)
}

/// Normal of the triangle `p1 -> p2 -> p3`.
///
/// The direction follows the winding order, so callers must always pass the
/// vertices in the same order to get a stable sign.
pub fn calculate_normal(p1: Vec3, p2: Vec3, p3: Vec3) -> Vec3 {
    (p2 - p1).cross(p3 - p1)
}

/// Heading of a normal vector in degrees, in `[0, 360)`.
pub fn calculate_heading(normal: Vec3) -> f32 {
    let heading = finite_or_zero(normal.x.atan2(normal.z).to_degrees());
    let heading = if heading < 0.0 { heading + 360.0 } else { heading };
    // -0.0 + 360 rounds to exactly 360 in f32
    if heading >= 360.0 {
        0.0
    } else {
        heading
    }
}
